//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct which generates the OpenAPI specification
//! for the REST API: every HTTP endpoint from the inbound layer, the shared
//! schemas, and the session cookie security scheme. The generated document
//! backs Swagger UI in debug builds and `cargo run --bin openapi-dump` for
//! external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{BadgeTier, Error, ErrorCode, HazardType, ReportStatus, Role, ValidationStatus};
use crate::inbound::http::auth::{GmailLoginBody, LoginBody};
use crate::inbound::http::leaderboard::LeaderboardPageDto;
use crate::inbound::http::reports::{ResolveBody, SubmitReportBody, VoteBody, VoteReceiptDto};
use crate::inbound::http::schemas::{ProfileDto, ReportDto, SolutionDto, VoteTallyDto};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
///
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "CivicEye backend API",
        description = "Crowd-sourced hazard reporting: submission, peer validation, reputation, and leaderboard.",
        license(name = "MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::login_gmail,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::reports::submit_report,
        crate::inbound::http::reports::list_reports,
        crate::inbound::http::reports::list_pending_reports,
        crate::inbound::http::reports::list_validated_reports,
        crate::inbound::http::reports::cast_vote,
        crate::inbound::http::reports::resolve_report,
        crate::inbound::http::leaderboard::leaderboard,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Role,
        BadgeTier,
        HazardType,
        ReportStatus,
        ValidationStatus,
        ProfileDto,
        ReportDto,
        SolutionDto,
        VoteTallyDto,
        VoteReceiptDto,
        LoginBody,
        GmailLoginBody,
        SubmitReportBody,
        VoteBody,
        ResolveBody,
        LeaderboardPageDto,
    )),
    tags(
        (name = "auth", description = "Login, logout, and the current profile"),
        (name = "reports", description = "Hazard report submission, listing, voting, and resolution"),
        (name = "leaderboard", description = "Ranked reputation pages"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document structure.

    use rstest::rstest;
    use utoipa::OpenApi;

    use super::*;

    #[rstest]
    fn every_api_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/login",
            "/api/v1/login/gmail",
            "/api/v1/logout",
            "/api/v1/me",
            "/api/v1/reports",
            "/api/v1/reports/pending",
            "/api/v1/reports/validated",
            "/api/v1/reports/{id}/votes",
            "/api/v1/reports/{id}/resolution",
            "/api/v1/leaderboard",
            "/health/ready",
            "/health/live",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path: {path}");
        }
    }

    #[rstest]
    fn the_session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }

    #[rstest]
    fn the_document_serialises_to_json() {
        let json = ApiDoc::openapi().to_json().expect("document serialises");
        assert!(json.contains("CivicEye"));
    }
}
