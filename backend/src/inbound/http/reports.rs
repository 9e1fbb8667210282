//! Hazard report handlers.
//!
//! ```text
//! POST /api/v1/reports                  Submit a report
//! GET  /api/v1/reports                  All reports, most recent first
//! GET  /api/v1/reports/pending          Peer-review queue
//! GET  /api/v1/reports/validated        Urgency-ordered confirmed reports
//! POST /api/v1/reports/{id}/votes      Cast a validation vote
//! POST /api/v1/reports/{id}/resolution Mark a report resolved
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{CastVoteRequest, ResolveReportRequest, SubmitReportRequest};
use crate::domain::{Error, ReportId, ReportStatus};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ReportDto;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Submission body for `POST /api/v1/reports`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReportBody {
    /// Hazard description, at least ten characters.
    pub description: String,
    /// Hazard category label.
    #[serde(rename = "type")]
    #[schema(example = "Electrical Hazard")]
    pub hazard_type: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Optional raw image payload, for example a data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Vote body for `POST /api/v1/reports/{id}/votes`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
    /// `true` confirms the hazard, `false` rejects it.
    pub valid: bool,
    /// Optional remediation suggestion, attached only to valid votes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
}

/// Vote response payload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceiptDto {
    /// The report after the vote was applied.
    pub report: ReportDto,
    /// Whether this vote moved the report from pending to valid.
    pub newly_valid: bool,
}

/// Resolution body for `POST /api/v1/reports/{id}/resolution`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveBody {
    /// New operational state.
    pub status: ReportStatus,
}

/// Submit a new hazard report.
#[utoipa::path(
    post,
    path = "/api/v1/reports",
    request_body = SubmitReportBody,
    responses(
        (status = 201, description = "Report created", body = ReportDto),
        (status = 400, description = "Invalid fields", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reports"],
    operation_id = "submitReport"
)]
#[post("/reports")]
pub async fn submit_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SubmitReportBody>,
) -> ApiResult<HttpResponse> {
    let reporter = session.require_user_id()?;
    let body = payload.into_inner();
    let report = state
        .reports
        .submit(SubmitReportRequest {
            reporter,
            description: body.description,
            hazard_type: body.hazard_type,
            latitude: body.latitude,
            longitude: body.longitude,
            image: body.image,
        })
        .await?;
    Ok(HttpResponse::Created().json(ReportDto::from(report)))
}

/// List every report, most recent first.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    responses(
        (status = 200, description = "Reports", body = [ReportDto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listReports"
)]
#[get("/reports")]
pub async fn list_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ReportDto>>> {
    session.require_user_id()?;
    let reports = state.reports_query.list_all().await?;
    Ok(web::Json(reports.into_iter().map(Into::into).collect()))
}

/// List reports still collecting votes.
#[utoipa::path(
    get,
    path = "/api/v1/reports/pending",
    responses(
        (status = 200, description = "Pending reports", body = [ReportDto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listPendingReports"
)]
#[get("/reports/pending")]
pub async fn list_pending_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ReportDto>>> {
    session.require_user_id()?;
    let reports = state.reports_query.list_pending().await?;
    Ok(web::Json(reports.into_iter().map(Into::into).collect()))
}

/// List peer-confirmed reports, highest urgency first.
#[utoipa::path(
    get,
    path = "/api/v1/reports/validated",
    responses(
        (status = 200, description = "Validated reports", body = [ReportDto]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reports"],
    operation_id = "listValidatedReports"
)]
#[get("/reports/validated")]
pub async fn list_validated_reports(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<ReportDto>>> {
    session.require_user_id()?;
    let reports = state.reports_query.list_validated().await?;
    Ok(web::Json(reports.into_iter().map(Into::into).collect()))
}

/// Cast a validation vote on a report.
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/votes",
    params(("id" = i64, Path, description = "Report identifier")),
    request_body = VoteBody,
    responses(
        (status = 200, description = "Vote counted", body = VoteReceiptDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Voting on own report", body = Error),
        (status = 404, description = "Unknown report", body = Error),
        (status = 409, description = "Duplicate vote", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reports"],
    operation_id = "castVote"
)]
#[post("/reports/{id}/votes")]
pub async fn cast_vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<VoteBody>,
) -> ApiResult<web::Json<VoteReceiptDto>> {
    let voter = session.require_user_id()?;
    let body = payload.into_inner();
    let receipt = state
        .votes
        .cast_vote(CastVoteRequest {
            report_id: ReportId::from_millis(path.into_inner()),
            voter,
            is_valid: body.valid,
            solution: body.solution,
        })
        .await?;
    Ok(web::Json(VoteReceiptDto {
        report: receipt.report.into(),
        newly_valid: receipt.newly_valid,
    }))
}

/// Mark a report resolved (or reopen it).
#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/resolution",
    params(("id" = i64, Path, description = "Report identifier")),
    request_body = ResolveBody,
    responses(
        (status = 200, description = "Resolution recorded", body = ReportDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown report", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["reports"],
    operation_id = "resolveReport"
)]
#[post("/reports/{id}/resolution")]
pub async fn resolve_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    payload: web::Json<ResolveBody>,
) -> ApiResult<web::Json<ReportDto>> {
    let resolver = session.require_user_id()?;
    let report = state
        .reports
        .resolve(ResolveReportRequest {
            report_id: ReportId::from_millis(path.into_inner()),
            resolver,
            new_status: payload.status,
        })
        .await?;
    Ok(web::Json(report.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use chrono::Utc;
    use pagination::PageSize;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{MockReportsCommand, MockVoteCommand, VoteReceipt};
    use crate::domain::{
        Coordinates, Description, HazardReport, HazardType, ReportDraft, UserId,
    };
    use crate::inbound::http::auth::{LoginBody, login};
    use crate::inbound::http::state::{HttpState, HttpStatePorts};

    fn sample_report() -> HazardReport {
        let draft = ReportDraft {
            reporter: UserId::new("reporter1").expect("fixture id"),
            description: Description::new("Exposed wiring near the bus stop")
                .expect("fixture description"),
            hazard_type: HazardType::Electrical,
            location: Coordinates::new(28.61, 77.21).expect("fixture coordinates"),
            image: None,
        };
        HazardReport::submit(draft, ReportId::from_millis(7), Utc::now())
    }

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(crate::inbound::http::test_utils::test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(login)
                    .service(submit_report)
                    .service(list_reports)
                    .service(list_pending_reports)
                    .service(list_validated_reports)
                    .service(cast_vote)
                    .service(resolve_report),
            )
    }

    async fn login_cookie<S, B>(app: &S) -> actix_web::cookie::Cookie<'static>
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = actix_web::dev::ServiceResponse<B>,
                Error = actix_web::Error,
            >,
        B: actix_web::body::MessageBody,
    {
        let response = actix_test::call_service(
            app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(&LoginBody {
                    credential: "voter001".to_owned(),
                    ngo: false,
                })
                .to_request(),
        )
        .await;
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    fn state_with(ports: HttpStatePorts) -> HttpState {
        HttpState::new(ports, PageSize::new(10).expect("non-zero"))
    }

    #[rstest]
    #[actix_web::test]
    async fn submission_requires_a_session() {
        let app = actix_test::init_service(test_app(state_with(HttpStatePorts::default()))).await;
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reports")
                .set_json(json!({
                    "description": "Flooded underpass on main road",
                    "type": "Flood",
                    "latitude": 26.2,
                    "longitude": 92.9,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn submission_returns_created_with_the_report() {
        let app = actix_test::init_service(test_app(state_with(HttpStatePorts::default()))).await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reports")
                .cookie(cookie)
                .set_json(json!({
                    "description": "Flooded underpass on main road",
                    "type": "Flood",
                    "latitude": 26.2,
                    "longitude": 92.9,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("report payload");
        assert_eq!(value.get("type").and_then(Value::as_str), Some("Flood"));
        assert_eq!(value.get("urgency").and_then(Value::as_u64), Some(3));
        assert_eq!(
            value.get("validationStatus").and_then(Value::as_str),
            Some("pending")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn vote_conflicts_surface_as_409() {
        let mut votes = MockVoteCommand::new();
        votes.expect_cast_vote().times(1).return_once(|_| {
            Err(Error::conflict("user has already voted on this report")
                .with_details(json!({ "code": "duplicate_vote" })))
        });
        let ports = HttpStatePorts {
            votes: Arc::new(votes),
            ..HttpStatePorts::default()
        };
        let app = actix_test::init_service(test_app(state_with(ports))).await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reports/7/votes")
                .cookie(cookie)
                .set_json(&VoteBody {
                    valid: true,
                    solution: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn votes_return_the_updated_report() {
        let mut votes = MockVoteCommand::new();
        votes.expect_cast_vote().times(1).return_once(|request| {
            assert_eq!(request.report_id, ReportId::from_millis(7));
            assert!(request.is_valid);
            let mut report = sample_report();
            report
                .apply_vote(&request.voter, true, request.solution)
                .expect("vote applies");
            Ok(VoteReceipt {
                report,
                newly_valid: false,
            })
        });
        let ports = HttpStatePorts {
            votes: Arc::new(votes),
            ..HttpStatePorts::default()
        };
        let app = actix_test::init_service(test_app(state_with(ports))).await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reports/7/votes")
                .cookie(cookie)
                .set_json(&VoteBody {
                    valid: true,
                    solution: Some("fence it off".to_owned()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("receipt payload");
        assert_eq!(value.get("newlyValid").and_then(Value::as_bool), Some(false));
        assert_eq!(
            value
                .pointer("/report/votes/valid")
                .and_then(Value::as_u64),
            Some(1)
        );
        assert_eq!(
            value
                .pointer("/report/solutions/0/text")
                .and_then(Value::as_str),
            Some("fence it off")
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn resolution_passes_the_session_identity_to_the_service() {
        let mut reports = MockReportsCommand::new();
        reports.expect_resolve().times(1).return_once(|request| {
            assert_eq!(request.resolver.as_ref(), "voter001");
            assert_eq!(request.new_status, ReportStatus::Resolved);
            let mut report = sample_report();
            report.resolve(request.resolver, request.new_status);
            Ok(report)
        });
        let ports = HttpStatePorts {
            reports: Arc::new(reports),
            ..HttpStatePorts::default()
        };
        let app = actix_test::init_service(test_app(state_with(ports))).await;
        let cookie = login_cookie(&app).await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/reports/7/resolution")
                .cookie(cookie)
                .set_json(&ResolveBody {
                    status: ReportStatus::Resolved,
                })
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = actix_test::read_body(response).await;
        let value: Value = serde_json::from_slice(&body).expect("report payload");
        assert_eq!(
            value.get("resolvedBy").and_then(Value::as_str),
            Some("voter001")
        );
        assert_eq!(value.get("status").and_then(Value::as_str), Some("resolved"));
    }

    #[rstest]
    #[actix_web::test]
    async fn listings_reject_anonymous_callers() {
        let app = actix_test::init_service(test_app(state_with(HttpStatePorts::default()))).await;
        for uri in [
            "/api/v1/reports",
            "/api/v1/reports/pending",
            "/api/v1/reports/validated",
        ] {
            let response = actix_test::call_service(
                &app,
                actix_test::TestRequest::get().uri(uri).to_request(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }
}
