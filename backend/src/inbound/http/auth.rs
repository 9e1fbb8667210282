//! Login, logout, and profile handlers.
//!
//! ```text
//! POST /api/v1/login        {"credential":"darpan42","ngo":false}
//! POST /api/v1/login/gmail  {"email":"jane@gmail.com"}
//! POST /api/v1/logout
//! GET  /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::Error;
use crate::domain::ports::LoginRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ProfileDto;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Raw login credential.
    pub credential: String,
    /// Log in as a registered NGO.
    #[serde(default)]
    pub ngo: bool,
}

/// Login request body for `POST /api/v1/login/gmail`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GmailLoginBody {
    /// Gmail address to derive the identifier from.
    pub email: String,
}

/// Authenticate with a raw credential and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = ProfileDto,
         headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid credential", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginBody>,
) -> ApiResult<web::Json<ProfileDto>> {
    let body = payload.into_inner();
    let record = state
        .login
        .login(LoginRequest {
            credential: body.credential,
            ngo: body.ngo,
        })
        .await?;
    session.persist_user(record.id())?;
    Ok(web::Json(record.into()))
}

/// Authenticate with a Gmail address and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login/gmail",
    request_body = GmailLoginBody,
    responses(
        (status = 200, description = "Login success", body = ProfileDto,
         headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid email", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "loginWithGmail",
    security([])
)]
#[post("/login/gmail")]
pub async fn login_gmail(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<GmailLoginBody>,
) -> ApiResult<web::Json<ProfileDto>> {
    let record = state.login.login_with_email(&payload.email).await?;
    session.persist_user(record.id())?;
    Ok(web::Json(record.into()))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Current user's ledger record.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = ProfileDto),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "No ledger record", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileDto>> {
    let user_id = session.require_user_id()?;
    let record = state.profile.fetch(&user_id).await?;
    Ok(web::Json(record.into()))
}
