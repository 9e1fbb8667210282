//! HTTP inbound adapter.
//!
//! Purpose: translate HTTP requests into driving-port calls and domain
//! errors into HTTP responses. Handlers stay thin; validation and rules live
//! in the domain services behind [`state::HttpState`].

pub mod auth;
pub mod error;
pub mod health;
pub mod leaderboard;
pub mod reports;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

use actix_web::web;

pub use self::error::ApiResult;
pub use self::session::SessionContext;
pub use self::state::{HttpState, HttpStatePorts};

/// Register every `/api/v1` handler on the given config.
///
/// The caller owns the surrounding scope and session middleware so tests and
/// the production server can wrap them differently.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login)
        .service(auth::login_gmail)
        .service(auth::logout)
        .service(auth::me)
        .service(reports::submit_report)
        .service(reports::list_reports)
        .service(reports::list_pending_reports)
        .service(reports::list_validated_reports)
        .service(reports::cast_vote)
        .service(reports::resolve_report)
        .service(leaderboard::leaderboard);
}
