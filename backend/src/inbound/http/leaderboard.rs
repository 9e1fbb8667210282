//! Leaderboard handler.
//!
//! ```text
//! GET /api/v1/leaderboard?sortKey=points&direction=descending&page=2&pageSize=10
//! GET /api/v1/leaderboard?cursor=<opaque>
//! ```

use actix_web::{HttpRequest, get, web};
use pagination::{Cursor, PageEnvelope, PageLinks, PageNumber, PageSize};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::domain::Error;
use crate::domain::ports::{LeaderboardEntry, LeaderboardRequest, SortDirection, SortKey};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Largest page a single request may ask for.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query parameters for `GET /api/v1/leaderboard`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardParams {
    /// Column to sort on. Defaults to points.
    pub sort_key: Option<SortKey>,
    /// Sort direction. Defaults to descending.
    pub direction: Option<SortDirection>,
    /// 1-indexed page number. Defaults to 1.
    pub page: Option<u32>,
    /// Items per page. Defaults to the server-configured size.
    pub page_size: Option<u32>,
    /// Opaque cursor; when present it overrides `page` and `pageSize`.
    pub cursor: Option<String>,
}

/// Leaderboard response payload.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPageDto {
    /// Ranked entries on this page.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub envelope: PageEnvelope<LeaderboardEntry>,
    /// Links to the neighbouring pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub links: Option<PageLinks>,
    /// Opaque cursor for the following page, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

fn page_coordinates(
    params: &LeaderboardParams,
    default_size: PageSize,
) -> Result<(PageNumber, PageSize), Error> {
    if let Some(token) = params.cursor.as_deref() {
        let cursor = Cursor::decode(token).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "cursor", "code": "invalid_cursor" }))
        })?;
        return Ok((cursor.page, cursor.page_size));
    }

    let page = match params.page {
        Some(raw) => PageNumber::new(raw).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "page", "code": "out_of_range" }))
        })?,
        None => PageNumber::FIRST,
    };
    let page_size = match params.page_size {
        Some(raw) if raw > MAX_PAGE_SIZE => {
            return Err(Error::invalid_request(format!(
                "page size must be at most {MAX_PAGE_SIZE}"
            ))
            .with_details(json!({ "field": "pageSize", "code": "out_of_range" })));
        }
        Some(raw) => PageSize::new(raw).map_err(|err| {
            Error::invalid_request(err.to_string())
                .with_details(json!({ "field": "pageSize", "code": "out_of_range" }))
        })?,
        None => default_size,
    };
    Ok((page, page_size))
}

fn request_url(req: &HttpRequest) -> Option<Url> {
    let info = req.connection_info().clone();
    Url::parse(&format!(
        "{}://{}{}",
        info.scheme(),
        info.host(),
        req.uri()
    ))
    .ok()
}

/// Ranked, paginated leaderboard over the reputation ledger.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    params(LeaderboardParams),
    responses(
        (status = 200, description = "Leaderboard page", body = LeaderboardPageDto),
        (status = 400, description = "Invalid paging parameters", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["leaderboard"],
    operation_id = "leaderboard"
)]
#[get("/leaderboard")]
pub async fn leaderboard(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    params: web::Query<LeaderboardParams>,
) -> ApiResult<web::Json<LeaderboardPageDto>> {
    session.require_user_id()?;
    let params = params.into_inner();
    let (page, page_size) = page_coordinates(&params, state.leaderboard_page_size)?;

    let envelope = state
        .leaderboard
        .rank(LeaderboardRequest {
            sort_key: params.sort_key.unwrap_or_default(),
            direction: params.direction.unwrap_or_default(),
            page,
            page_size,
        })
        .await?;

    let links = request_url(&req).map(|base| PageLinks::for_envelope(&base, &envelope));
    let next_cursor = envelope.has_next().then(|| {
        Cursor::new(
            PageNumber::new(envelope.page + 1).unwrap_or(PageNumber::FIRST),
            page_size,
        )
        .encode()
    });

    Ok(web::Json(LeaderboardPageDto {
        envelope,
        links,
        next_cursor,
    }))
}
