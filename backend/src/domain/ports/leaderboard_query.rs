//! Driving port for the ranked, paginated leaderboard.

use async_trait::async_trait;
use pagination::{PageEnvelope, PageNumber, PageSize};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::error::Error;
use crate::domain::identity::UserId;
use crate::domain::reputation::BadgeTier;

/// Numeric column the leaderboard sorts on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    /// Order by accumulated points.
    #[default]
    Points,
    /// Order by derived level.
    Level,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first; the leaderboard's natural reading order.
    #[default]
    Descending,
}

impl SortDirection {
    /// The opposite direction, for column-header toggling.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Leaderboard page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardRequest {
    /// Column to sort on.
    pub sort_key: SortKey,
    /// Sort direction.
    pub direction: SortDirection,
    /// 1-indexed page.
    pub page: PageNumber,
    /// Items per page.
    pub page_size: PageSize,
}

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Absolute 1-indexed rank under the requested ordering.
    pub rank: u64,
    /// Ranked user.
    #[schema(value_type = String, example = "NGO_darpan42")]
    pub user: UserId,
    /// Accumulated points.
    pub points: u64,
    /// Derived level.
    pub level: u32,
    /// Display badge for the level.
    pub badge: BadgeTier,
}

/// Port for reading ranked leaderboard pages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaderboardQuery: Send + Sync {
    /// Rank every ledger record and slice out the requested page.
    async fn rank(
        &self,
        request: LeaderboardRequest,
    ) -> Result<PageEnvelope<LeaderboardEntry>, Error>;
}

/// Fixture implementation with an empty ledger.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLeaderboardQuery;

#[async_trait]
impl LeaderboardQuery for FixtureLeaderboardQuery {
    async fn rank(
        &self,
        request: LeaderboardRequest,
    ) -> Result<PageEnvelope<LeaderboardEntry>, Error> {
        Ok(PageEnvelope::new(
            Vec::new(),
            request.page,
            request.page_size,
            0,
        ))
    }
}
