//! Leaderboard ranking over the reputation ledger.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{PageEnvelope, paginate};

use crate::domain::error::Error;
use crate::domain::identity_service::map_ledger_error;
use crate::domain::ports::{
    LeaderboardEntry, LeaderboardQuery, LeaderboardRequest, SortDirection, SortKey,
    UserLedgerRepository,
};
use crate::domain::reputation::UserRecord;

fn sort_value(record: &UserRecord, key: SortKey) -> u64 {
    match key {
        SortKey::Points => record.points(),
        SortKey::Level => u64::from(record.level()),
    }
}

/// Stable-sort ledger records on the requested key.
///
/// `Vec::sort_by` is a stable sort, so ties keep the relative order of the
/// input for either direction; reversing the comparator rather than the
/// result is what preserves that property when descending.
pub fn rank_records(records: &mut [UserRecord], sort_key: SortKey, direction: SortDirection) {
    records.sort_by(|a, b| {
        let ordering = sort_value(a, sort_key).cmp(&sort_value(b, sort_key));
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Leaderboard use case over the ledger repository.
#[derive(Clone)]
pub struct LeaderboardService<L> {
    ledger: Arc<L>,
}

impl<L> LeaderboardService<L> {
    /// Create a service over the given ledger repository.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl<L> LeaderboardQuery for LeaderboardService<L>
where
    L: UserLedgerRepository,
{
    async fn rank(
        &self,
        request: LeaderboardRequest,
    ) -> Result<PageEnvelope<LeaderboardEntry>, Error> {
        let mut records = self.ledger.list_all().await.map_err(map_ledger_error)?;
        rank_records(&mut records, request.sort_key, request.direction);

        let entries: Vec<LeaderboardEntry> = records
            .iter()
            .enumerate()
            .map(|(index, record)| LeaderboardEntry {
                rank: index as u64 + 1,
                user: record.id().clone(),
                points: record.points(),
                level: record.level(),
                badge: record.badge(),
            })
            .collect();

        let total = entries.len() as u64;
        let page_items = paginate(&entries, request.page_size, request.page);
        Ok(PageEnvelope::new(
            page_items,
            request.page,
            request.page_size,
            total,
        ))
    }
}
