//! Driving port for report listings.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::hazard::HazardReport;

/// Port for reading report collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportsQuery: Send + Sync {
    /// Every report, most recent first.
    async fn list_all(&self) -> Result<Vec<HazardReport>, Error>;

    /// Reports still collecting votes, in insertion order.
    async fn list_pending(&self) -> Result<Vec<HazardReport>, Error>;

    /// Peer-confirmed reports, ordered by urgency then recency.
    async fn list_validated(&self) -> Result<Vec<HazardReport>, Error>;
}

/// Fixture implementation with no reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportsQuery;

#[async_trait]
impl ReportsQuery for FixtureReportsQuery {
    async fn list_all(&self) -> Result<Vec<HazardReport>, Error> {
        Ok(Vec::new())
    }

    async fn list_pending(&self) -> Result<Vec<HazardReport>, Error> {
        Ok(Vec::new())
    }

    async fn list_validated(&self) -> Result<Vec<HazardReport>, Error> {
        Ok(Vec::new())
    }
}
