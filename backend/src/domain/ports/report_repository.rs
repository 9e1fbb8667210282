//! Port abstraction for hazard report persistence adapters.
//!
//! The underlying storage collaborator may only support whole-snapshot
//! reads and writes; adapters hide that behind per-record operations so no
//! component ever handles the full collection.

use async_trait::async_trait;

use crate::domain::hazard::HazardReport;
use crate::domain::report_id::ReportId;

/// Persistence errors raised by report repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportRepositoryError {
    /// Repository backing store could not be reached.
    #[error("report repository connection failed: {message}")]
    Connection {
        /// Adapter failure detail.
        message: String,
    },
    /// Read or write failed during execution.
    #[error("report repository query failed: {message}")]
    Query {
        /// Adapter failure detail.
        message: String,
    },
    /// Insert collided with an existing report id.
    #[error("report {id} already exists")]
    DuplicateId {
        /// The colliding identifier.
        id: ReportId,
    },
    /// Update targeted a report that does not exist.
    #[error("report {id} does not exist")]
    NotFound {
        /// The missing identifier.
        id: ReportId,
    },
    /// Compare-and-swap failed: someone else wrote the record first.
    #[error("report revision mismatch: expected {expected}, found {actual}")]
    RevisionMismatch {
        /// Revision the caller read.
        expected: u32,
        /// Revision currently stored.
        actual: u32,
    },
}

/// Port for reading and writing hazard reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persist a freshly submitted report.
    async fn insert(&self, report: &HazardReport) -> Result<(), ReportRepositoryError>;

    /// Fetch a report by id.
    async fn find_by_id(&self, id: ReportId)
    -> Result<Option<HazardReport>, ReportRepositoryError>;

    /// Replace a report, guarded by the revision the caller read.
    ///
    /// The stored record must still carry `expected_revision`; the caller
    /// supplies `report` with the revision already advanced.
    async fn update(
        &self,
        report: &HazardReport,
        expected_revision: u32,
    ) -> Result<(), ReportRepositoryError>;

    /// All reports in insertion order.
    async fn list(&self) -> Result<Vec<HazardReport>, ReportRepositoryError>;
}

/// Fixture implementation for tests that do not exercise report persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportRepository;

#[async_trait]
impl ReportRepository for FixtureReportRepository {
    async fn insert(&self, _report: &HazardReport) -> Result<(), ReportRepositoryError> {
        Ok(())
    }

    async fn find_by_id(
        &self,
        _id: ReportId,
    ) -> Result<Option<HazardReport>, ReportRepositoryError> {
        Ok(None)
    }

    async fn update(
        &self,
        _report: &HazardReport,
        _expected_revision: u32,
    ) -> Result<(), ReportRepositoryError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HazardReport>, ReportRepositoryError> {
        Ok(Vec::new())
    }
}
