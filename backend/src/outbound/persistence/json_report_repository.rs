//! JSON snapshot adapter for the report repository port.
//!
//! Keeps the full collection in memory behind one write lock and rewrites
//! the snapshot document on every mutation, making this process the single
//! writer the storage collaborator requires. The per-record revision guard
//! on [`ReportRepository::update`] is what upholds the
//! at-most-one-vote-counted-per-user invariant for concurrent requests.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::HazardReport;
use crate::domain::ReportId;
use crate::domain::ports::{ReportRepository, ReportRepositoryError};
use crate::outbound::persistence::rows::ReportRow;
use crate::outbound::persistence::snapshot::{SnapshotError, SnapshotStore};

const SNAPSHOT_NAME: &str = "reports.json";

fn map_snapshot_error(error: SnapshotError) -> ReportRepositoryError {
    ReportRepositoryError::Query {
        message: error.to_string(),
    }
}

/// Report repository over a [`SnapshotStore`].
pub struct JsonReportRepository {
    store: Arc<SnapshotStore>,
    // BTreeMap keeps reports in id order, which is insertion order because
    // ids are strictly increasing.
    cache: RwLock<BTreeMap<ReportId, HazardReport>>,
}

impl JsonReportRepository {
    /// Load the snapshot and build the repository.
    ///
    /// # Errors
    /// [`ReportRepositoryError::Connection`] when the snapshot cannot be
    /// read or holds rows that no longer validate.
    pub fn open(store: Arc<SnapshotStore>) -> Result<Self, ReportRepositoryError> {
        let rows: Vec<ReportRow> = store
            .load(SNAPSHOT_NAME)
            .map_err(|err| ReportRepositoryError::Connection {
                message: err.to_string(),
            })?
            .unwrap_or_default();
        let mut cache = BTreeMap::new();
        for row in rows {
            let report: HazardReport =
                row.try_into()
                    .map_err(|err: crate::domain::ReportValidationError| {
                        ReportRepositoryError::Connection {
                            message: format!("stored report fails validation: {err}"),
                        }
                    })?;
            cache.insert(report.id(), report);
        }
        Ok(Self {
            store,
            cache: RwLock::new(cache),
        })
    }

    fn persist(
        &self,
        cache: &BTreeMap<ReportId, HazardReport>,
    ) -> Result<(), ReportRepositoryError> {
        let rows: Vec<ReportRow> = cache.values().map(ReportRow::from).collect();
        self.store
            .store(SNAPSHOT_NAME, &rows)
            .map_err(map_snapshot_error)
    }

    fn write_lock(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<ReportId, HazardReport>>, ReportRepositoryError>
    {
        self.cache.write().map_err(|_| ReportRepositoryError::Query {
            message: "report cache lock poisoned".to_owned(),
        })
    }

    fn read_lock(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<ReportId, HazardReport>>, ReportRepositoryError>
    {
        self.cache.read().map_err(|_| ReportRepositoryError::Query {
            message: "report cache lock poisoned".to_owned(),
        })
    }
}

#[async_trait]
impl ReportRepository for JsonReportRepository {
    async fn insert(&self, report: &HazardReport) -> Result<(), ReportRepositoryError> {
        let mut cache = self.write_lock()?;
        if cache.contains_key(&report.id()) {
            return Err(ReportRepositoryError::DuplicateId { id: report.id() });
        }
        cache.insert(report.id(), report.clone());
        self.persist(&cache)
    }

    async fn find_by_id(
        &self,
        id: ReportId,
    ) -> Result<Option<HazardReport>, ReportRepositoryError> {
        Ok(self.read_lock()?.get(&id).cloned())
    }

    async fn update(
        &self,
        report: &HazardReport,
        expected_revision: u32,
    ) -> Result<(), ReportRepositoryError> {
        let mut cache = self.write_lock()?;
        let Some(current) = cache.get(&report.id()) else {
            return Err(ReportRepositoryError::NotFound { id: report.id() });
        };
        if current.revision() != expected_revision {
            return Err(ReportRepositoryError::RevisionMismatch {
                expected: expected_revision,
                actual: current.revision(),
            });
        }
        cache.insert(report.id(), report.clone());
        self.persist(&cache)
    }

    async fn list(&self) -> Result<Vec<HazardReport>, ReportRepositoryError> {
        Ok(self.read_lock()?.values().cloned().collect())
    }
}
