//! JSON snapshot adapter for the reputation ledger port.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::ports::{UserLedgerRepository, UserLedgerRepositoryError};
use crate::domain::{Role, UserId, UserRecord};
use crate::outbound::persistence::rows::UserRow;
use crate::outbound::persistence::snapshot::{SnapshotError, SnapshotStore};

const SNAPSHOT_NAME: &str = "users.json";

fn map_snapshot_error(error: SnapshotError) -> UserLedgerRepositoryError {
    UserLedgerRepositoryError::Query {
        message: error.to_string(),
    }
}

/// Ledger repository over a [`SnapshotStore`].
pub struct JsonUserLedgerRepository {
    store: Arc<SnapshotStore>,
    cache: RwLock<BTreeMap<UserId, UserRecord>>,
}

impl JsonUserLedgerRepository {
    /// Load the snapshot and build the repository.
    ///
    /// # Errors
    /// [`UserLedgerRepositoryError::Connection`] when the snapshot cannot be
    /// read.
    pub fn open(store: Arc<SnapshotStore>) -> Result<Self, UserLedgerRepositoryError> {
        let rows: Vec<UserRow> = store
            .load(SNAPSHOT_NAME)
            .map_err(|err| UserLedgerRepositoryError::Connection {
                message: err.to_string(),
            })?
            .unwrap_or_default();
        let cache = rows
            .into_iter()
            .map(|row| {
                let record: UserRecord = row.into();
                (record.id().clone(), record)
            })
            .collect();
        Ok(Self {
            store,
            cache: RwLock::new(cache),
        })
    }

    fn persist(
        &self,
        cache: &BTreeMap<UserId, UserRecord>,
    ) -> Result<(), UserLedgerRepositoryError> {
        let rows: Vec<UserRow> = cache.values().map(UserRow::from).collect();
        self.store
            .store(SNAPSHOT_NAME, &rows)
            .map_err(map_snapshot_error)
    }

    fn write_lock(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<UserId, UserRecord>>, UserLedgerRepositoryError>
    {
        self.cache
            .write()
            .map_err(|_| UserLedgerRepositoryError::Query {
                message: "ledger cache lock poisoned".to_owned(),
            })
    }

    fn read_lock(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<UserId, UserRecord>>, UserLedgerRepositoryError>
    {
        self.cache
            .read()
            .map_err(|_| UserLedgerRepositoryError::Query {
                message: "ledger cache lock poisoned".to_owned(),
            })
    }
}

#[async_trait]
impl UserLedgerRepository for JsonUserLedgerRepository {
    async fn find(&self, id: &UserId) -> Result<Option<UserRecord>, UserLedgerRepositoryError> {
        Ok(self.read_lock()?.get(id).cloned())
    }

    async fn upsert(&self, record: &UserRecord) -> Result<(), UserLedgerRepositoryError> {
        let mut cache = self.write_lock()?;
        cache.insert(record.id().clone(), record.clone());
        self.persist(&cache)
    }

    async fn award_points(
        &self,
        id: &UserId,
        delta: u64,
    ) -> Result<UserRecord, UserLedgerRepositoryError> {
        let mut cache = self.write_lock()?;
        let record = cache
            .entry(id.clone())
            .or_insert_with(|| UserRecord::new(id.clone(), Role::Citizen));
        record.award(delta);
        let updated = record.clone();
        self.persist(&cache)?;
        Ok(updated)
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, UserLedgerRepositoryError> {
        Ok(self.read_lock()?.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> Arc<SnapshotStore> {
        Arc::new(SnapshotStore::open(dir.path()).expect("store opens"))
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).expect("fixture id")
    }

    #[rstest]
    #[tokio::test]
    async fn records_survive_a_reopen_with_rederived_levels() {
        let dir = tempfile::tempdir().expect("temp dir");
        {
            let repo = JsonUserLedgerRepository::open(store_in(&dir)).expect("repo opens");
            repo.upsert(&UserRecord::new(user("NGO_helper99"), Role::Ngo))
                .await
                .expect("upsert succeeds");
            repo.award_points(&user("NGO_helper99"), 25)
                .await
                .expect("award succeeds");
        }

        let reopened = JsonUserLedgerRepository::open(store_in(&dir)).expect("repo reopens");
        let record = reopened
            .find(&user("NGO_helper99"))
            .await
            .expect("find succeeds")
            .expect("record exists");
        assert_eq!(record.points(), 25);
        assert_eq!(record.level(), 3);
        assert_eq!(record.role(), Role::Ngo);
    }

    #[rstest]
    #[tokio::test]
    async fn awards_auto_create_missing_records() {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = JsonUserLedgerRepository::open(store_in(&dir)).expect("repo opens");

        let record = repo
            .award_points(&user("stranger9"), 10)
            .await
            .expect("award succeeds");
        assert_eq!(record.points(), 10);
        assert_eq!(record.level(), 2);
        assert_eq!(record.role(), Role::Citizen);

        let found = repo
            .find(&user("stranger9"))
            .await
            .expect("find succeeds")
            .expect("record was created");
        assert_eq!(found, record);
    }

    #[rstest]
    #[tokio::test]
    async fn level_invariant_holds_after_every_award() {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = JsonUserLedgerRepository::open(store_in(&dir)).expect("repo opens");

        for delta in [1, 10, 5, 3, 100] {
            let record = repo
                .award_points(&user("voter001"), delta)
                .await
                .expect("award succeeds");
            assert_eq!(
                u64::from(record.level()),
                record.points() / 10 + 1,
                "after +{delta}"
            );
        }
    }

    #[rstest]
    #[tokio::test]
    async fn list_all_returns_every_record() {
        let dir = tempfile::tempdir().expect("temp dir");
        let repo = JsonUserLedgerRepository::open(store_in(&dir)).expect("repo opens");
        for id in ["useraaa", "userbbb", "userccc"] {
            repo.upsert(&UserRecord::new(user(id), Role::Citizen))
                .await
                .expect("upsert succeeds");
        }
        assert_eq!(repo.list_all().await.expect("list succeeds").len(), 3);
    }
}
