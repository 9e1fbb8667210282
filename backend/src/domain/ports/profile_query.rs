//! Driving port for reading the authenticated user's ledger record.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::identity::{Role, UserId};
use crate::domain::reputation::UserRecord;

/// Port for fetching one user's reputation record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileQuery: Send + Sync {
    /// Fetch the record for `id`, creating nothing.
    async fn fetch(&self, id: &UserId) -> Result<UserRecord, Error>;
}

/// Fixture implementation returning a fresh citizen record.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileQuery;

#[async_trait]
impl ProfileQuery for FixtureProfileQuery {
    async fn fetch(&self, id: &UserId) -> Result<UserRecord, Error> {
        Ok(UserRecord::new(id.clone(), Role::Citizen))
    }
}
