//! Driving port for credential and email login.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::identity::{Role, UserId};
use crate::domain::reputation::UserRecord;

/// Login request carried from the inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Raw login credential as typed by the user.
    pub credential: String,
    /// Whether the user logs in as a registered NGO.
    pub ngo: bool,
}

/// Port for establishing an identity and its ledger record.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Resolve a raw credential, ensuring a ledger record exists.
    async fn login(&self, request: LoginRequest) -> Result<UserRecord, Error>;

    /// Resolve a Gmail address, ensuring a ledger record exists.
    async fn login_with_email(&self, email: &str) -> Result<UserRecord, Error>;
}

/// Fixture implementation accepting any input as a citizen account.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn login(&self, request: LoginRequest) -> Result<UserRecord, Error> {
        let role = if request.ngo { Role::Ngo } else { Role::Citizen };
        let id = UserId::resolve(&request.credential, role)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(UserRecord::new(id, role))
    }

    async fn login_with_email(&self, email: &str) -> Result<UserRecord, Error> {
        let id = UserId::resolve_email(email)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        Ok(UserRecord::new(id, Role::Citizen))
    }
}
