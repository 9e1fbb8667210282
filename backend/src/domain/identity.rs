//! User identity: credential resolution, identifier namespaces, and roles.
//!
//! Identifiers come in three disjoint namespaces. Raw credentials are
//! strictly alphanumeric, so the prefixed forms (which contain `_`) can never
//! collide with them or with each other:
//!
//! - `abc123`: citizen credential, at least six alphanumeric characters
//! - `NGO_abc123`: the same credential registered as an NGO account
//! - `GMAIL_jane`: identifier derived from `jane@gmail.com`
//!
//! The account role is decided once, at resolution time, and stored on the
//! ledger record. Nothing downstream inspects identifier prefixes.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Minimum length of a raw login credential.
pub const CREDENTIAL_MIN: usize = 6;

const NGO_PREFIX: &str = "NGO_";
const GMAIL_PREFIX: &str = "GMAIL_";
const GMAIL_DOMAIN: &str = "@gmail.com";

/// Account role, set when the credential is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary citizen account.
    #[default]
    Citizen,
    /// Registered non-governmental organisation; earns resolution points.
    Ngo,
}

/// Validation errors returned by credential resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    /// Credential is not alphanumeric or shorter than [`CREDENTIAL_MIN`].
    #[error("credential must be alphanumeric and at least {CREDENTIAL_MIN} characters")]
    InvalidCredential,
}

/// Validation errors returned by the email login path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    /// The address is not a Gmail address with a non-empty local part.
    #[error("a valid Gmail address is required")]
    InvalidEmail,
}

/// Errors raised when rehydrating a [`UserId`] from stored or session data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserIdError {
    /// The string matches none of the three identifier namespaces.
    #[error("malformed user identifier")]
    Malformed,
}

fn is_valid_credential(raw: &str) -> bool {
    raw.len() >= CREDENTIAL_MIN && raw.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Stable user identifier.
///
/// ## Invariants
/// - Always one of the three namespace shapes documented at module level.
///
/// # Examples
/// ```
/// use backend::domain::{Role, UserId};
///
/// let id = UserId::resolve("darpan42", Role::Ngo).expect("valid credential");
/// assert_eq!(id.as_ref(), "NGO_darpan42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Resolve a raw login credential into an identifier.
    ///
    /// NGO logins are prefixed so the same credential registered as citizen
    /// and as NGO yields two distinct accounts.
    ///
    /// # Errors
    /// [`CredentialError::InvalidCredential`] unless the credential is
    /// alphanumeric and at least [`CREDENTIAL_MIN`] characters.
    pub fn resolve(raw_credential: &str, role: Role) -> Result<Self, CredentialError> {
        if !is_valid_credential(raw_credential) {
            return Err(CredentialError::InvalidCredential);
        }
        Ok(match role {
            Role::Citizen => Self(raw_credential.to_owned()),
            Role::Ngo => Self(format!("{NGO_PREFIX}{raw_credential}")),
        })
    }

    /// Resolve a Gmail address into an identifier.
    ///
    /// # Errors
    /// [`EmailError::InvalidEmail`] unless the address ends in `@gmail.com`
    /// with a non-empty local part.
    pub fn resolve_email(email: &str) -> Result<Self, EmailError> {
        let trimmed = email.trim();
        let local = trimmed
            .strip_suffix(GMAIL_DOMAIN)
            .ok_or(EmailError::InvalidEmail)?;
        if local.is_empty() || local.contains('@') {
            return Err(EmailError::InvalidEmail);
        }
        Ok(Self(format!("{GMAIL_PREFIX}{local}")))
    }

    /// Rehydrate an identifier from session or snapshot data.
    ///
    /// # Errors
    /// [`UserIdError::Malformed`] when the string matches none of the three
    /// namespaces.
    pub fn new(id: impl Into<String>) -> Result<Self, UserIdError> {
        let id = id.into();
        if let Some(credential) = id.strip_prefix(NGO_PREFIX) {
            if is_valid_credential(credential) {
                return Ok(Self(id));
            }
            return Err(UserIdError::Malformed);
        }
        if let Some(local) = id.strip_prefix(GMAIL_PREFIX) {
            if !local.is_empty() && !local.contains('@') {
                return Ok(Self(id));
            }
            return Err(UserIdError::Malformed);
        }
        if is_valid_credential(&id) {
            return Ok(Self(id));
        }
        Err(UserIdError::Malformed)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
