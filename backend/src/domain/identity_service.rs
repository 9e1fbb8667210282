//! Login and profile services over the reputation ledger.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::error::Error;
use crate::domain::identity::{Role, UserId};
use crate::domain::ports::{
    LoginRequest, LoginService, ProfileQuery, UserLedgerRepository, UserLedgerRepositoryError,
};
use crate::domain::reputation::UserRecord;

/// Maps credentials to ledger-backed identities.
#[derive(Clone)]
pub struct IdentityService<L> {
    ledger: Arc<L>,
}

impl<L> IdentityService<L> {
    /// Create a service over the given ledger repository.
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }
}

pub(crate) fn map_ledger_error(error: UserLedgerRepositoryError) -> Error {
    match error {
        UserLedgerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ledger repository unavailable: {message}"))
        }
        UserLedgerRepositoryError::Query { message } => {
            Error::internal(format!("ledger repository error: {message}"))
        }
    }
}

impl<L> IdentityService<L>
where
    L: UserLedgerRepository,
{
    /// Idempotently ensure a ledger record exists for `id`.
    async fn ensure_record(&self, id: UserId, role: Role) -> Result<UserRecord, Error> {
        if let Some(existing) = self.ledger.find(&id).await.map_err(map_ledger_error)? {
            return Ok(existing);
        }
        let record = UserRecord::new(id, role);
        self.ledger.upsert(&record).await.map_err(map_ledger_error)?;
        Ok(record)
    }
}

#[async_trait]
impl<L> LoginService for IdentityService<L>
where
    L: UserLedgerRepository,
{
    async fn login(&self, request: LoginRequest) -> Result<UserRecord, Error> {
        let role = if request.ngo { Role::Ngo } else { Role::Citizen };
        let id = UserId::resolve(&request.credential, role).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "credential",
                "code": "invalid_credential",
            }))
        })?;
        self.ensure_record(id, role).await
    }

    async fn login_with_email(&self, email: &str) -> Result<UserRecord, Error> {
        let id = UserId::resolve_email(email).map_err(|err| {
            Error::invalid_request(err.to_string()).with_details(json!({
                "field": "email",
                "code": "invalid_email",
            }))
        })?;
        self.ensure_record(id, Role::Citizen).await
    }
}

#[async_trait]
impl<L> ProfileQuery for IdentityService<L>
where
    L: UserLedgerRepository,
{
    async fn fetch(&self, id: &UserId) -> Result<UserRecord, Error> {
        self.ledger
            .find(id)
            .await
            .map_err(map_ledger_error)?
            .ok_or_else(|| Error::not_found(format!("no ledger record for {id}")))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserLedgerRepository;

    fn service(ledger: MockUserLedgerRepository) -> IdentityService<MockUserLedgerRepository> {
        IdentityService::new(Arc::new(ledger))
    }

    #[rstest]
    #[tokio::test]
    async fn login_creates_a_record_on_first_sight() {
        let mut ledger = MockUserLedgerRepository::new();
        ledger.expect_find().times(1).return_once(|_| Ok(None));
        ledger
            .expect_upsert()
            .withf(|record: &UserRecord| {
                record.id().as_ref() == "NGO_darpan42"
                    && record.role() == Role::Ngo
                    && record.points() == 0
            })
            .times(1)
            .return_once(|_| Ok(()));

        let record = service(ledger)
            .login(LoginRequest {
                credential: "darpan42".to_owned(),
                ngo: true,
            })
            .await
            .expect("login succeeds");
        assert_eq!(record.level(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn login_is_idempotent_for_known_users() {
        let existing = {
            let mut record = UserRecord::new(
                UserId::new("darpan42").expect("fixture id"),
                Role::Citizen,
            );
            record.award(25);
            record
        };
        let returned = existing.clone();
        let mut ledger = MockUserLedgerRepository::new();
        ledger
            .expect_find()
            .times(1)
            .return_once(move |_| Ok(Some(returned)));
        ledger.expect_upsert().times(0);

        let record = service(ledger)
            .login(LoginRequest {
                credential: "darpan42".to_owned(),
                ngo: false,
            })
            .await
            .expect("login succeeds");
        assert_eq!(record, existing);
    }

    #[rstest]
    #[case("abc", false)]
    #[case("has space99", false)]
    #[case("", true)]
    #[tokio::test]
    async fn login_rejects_invalid_credentials(#[case] credential: &str, #[case] ngo: bool) {
        let mut ledger = MockUserLedgerRepository::new();
        ledger.expect_find().times(0);
        ledger.expect_upsert().times(0);

        let error = service(ledger)
            .login(LoginRequest {
                credential: credential.to_owned(),
                ngo,
            })
            .await
            .expect_err("invalid credential rejected");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn email_login_derives_the_gmail_namespace() {
        let mut ledger = MockUserLedgerRepository::new();
        ledger.expect_find().times(1).return_once(|_| Ok(None));
        ledger
            .expect_upsert()
            .withf(|record: &UserRecord| record.id().as_ref() == "GMAIL_jane")
            .times(1)
            .return_once(|_| Ok(()));

        let record = service(ledger)
            .login_with_email("jane@gmail.com")
            .await
            .expect("login succeeds");
        assert_eq!(record.role(), Role::Citizen);
    }

    #[rstest]
    #[tokio::test]
    async fn profile_fetch_does_not_create_records() {
        let mut ledger = MockUserLedgerRepository::new();
        ledger.expect_find().times(1).return_once(|_| Ok(None));
        ledger.expect_upsert().times(0);

        let id = UserId::new("darpan42").expect("fixture id");
        let error = service(ledger).fetch(&id).await.expect_err("absent record");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_failures_surface_as_service_unavailable() {
        let mut ledger = MockUserLedgerRepository::new();
        ledger.expect_find().times(1).return_once(|_| {
            Err(UserLedgerRepositoryError::Connection {
                message: "disk gone".to_owned(),
            })
        });

        let error = service(ledger)
            .login(LoginRequest {
                credential: "darpan42".to_owned(),
                ngo: false,
            })
            .await
            .expect_err("connection failure surfaces");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
