//! The peer-validation state machine service.
//!
//! Applies votes to reports with compare-and-swap writes so two racing votes
//! by the same user count at most once, then triggers the point awards in
//! the order the rules require: report mutation first, reporter award on a
//! fresh transition, voter award last. A rejected vote produces no side
//! effects at all.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::error::Error;
use crate::domain::hazard::VoteError;
use crate::domain::identity_service::map_ledger_error;
use crate::domain::ports::{
    CastVoteRequest, ReportRepository, ReportRepositoryError, UserLedgerRepository, VoteCommand,
    VoteReceipt,
};
use crate::domain::report_service::map_report_error;
use crate::domain::reputation::{REPORT_VALIDATED_AWARD, VOTE_CAST_AWARD};

/// Bound on compare-and-swap retries before reporting contention.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Vote use case over the report and ledger repositories.
#[derive(Clone)]
pub struct ValidationService<R, L> {
    reports: Arc<R>,
    ledger: Arc<L>,
}

impl<R, L> ValidationService<R, L> {
    /// Create a service over the given repositories.
    pub fn new(reports: Arc<R>, ledger: Arc<L>) -> Self {
        Self { reports, ledger }
    }
}

fn map_vote_error(error: &VoteError) -> Error {
    match error {
        VoteError::DuplicateVote => Error::conflict(error.to_string()).with_details(json!({
            "code": "duplicate_vote",
        })),
        VoteError::OwnReport => Error::forbidden(error.to_string()).with_details(json!({
            "code": "own_report",
        })),
    }
}

#[async_trait]
impl<R, L> VoteCommand for ValidationService<R, L>
where
    R: ReportRepository,
    L: UserLedgerRepository,
{
    async fn cast_vote(&self, request: CastVoteRequest) -> Result<VoteReceipt, Error> {
        for _ in 0..MAX_WRITE_ATTEMPTS {
            let Some(report) = self
                .reports
                .find_by_id(request.report_id)
                .await
                .map_err(map_report_error)?
            else {
                return Err(Error::not_found(format!(
                    "report {} does not exist",
                    request.report_id
                )));
            };

            let expected = report.revision();
            let mut updated = report;
            // Duplicate and self-vote checks happen inside apply_vote against
            // the snapshot just read; a stale read is caught by the revision
            // guard below and re-checked on the retry.
            let outcome = updated
                .apply_vote(&request.voter, request.is_valid, request.solution.clone())
                .map_err(|err| map_vote_error(&err))?;
            updated.advance_revision();

            match self.reports.update(&updated, expected).await {
                Ok(()) => {
                    if outcome.newly_valid {
                        self.ledger
                            .award_points(updated.reporter(), REPORT_VALIDATED_AWARD)
                            .await
                            .map_err(map_ledger_error)?;
                        tracing::info!(report_id = %updated.id(), reporter = %updated.reporter(), "report peer-validated");
                    }
                    self.ledger
                        .award_points(&request.voter, VOTE_CAST_AWARD)
                        .await
                        .map_err(map_ledger_error)?;
                    return Ok(VoteReceipt {
                        report: updated,
                        newly_valid: outcome.newly_valid,
                    });
                }
                Err(ReportRepositoryError::RevisionMismatch { .. }) => continue,
                Err(err) => return Err(map_report_error(err)),
            }
        }
        Err(Error::conflict("report was modified concurrently"))
    }
}
