//! Driving port for casting peer-validation votes.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::hazard::HazardReport;
use crate::domain::identity::UserId;
use crate::domain::report_id::ReportId;

/// Vote carried from the inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastVoteRequest {
    /// Report being reviewed.
    pub report_id: ReportId,
    /// Authenticated voter.
    pub voter: UserId,
    /// `true` confirms the hazard, `false` rejects it.
    pub is_valid: bool,
    /// Optional remediation suggestion, attached only to valid votes.
    pub solution: Option<String>,
}

/// Result of a counted vote.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteReceipt {
    /// The report after the vote was applied.
    pub report: HazardReport,
    /// Whether this vote moved the report from pending to valid.
    pub newly_valid: bool,
}

/// Port for the validation state machine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteCommand: Send + Sync {
    /// Apply one vote and its point awards.
    async fn cast_vote(&self, request: CastVoteRequest) -> Result<VoteReceipt, Error>;
}

/// Fixture implementation that knows no reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVoteCommand;

#[async_trait]
impl VoteCommand for FixtureVoteCommand {
    async fn cast_vote(&self, request: CastVoteRequest) -> Result<VoteReceipt, Error> {
        Err(Error::not_found(format!(
            "report {} does not exist",
            request.report_id
        )))
    }
}
