//! Domain ports and supporting types for the hexagonal boundary.

mod leaderboard_query;
mod login_service;
mod profile_query;
mod report_repository;
mod reports_command;
mod reports_query;
mod user_ledger_repository;
mod vote_command;

#[cfg(test)]
pub use leaderboard_query::MockLeaderboardQuery;
pub use leaderboard_query::{
    FixtureLeaderboardQuery, LeaderboardEntry, LeaderboardQuery, LeaderboardRequest, SortDirection,
    SortKey,
};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginRequest, LoginService};
#[cfg(test)]
pub use profile_query::MockProfileQuery;
pub use profile_query::{FixtureProfileQuery, ProfileQuery};
#[cfg(test)]
pub use report_repository::MockReportRepository;
pub use report_repository::{FixtureReportRepository, ReportRepository, ReportRepositoryError};
#[cfg(test)]
pub use reports_command::MockReportsCommand;
pub use reports_command::{
    FixtureReportsCommand, ReportsCommand, ResolveReportRequest, SubmitReportRequest,
};
#[cfg(test)]
pub use reports_query::MockReportsQuery;
pub use reports_query::{FixtureReportsQuery, ReportsQuery};
#[cfg(test)]
pub use user_ledger_repository::MockUserLedgerRepository;
pub use user_ledger_repository::{
    FixtureUserLedgerRepository, UserLedgerRepository, UserLedgerRepositoryError,
};
#[cfg(test)]
pub use vote_command::MockVoteCommand;
pub use vote_command::{CastVoteRequest, FixtureVoteCommand, VoteCommand, VoteReceipt};
