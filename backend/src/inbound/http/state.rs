//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use pagination::PageSize;

use crate::domain::ports::{
    FixtureLeaderboardQuery, FixtureLoginService, FixtureProfileQuery, FixtureReportsCommand,
    FixtureReportsQuery, FixtureVoteCommand, LeaderboardQuery, LoginService, ProfileQuery,
    ReportsCommand, ReportsQuery, VoteCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn ProfileQuery>,
    pub reports: Arc<dyn ReportsCommand>,
    pub reports_query: Arc<dyn ReportsQuery>,
    pub votes: Arc<dyn VoteCommand>,
    pub leaderboard: Arc<dyn LeaderboardQuery>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            profile: Arc::new(FixtureProfileQuery),
            reports: Arc::new(FixtureReportsCommand),
            reports_query: Arc::new(FixtureReportsQuery),
            votes: Arc::new(FixtureVoteCommand),
            leaderboard: Arc::new(FixtureLeaderboardQuery),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn ProfileQuery>,
    pub reports: Arc<dyn ReportsCommand>,
    pub reports_query: Arc<dyn ReportsQuery>,
    pub votes: Arc<dyn VoteCommand>,
    pub leaderboard: Arc<dyn LeaderboardQuery>,
    /// Page size used when the leaderboard request does not specify one.
    pub leaderboard_page_size: PageSize,
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use backend::inbound::http::state::{HttpState, HttpStatePorts};
    /// use pagination::PageSize;
    ///
    /// let state = HttpState::new(
    ///     HttpStatePorts::default(),
    ///     PageSize::new(10).expect("non-zero"),
    /// );
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts, leaderboard_page_size: PageSize) -> Self {
        let HttpStatePorts {
            login,
            profile,
            reports,
            reports_query,
            votes,
            leaderboard,
        } = ports;
        Self {
            login,
            profile,
            reports,
            reports_query,
            votes,
            leaderboard,
            leaderboard_page_size,
        }
    }
}
