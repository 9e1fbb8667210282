//! Creation-time-derived report identifiers.
//!
//! Report ids are Unix-millisecond timestamps issued through
//! [`ReportIdSource`], which forces strict monotonicity:
//! two submissions in the same millisecond still get distinct, ordered ids,
//! keeping the urgency tie-break in the validated listing well defined.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use mockable::Clock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unique, strictly increasing report identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct ReportId(i64);

impl ReportId {
    /// Wrap a raw millisecond value.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Raw millisecond value.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ReportId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

/// Issues report ids from the injected clock.
///
/// The source remembers the last id it handed out and never repeats or goes
/// backwards, even if the clock does.
pub struct ReportIdSource {
    clock: Arc<dyn Clock>,
    last: AtomicI64,
}

impl ReportIdSource {
    /// Create a source over the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last: AtomicI64::new(0),
        }
    }

    /// Issue the next identifier.
    pub fn next_id(&self) -> ReportId {
        let now = self.clock.utc().timestamp_millis();
        let prev = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(last.saturating_add(1).max(now))
            })
            .unwrap_or_else(|last| last);
        ReportId::from_millis(prev.saturating_add(1).max(now))
    }
}
