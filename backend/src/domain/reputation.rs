//! Reputation ledger records: points, levels, and badge tiers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::identity::{Role, UserId};

/// Points per level step.
pub const POINTS_PER_LEVEL: u64 = 10;

/// Awarded to the reporter when a report first turns valid.
pub const REPORT_VALIDATED_AWARD: u64 = 10;
/// Awarded to an NGO account that marks a report resolved.
pub const NGO_RESOLUTION_AWARD: u64 = 5;
/// Awarded to any voter whose vote is counted.
pub const VOTE_CAST_AWARD: u64 = 1;

/// Display tier derived from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    /// Levels 1 and 2.
    Bronze,
    /// Levels 3 and 4.
    Silver,
    /// Levels 5 through 9.
    Gold,
    /// Level 10 and above.
    Platinum,
}

impl BadgeTier {
    /// Tier for a given level.
    #[must_use]
    pub const fn for_level(level: u32) -> Self {
        match level {
            10.. => Self::Platinum,
            5.. => Self::Gold,
            3.. => Self::Silver,
            _ => Self::Bronze,
        }
    }
}

fn level_for(points: u64) -> u32 {
    let level = points.div_euclid(POINTS_PER_LEVEL) + 1;
    u32::try_from(level).unwrap_or(u32::MAX)
}

/// One user's reputation ledger entry.
///
/// ## Invariants
/// - `level == points / 10 + 1` (floor division) after every mutation.
///
/// Records are created on first interaction and never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    id: UserId,
    role: Role,
    points: u64,
    level: u32,
}

impl UserRecord {
    /// Fresh record: zero points, level one.
    #[must_use]
    pub fn new(id: UserId, role: Role) -> Self {
        Self {
            id,
            role,
            points: 0,
            level: 1,
        }
    }

    /// Rehydrate a record from stored fields, re-deriving the level so the
    /// invariant holds even over hand-edited snapshots.
    #[must_use]
    pub fn from_parts(id: UserId, role: Role, points: u64) -> Self {
        Self {
            id,
            role,
            points,
            level: level_for(points),
        }
    }

    /// Owning identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Account role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Accumulated points.
    pub fn points(&self) -> u64 {
        self.points
    }

    /// Current level.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Display badge for the current level.
    pub fn badge(&self) -> BadgeTier {
        BadgeTier::for_level(self.level)
    }

    /// Add points and recompute the level.
    pub fn award(&mut self, delta: u64) {
        self.points = self.points.saturating_add(delta);
        self.level = level_for(self.points);
    }
}
