//! Stored row shapes for the JSON snapshots.
//!
//! Rows reuse the domain value types (which validate on deserialisation) but
//! keep the document layout decoupled from the aggregates, so the snapshot
//! format can evolve without touching domain constructors.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Description, HazardReport, HazardType, ImageRef, ReportId, ReportStatus,
    ReportValidationError, Role, Solution, UserId, UserRecord, ValidationStatus, VoteTally,
};

/// One reputation ledger entry as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: UserId,
    pub role: Role,
    pub points: u64,
}

impl From<&UserRecord> for UserRow {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id().clone(),
            role: record.role(),
            points: record.points(),
        }
    }
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        // The level is derived, not stored; rehydration recomputes it.
        UserRecord::from_parts(row.id, row.role, row.points)
    }
}

/// One hazard report as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: ReportId,
    pub reporter: UserId,
    pub description: Description,
    #[serde(rename = "type")]
    pub hazard_type: HazardType,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    pub created_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub validation_status: ValidationStatus,
    pub votes: VoteTally,
    pub voted_by: BTreeSet<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<UserId>,
    pub solutions: Vec<Solution>,
    pub revision: u32,
}

impl From<&HazardReport> for ReportRow {
    fn from(report: &HazardReport) -> Self {
        Self {
            id: report.id(),
            reporter: report.reporter().clone(),
            description: report.description().clone(),
            hazard_type: report.hazard_type(),
            latitude: report.location().latitude(),
            longitude: report.location().longitude(),
            image: report.image().cloned(),
            created_at: report.created_at(),
            status: report.status(),
            validation_status: report.validation_status(),
            votes: report.votes(),
            voted_by: report.voted_by().cloned().collect(),
            resolved_by: report.resolved_by().cloned(),
            solutions: report.solutions().to_vec(),
            revision: report.revision(),
        }
    }
}

impl TryFrom<ReportRow> for HazardReport {
    type Error = ReportValidationError;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let location = crate::domain::Coordinates::new(row.latitude, row.longitude)?;
        HazardReport::from_parts(
            row.id,
            row.reporter,
            row.description,
            row.hazard_type,
            location,
            row.image,
            row.created_at,
            row.status,
            row.validation_status,
            row.votes,
            row.voted_by,
            row.resolved_by,
            row.solutions,
            row.revision,
        )
    }
}
