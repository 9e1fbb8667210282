//! Wire representations of domain types for the HTTP surface.
//!
//! Handlers convert domain aggregates into these DTOs so the domain keeps
//! its accessors private and the JSON contract stays explicit and versioned
//! in one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BadgeTier, HazardReport, ReportStatus, Role, UserRecord, ValidationStatus};

/// Ledger record as returned by login and profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    /// Stable user identifier.
    #[schema(example = "NGO_darpan42")]
    pub id: String,
    /// Account role.
    pub role: Role,
    /// Accumulated points.
    pub points: u64,
    /// Derived level.
    pub level: u32,
    /// Display badge for the level.
    pub badge: BadgeTier,
}

impl From<UserRecord> for ProfileDto {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id().to_string(),
            role: record.role(),
            points: record.points(),
            level: record.level(),
            badge: record.badge(),
        }
    }
}

/// Vote counts on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoteTallyDto {
    /// Votes confirming the hazard.
    pub valid: u32,
    /// Votes rejecting the hazard.
    pub invalid: u32,
}

/// A remediation suggestion attached to a valid vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SolutionDto {
    /// Voter who suggested the fix.
    pub validator: String,
    /// Free-text suggestion.
    pub text: String,
}

/// Hazard report as returned by every report endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDto {
    /// Creation-time-derived identifier.
    pub id: i64,
    /// Submitting user.
    pub reporter: String,
    /// Hazard description.
    pub description: String,
    /// Hazard category label.
    #[serde(rename = "type")]
    #[schema(example = "Electrical Hazard")]
    pub hazard_type: String,
    /// Display urgency derived from the category, 2 to 5.
    pub urgency: u8,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// SHA-256 fingerprint of the uploaded image payload, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Operational state.
    pub status: ReportStatus,
    /// Peer-review state.
    pub validation_status: ValidationStatus,
    /// Vote counts.
    pub votes: VoteTallyDto,
    /// User who marked the report resolved, when one has.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    /// Suggested remediations, in submission order.
    pub solutions: Vec<SolutionDto>,
}

impl From<HazardReport> for ReportDto {
    fn from(report: HazardReport) -> Self {
        Self {
            id: report.id().as_millis(),
            reporter: report.reporter().to_string(),
            description: report.description().as_ref().to_owned(),
            hazard_type: report.hazard_type().as_str().to_owned(),
            urgency: report.urgency(),
            latitude: report.location().latitude(),
            longitude: report.location().longitude(),
            image: report.image().map(|image| image.as_hex().to_owned()),
            created_at: report.created_at(),
            status: report.status(),
            validation_status: report.validation_status(),
            votes: VoteTallyDto {
                valid: report.votes().valid,
                invalid: report.votes().invalid,
            },
            resolved_by: report.resolved_by().map(ToString::to_string),
            solutions: report
                .solutions()
                .iter()
                .map(|solution| SolutionDto {
                    validator: solution.validator.to_string(),
                    text: solution.text.clone(),
                })
                .collect(),
        }
    }
}
