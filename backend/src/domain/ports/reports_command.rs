//! Driving port for report submission and resolution.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::error::Error;
use crate::domain::hazard::{
    Coordinates, Description, HazardReport, HazardType, ReportDraft, ReportStatus,
};
use crate::domain::identity::UserId;
use crate::domain::report_id::ReportId;

/// Fields accepted from the inbound adapter for a new report.
///
/// Free-form fields stay unparsed here; the service validates them and maps
/// failures to field-level error details.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReportRequest {
    /// Authenticated submitter.
    pub reporter: UserId,
    /// Hazard description, validated to [`crate::domain::DESCRIPTION_MIN`].
    pub description: String,
    /// Hazard category label, validated against the closed set.
    pub hazard_type: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Optional raw image payload (for example a data URL).
    pub image: Option<String>,
}

/// Resolution action carried from the inbound adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveReportRequest {
    /// Report to act on.
    pub report_id: ReportId,
    /// Authenticated user performing the resolution.
    pub resolver: UserId,
    /// New operational state.
    pub new_status: ReportStatus,
}

/// Port for mutating hazard reports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportsCommand: Send + Sync {
    /// Validate and persist a new report.
    async fn submit(&self, request: SubmitReportRequest) -> Result<HazardReport, Error>;

    /// Change a report's operational state.
    async fn resolve(&self, request: ResolveReportRequest) -> Result<HazardReport, Error>;
}

/// Fixture implementation echoing submissions without persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReportsCommand;

#[async_trait]
impl ReportsCommand for FixtureReportsCommand {
    async fn submit(&self, request: SubmitReportRequest) -> Result<HazardReport, Error> {
        let description = Description::new(request.description)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let hazard_type: HazardType = request
            .hazard_type
            .parse()
            .map_err(|err: crate::domain::hazard::UnknownHazardType| {
                Error::invalid_request(err.to_string())
            })?;
        let location = Coordinates::new(request.latitude, request.longitude)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let draft = ReportDraft {
            reporter: request.reporter,
            description,
            hazard_type,
            location,
            image: None,
        };
        Ok(HazardReport::submit(
            draft,
            ReportId::from_millis(1),
            Utc::now(),
        ))
    }

    async fn resolve(&self, request: ResolveReportRequest) -> Result<HazardReport, Error> {
        Err(Error::not_found(format!(
            "report {} does not exist",
            request.report_id
        )))
    }
}
