//! Report submission, resolution, and listing services.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::domain::error::Error;
use crate::domain::hazard::{
    Coordinates, Description, HazardReport, HazardType, ImageRef, ReportDraft, ReportStatus,
    ReportValidationError, ValidationStatus,
};
use crate::domain::identity::{Role, UserId};
use crate::domain::identity_service::map_ledger_error;
use crate::domain::ports::{
    ReportRepository, ReportRepositoryError, ReportsCommand, ReportsQuery, ResolveReportRequest,
    SubmitReportRequest, UserLedgerRepository,
};
use crate::domain::report_id::ReportIdSource;
use crate::domain::reputation::{NGO_RESOLUTION_AWARD, UserRecord};

/// Bound on compare-and-swap retries before reporting contention.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Hazard report use cases over the report and ledger repositories.
#[derive(Clone)]
pub struct ReportService<R, L> {
    reports: Arc<R>,
    ledger: Arc<L>,
    ids: Arc<ReportIdSource>,
}

impl<R, L> ReportService<R, L> {
    /// Create a service over the given repositories and id source.
    pub fn new(reports: Arc<R>, ledger: Arc<L>, ids: Arc<ReportIdSource>) -> Self {
        Self {
            reports,
            ledger,
            ids,
        }
    }
}

pub(crate) fn map_report_error(error: ReportRepositoryError) -> Error {
    match error {
        ReportRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("report repository unavailable: {message}"))
        }
        ReportRepositoryError::Query { message } => {
            Error::internal(format!("report repository error: {message}"))
        }
        ReportRepositoryError::DuplicateId { id } => {
            Error::internal(format!("report id collision on {id}"))
        }
        ReportRepositoryError::NotFound { id } => {
            Error::not_found(format!("report {id} does not exist"))
        }
        ReportRepositoryError::RevisionMismatch { .. } => {
            Error::conflict("report was modified concurrently")
        }
    }
}

fn map_field_error(error: &ReportValidationError) -> Error {
    let (field, code) = match error {
        ReportValidationError::DescriptionTooShort => ("description", "too_short"),
        ReportValidationError::LatitudeOutOfRange => ("latitude", "out_of_range"),
        ReportValidationError::LongitudeOutOfRange => ("longitude", "out_of_range"),
        ReportValidationError::VoteLedgerMismatch { .. } => {
            return Error::internal(error.to_string());
        }
    };
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

impl<R, L> ReportService<R, L>
where
    R: ReportRepository,
    L: UserLedgerRepository,
{
    async fn ensure_reporter(&self, reporter: &UserId) -> Result<(), Error> {
        if self
            .ledger
            .find(reporter)
            .await
            .map_err(map_ledger_error)?
            .is_some()
        {
            return Ok(());
        }
        let record = UserRecord::new(reporter.clone(), Role::Citizen);
        self.ledger
            .upsert(&record)
            .await
            .map_err(map_ledger_error)
    }

    async fn award_resolver(&self, resolver: &UserId) -> Result<(), Error> {
        let record = self
            .ledger
            .find(resolver)
            .await
            .map_err(map_ledger_error)?;
        if record.is_some_and(|r| r.role() == Role::Ngo) {
            self.ledger
                .award_points(resolver, NGO_RESOLUTION_AWARD)
                .await
                .map_err(map_ledger_error)?;
        }
        Ok(())
    }
}

#[async_trait]
impl<R, L> ReportsCommand for ReportService<R, L>
where
    R: ReportRepository,
    L: UserLedgerRepository,
{
    async fn submit(&self, request: SubmitReportRequest) -> Result<HazardReport, Error> {
        let description =
            Description::new(request.description).map_err(|err| map_field_error(&err))?;
        let hazard_type: HazardType = request.hazard_type.parse().map_err(
            |err: crate::domain::hazard::UnknownHazardType| {
                Error::invalid_request(err.to_string()).with_details(json!({
                    "field": "type",
                    "code": "unknown_hazard_type",
                }))
            },
        )?;
        let location = Coordinates::new(request.latitude, request.longitude)
            .map_err(|err| map_field_error(&err))?;

        self.ensure_reporter(&request.reporter).await?;

        let id = self.ids.next_id();
        let created_at = Utc
            .timestamp_millis_opt(id.as_millis())
            .single()
            .unwrap_or_else(Utc::now);
        let draft = ReportDraft {
            reporter: request.reporter,
            description,
            hazard_type,
            location,
            image: request
                .image
                .as_deref()
                .map(|payload| ImageRef::fingerprint(payload.as_bytes())),
        };
        let report = HazardReport::submit(draft, id, created_at);
        self.reports
            .insert(&report)
            .await
            .map_err(map_report_error)?;
        tracing::info!(report_id = %report.id(), hazard_type = %report.hazard_type(), "report submitted");
        Ok(report)
    }

    async fn resolve(&self, request: ResolveReportRequest) -> Result<HazardReport, Error> {
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
            updated.resolve(request.resolver.clone(), request.new_status);
            updated.advance_revision();

            match self.reports.update(&updated, expected).await {
                Ok(()) => {
                    if request.new_status == ReportStatus::Resolved {
                        self.award_resolver(&request.resolver).await?;
                    }
                    tracing::info!(report_id = %updated.id(), resolver = %request.resolver, "report resolution recorded");
                    return Ok(updated);
                }
                Err(ReportRepositoryError::RevisionMismatch { .. }) => continue,
                Err(err) => return Err(map_report_error(err)),
            }
        }
        Err(Error::conflict("report was modified concurrently"))
    }
}

#[async_trait]
impl<R, L> ReportsQuery for ReportService<R, L>
where
    R: ReportRepository,
    L: UserLedgerRepository,
{
    async fn list_all(&self) -> Result<Vec<HazardReport>, Error> {
        let mut reports = self.reports.list().await.map_err(map_report_error)?;
        reports.sort_by(|a, b| b.id().cmp(&a.id()));
        Ok(reports)
    }

    async fn list_pending(&self) -> Result<Vec<HazardReport>, Error> {
        let reports = self.reports.list().await.map_err(map_report_error)?;
        Ok(reports
            .into_iter()
            .filter(|report| report.validation_status() == ValidationStatus::Pending)
            .collect())
    }

    async fn list_validated(&self) -> Result<Vec<HazardReport>, Error> {
        let reports = self.reports.list().await.map_err(map_report_error)?;
        let mut validated: Vec<HazardReport> = reports
            .into_iter()
            .filter(|report| report.validation_status() == ValidationStatus::Valid)
            .collect();
        validated.sort_by(|a, b| {
            b.urgency()
                .cmp(&a.urgency())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(validated)
    }
}
