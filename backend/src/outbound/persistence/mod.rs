//! Persistence adapters over the JSON snapshot collaborator.

mod json_report_repository;
mod json_user_ledger_repository;
mod rows;
mod snapshot;

pub use json_report_repository::JsonReportRepository;
pub use json_user_ledger_repository::JsonUserLedgerRepository;
pub use snapshot::{SnapshotError, SnapshotStore};
