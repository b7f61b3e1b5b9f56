use campus_leave::error::AppError;
use campus_leave::workflows::leave::{
    InMemoryAccountRepository, InMemoryLeaveRepository, LeaveService, LeaveSettings, StaffRoster,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type MemoryLeaveService = LeaveService<InMemoryAccountRepository, InMemoryLeaveRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn in_memory_service(settings: LeaveSettings) -> Arc<MemoryLeaveService> {
    Arc::new(LeaveService::new(
        Arc::new(InMemoryAccountRepository::default()),
        Arc::new(InMemoryLeaveRepository::default()),
        settings,
    ))
}

/// Loads the roster at `path` and provisions any staff accounts that are missing.
pub(crate) fn provision_staff(service: &MemoryLeaveService, path: &Path) -> Result<(), AppError> {
    let roster = StaffRoster::from_path(path)?;
    let summary = service.bootstrap_staff(&roster)?;
    info!(
        path = %path.display(),
        created = summary.created,
        skipped = summary.skipped,
        "staff roster loaded"
    );
    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
