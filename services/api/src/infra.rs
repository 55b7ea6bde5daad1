use chrono::NaiveDate;
use declara::config::AppConfig;
use declara::filing::DeclarationService;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The declaration service is stateless; configuration only decides how an
/// invalid regime on a record is treated.
pub(crate) fn declaration_service(config: &AppConfig) -> DeclarationService {
    DeclarationService::new(config.filing.invalid_regime_policy)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
