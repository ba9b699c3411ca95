use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use credit_risk::scoring::{ArtifactBundle, CreditRiskService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Load the bundle once and wrap it in the shared scoring service.
pub(crate) fn load_service(
    config: &AppConfig,
    artifact_override: Option<PathBuf>,
) -> Result<Arc<CreditRiskService>, AppError> {
    let path = artifact_override.unwrap_or_else(|| config.artifact.path.clone());
    let bundle = ArtifactBundle::load(&path)?;
    Ok(Arc::new(CreditRiskService::new(Arc::new(bundle))))
}
