use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use truck_finder::config::UpstreamConfig;
use truck_finder::error::AppError;
use truck_finder::trucks::{FoodTruckService, SearchError};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// One service, and therefore one response cache, per process.
pub(crate) fn build_search_service(
    config: &UpstreamConfig,
) -> Result<Arc<FoodTruckService>, AppError> {
    let service = FoodTruckService::from_config(config).map_err(SearchError::Upstream)?;
    Ok(Arc::new(service))
}
