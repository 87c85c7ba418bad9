//! Shared application state

use crate::config::AppConfig;
use crate::regions::Region;
use demand_forecast::models::sarimax::TrainedSarimaxModel;
use std::sync::Arc;

/// State shared by all request handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// The pre-fit demand model
    pub model: Arc<TrainedSarimaxModel>,
    /// Service configuration
    pub config: Arc<AppConfig>,
    /// Region catalog
    pub regions: Arc<Vec<Region>>,
}

impl AppState {
    /// Create state from a loaded model and configuration
    pub fn new(model: TrainedSarimaxModel, config: AppConfig, regions: Vec<Region>) -> Self {
        Self {
            model: Arc::new(model),
            config: Arc::new(config),
            regions: Arc::new(regions),
        }
    }
}
