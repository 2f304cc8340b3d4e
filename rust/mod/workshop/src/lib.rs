pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;
use gaswork_core::Module;

use service::WorkshopService;

/// Workshop module — gas-detector calibration lifecycle and master catalog.
pub struct WorkshopModule {
    service: Arc<WorkshopService>,
}

impl WorkshopModule {
    pub fn new(service: WorkshopService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for WorkshopModule {
    fn name(&self) -> &str {
        "workshop"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
