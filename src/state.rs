//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::DocumentStore;
use crate::services::role_service::RoleAdmin;

/// Built once in `main` and handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
    pub role_admin: Arc<dyn RoleAdmin>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        config: AppConfig,
        role_admin: Arc<dyn RoleAdmin>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            role_admin,
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }
}
