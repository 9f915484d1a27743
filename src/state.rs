use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use userhub_auth::Authenticator;
use userhub_config::WebConfig;
use userhub_db::UserRepository;

use crate::modules::users::{UserCore, UserStore};
use crate::web::Shutdown;

/// Everything the routes need, built once in `main` and handed to the router.
#[derive(Clone)]
pub struct AppState {
    pub core: UserCore,
    pub store: UserStore,
    pub authenticator: Arc<Authenticator>,
    pub web_config: WebConfig,
    pub shutdown: Shutdown,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        authenticator: Arc<Authenticator>,
        web_config: WebConfig,
        shutdown: Shutdown,
    ) -> Self {
        Self::with_store(UserStore::new(repo), authenticator, web_config, shutdown)
    }

    /// Like [`AppState::new`] but with a preconfigured store, e.g. one with a
    /// lower hash cost.
    pub fn with_store(
        store: UserStore,
        authenticator: Arc<Authenticator>,
        web_config: WebConfig,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            core: UserCore::new(store.clone(), authenticator.clone()),
            store,
            authenticator,
            web_config,
            shutdown,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
