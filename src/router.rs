use axum::Router;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;

use crate::metrics::metrics_app;
use crate::middleware;
use crate::modules::health::router::init_health_routes;
use crate::modules::users::router::init_users_routes;
use crate::state::AppState;
use crate::web::App;

pub const API_VERSION: &str = "v1";

pub fn init_router(state: AppState) -> Router {
    let mut app = App::new(state.shutdown.clone(), middleware::standard())
        .with_request_timeout(state.web_config.request_timeout);

    init_health_routes(&mut app, API_VERSION, &state.store);
    init_users_routes(&mut app, API_VERSION, &state.core, state.authenticator.clone());

    let mut router = app.into_router();
    if let Some(handle) = state.metrics.clone() {
        router = router.merge(metrics_app(handle));
    }

    router.layer({
        let allowed_origins: Vec<HeaderValue> = state
            .web_config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::AUTHORIZATION,
                axum::http::header::CONTENT_TYPE,
                axum::http::header::ACCEPT,
            ])
            .allow_credentials(true)
    })
}
