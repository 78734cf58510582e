//! Route registration — collects all module routes + system endpoints.

use std::sync::Arc;

use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use meeting::store::UserStore;
use meetmash_core::identity::{identity_middleware, IdentityResolver};
use meetmash_core::Module;

use crate::accounts;
use crate::config::ServerConfig;

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub config: Arc<ServerConfig>,
}

/// Build the complete router with all routes.
///
/// Module routers are already `Router<()>` (they call `.with_state()`
/// internally) and are merged at the root. The identity middleware
/// wraps everything, so even public routes carry a resolved
/// `Identity` in their extensions.
pub fn build_router(
    state: AppState,
    modules: Vec<&dyn Module>,
    resolver: Arc<IdentityResolver>,
) -> Router {
    let system_routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    let mut app: Router = Router::new()
        .merge(accounts::routes(state))
        .merge(system_routes);

    for module in modules {
        tracing::info!(module = module.name(), "mounting module routes");
        app = app.merge(module.routes());
    }

    app.layer(middleware::from_fn_with_state(resolver, identity_middleware))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "meetmashd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
