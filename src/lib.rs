pub mod config;
pub mod errors;
pub mod model;
pub mod routes;
pub mod store;

use axum::{extract::Extension, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use routes::users::{users_router, SharedStore};

/// Full application router with the store injected into every handler.
pub fn app(store: SharedStore) -> Router {
    Router::new()
        .merge(users_router())
        .layer(Extension(store))
        .layer(TraceLayer::new_for_http())
        // Any origin may call the API
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
}
