// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        admin::admin_handler,
        auth::auth_handler,
        product::{list_products, product_handler},
        profile::profile_handler,
        users::users_handler,
    },
    middleware::{auth, capability_check},
    service::approval_gate::Capability,
    AppState,
};

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    // Listing management: authenticated, and only approved active farmers
    // make it past the gate
    let protected_product_routes = product_handler()
        .layer(middleware::from_fn(|req, next| {
            capability_check(req, next, Capability::ManageListings)
        }))
        .layer(middleware::from_fn(auth));

    let protected_admin_routes = admin_handler()
        .layer(middleware::from_fn(|req, next| {
            capability_check(req, next, Capability::ReviewApplications)
        }))
        .layer(middleware::from_fn(auth));

    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest("/profiles", profile_handler().layer(middleware::from_fn(auth)))
        // Public storefront: approved listings only, no auth required
        .route("/market", get(list_products))
        .nest("/products", protected_product_routes)
        .nest("/admin", protected_admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
