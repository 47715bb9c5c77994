use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod products;

// Build the router without binding state; it will be provided at the top level.
pub fn create_app_router() -> Router<AppState> {
    Router::new()
        .route("/health-check", axum::routing::get(health::health_check))
        .merge(products::router())
        .merge(orders::router())
        .nest("/cart", cart::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
}
