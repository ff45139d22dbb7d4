use axum::{routing::get, Router};

pub mod categories;
pub mod pricing;
pub mod products;
pub mod system;

/// Router for the catalog endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/produits", products::router())
        // The catalog listing is also served with a trailing slash.
        .route("/produits/", get(products::list_products))
}
