use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};

use catalog_products::{CategoryId, Product, ProductFilter, ProductId};

use crate::app::dto::{self, FilterQuery, ProduitDto};
use crate::app::routes::{categories, pricing};
use crate::app::errors;
use crate::app::services::AppServices;

pub const WELCOME: &str = "BienVenue au service Web REST 'produits'.....";

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/index", get(index))
        .route("/add", post(create_product))
        .route("/update", put(update_product))
        .route("/update-category/:id", put(update_product_category))
        .route("/filter", get(filter_products))
        .route("/:id", get(get_product).delete(delete_product))
        .nest("/categories", categories::router())
        .merge(pricing::router())
}

pub async fn index() -> &'static str {
    WELCOME
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.commands.fetch_all().await {
        Ok(products) => (StatusCode::OK, Json(dto::products_to_dto(products))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.commands.fetch_by_id(id).await {
        Ok(product) => (StatusCode::OK, Json(ProduitDto::from(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.commands.delete_by_id(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProduitDto>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::bad_request(rejection),
    };
    match services.commands.create(Product::from(body)).await {
        Ok(product) => (StatusCode::OK, Json(ProduitDto::from(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// The product id travels in the body.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<ProduitDto>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::bad_request(rejection),
    };
    let Some(id) = body.id else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_argument",
            "product id must be provided",
        );
    };
    match services.commands.update(id, Product::from(body)).await {
        Ok(product) => (StatusCode::OK, Json(ProduitDto::from(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// Body is the bare category id, e.g. `3`.
pub async fn update_product_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<CategoryId>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Json(category_id) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::bad_request(rejection),
    };
    match services.commands.update_category_of_product(id, category_id).await {
        Ok(product) => (StatusCode::OK, Json(ProduitDto::from(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn filter_products(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(v) => v,
        Err(rejection) => return errors::bad_request(rejection),
    };
    let filter = ProductFilter::from(query);
    match services.commands.filter(&filter).await {
        Ok(products) => (StatusCode::OK, Json(dto::products_to_dto(products))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

fn parse_product_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
    })
}
