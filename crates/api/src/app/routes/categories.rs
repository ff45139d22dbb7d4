use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use catalog_products::Category;

use crate::app::dto::CategorieDto;
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_categories))
        .route("/add", post(create_category))
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.commands.list_categories().await {
        Ok(categories) => {
            let items: Vec<CategorieDto> = categories.into_iter().map(CategorieDto::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_category(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<CategorieDto>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::bad_request(rejection),
    };
    match services.commands.create_category(Category::from(body)).await {
        Ok(category) => (StatusCode::OK, Json(CategorieDto::from(category))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
