//! Promotion batch and sale-cost endpoints.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use catalog_products::DiscountPercent;

use crate::app::dto::{PromotionRequest, PromotionResponse, SaleCostQuery, SaleCostResponse};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/promotion", post(apply_promotion))
        .route("/cout-vente", get(sale_cost))
}

pub async fn apply_promotion(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<PromotionRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(v) => v,
        Err(rejection) => return errors::bad_request(rejection),
    };
    match services.catalog.apply_promotion_before(body.avant).await {
        Ok(promoted) => (StatusCode::OK, Json(PromotionResponse { promoted })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn sale_cost(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<SaleCostQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(v) => v,
        Err(rejection) => return errors::bad_request(rejection),
    };
    let discount = match query.remise.map(DiscountPercent::try_from).transpose() {
        Ok(d) => d.unwrap_or(DiscountPercent::ZERO),
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.catalog.compute_discounted_sale_cost(discount).await {
        Ok(cost) => (
            StatusCode::OK,
            Json(SaleCostResponse {
                remise: discount.percent(),
                cout_vente: cost,
            }),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
