use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_core::DomainError;
use catalog_infra::{CatalogError, StoreError};

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::Domain(e) => domain_error_to_response(e),
        CatalogError::Store(e) => store_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound { .. } => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        DomainError::InvalidArgument(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::MissingReference(msg) => {
            json_error(StatusCode::CONFLICT, "missing_reference", msg)
        }
        other => {
            tracing::error!(error = %other, "store operation failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                other.to_string(),
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// 400 for a request whose body or query string could not be decoded.
pub fn bad_request(rejection: impl std::fmt::Display) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "bad_request", rejection.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_client_statuses() {
        let missing = domain_error_to_response(DomainError::not_found("Product", 3));
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let invalid = domain_error_to_response(DomainError::invalid_argument("no category"));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_split_conflicts_from_failures() {
        let conflict = store_error_to_response(StoreError::MissingReference("category 9".into()));
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let down = store_error_to_response(StoreError::Unavailable("lock poisoned".into()));
        assert_eq!(down.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
