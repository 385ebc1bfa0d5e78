//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use serde_json::{Value, json};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client, caught before reaching the domain.
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Domain(err) => domain_error_status(err),
        }
    }

    fn body(&self) -> Value {
        match self {
            ApiError::BadRequest(msg) => json!({ "error": msg, "code": "bad_request" }),
            ApiError::Domain(err) => domain_error_body(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "internal server error");
        }
        (status, axum::Json(self.body())).into_response()
    }
}

fn domain_error_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::ProductNotFound { .. } | DomainError::OrderNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        DomainError::InsufficientStock { .. } | DomainError::InvalidInput { .. } => {
            StatusCode::BAD_REQUEST
        }
        DomainError::ProductInUse { .. } => StatusCode::CONFLICT,
        DomainError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn domain_error_body(err: &DomainError) -> Value {
    let mut body = json!({ "error": err.to_string(), "code": err.kind() });
    match err {
        DomainError::ProductNotFound { product_id } | DomainError::ProductInUse { product_id } => {
            body["product_id"] = json!(product_id);
        }
        DomainError::OrderNotFound { order_id } => {
            body["order_id"] = json!(order_id);
        }
        DomainError::InsufficientStock {
            product_id,
            available,
            requested,
        } => {
            body["product_id"] = json!(product_id);
            body["available"] = json!(available);
            body["requested"] = json!(requested);
        }
        DomainError::InvalidInput { .. } | DomainError::Store(_) => {}
    }
    body
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

#[cfg(test)]
mod tests {
    use domain::ProductId;
    use store::StoreError;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                DomainError::ProductNotFound {
                    product_id: ProductId::new(1),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::InvalidInput {
                    reason: "empty".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::ProductInUse {
                    product_id: ProductId::new(1),
                },
                StatusCode::CONFLICT,
            ),
            (
                DomainError::Store(StoreError::Corrupt("bad row".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
        assert_eq!(
            ApiError::BadRequest("nope".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_insufficient_stock_body_echoes_quantities() {
        let err = ApiError::from(DomainError::InsufficientStock {
            product_id: ProductId::new(4),
            available: 10,
            requested: 300,
        });

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let body = err.body();
        assert_eq!(body["code"], "insufficient_stock");
        assert_eq!(body["product_id"], 4);
        assert_eq!(body["available"], 10);
        assert_eq!(body["requested"], 300);
        assert!(body["error"].as_str().unwrap().contains("requested 300"));
    }
}
