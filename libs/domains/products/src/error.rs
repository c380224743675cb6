use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ProductError {
    /// Same message for lookups, updates and deletes, keyed only by the id
    #[error("Product not found with id: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// List filter that cannot be applied, e.g. a `NaN` price bound
    #[error("{0}")]
    InvalidFilter(String),

    /// The storage engine refused the insert
    #[error("Failed to insert product: {0}")]
    Insertion(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => AppError::NotFound(err.to_string()),
            ProductError::Validation(errors) => AppError::ValidationError(errors),
            ProductError::InvalidFilter(msg) => AppError::InvalidQuery(msg),
            ProductError::Insertion(msg) => AppError::InsertionFailed(msg),
            ProductError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_message_names_id() {
        let id = Uuid::now_v7();
        assert_eq!(
            ProductError::NotFound(id).to_string(),
            format!("Product not found with id: {id}")
        );
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ProductError::NotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (
                ProductError::Validation(ValidationErrors::new()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProductError::InvalidFilter("min_price must be a finite number, got NaN".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ProductError::Insertion("duplicate key".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ProductError::Database("timeout".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
