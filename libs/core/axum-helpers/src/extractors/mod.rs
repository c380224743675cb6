//! Custom extractors for Axum handlers.
//!
//! Both reject with [`AppError`](crate::errors::AppError), so a bad path or
//! body produces the same JSON error shape as a failing handler.

pub mod json_field;
pub mod uuid_path;
pub mod validated_json;

pub use json_field::JsonField;
pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
