//! Custom extractors for Axum handlers.
//!
//! Rejections are rendered through [`AppError`](crate::errors::AppError) so
//! every failure carries the standard error body.

pub mod uuid_path;
pub mod validated_json;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
