//! Request extractors whose rejections are `ApiError` bodies.

pub mod json;
pub mod path_id;

pub use json::{JsonOrDefault, ValidJson};
pub use path_id::PathRecordId;
