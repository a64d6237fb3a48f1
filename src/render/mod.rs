//! Rendering module for serializing converted documents.

mod json;

pub use json::{page_to_json, to_json, JsonFormat};
