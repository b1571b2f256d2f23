//! Output formatting.

pub mod json;

pub use json::{format_json_safe, format_value};
