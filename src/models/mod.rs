//! Data models for HTTP requests and responses.

pub mod request;
pub mod response;

pub use request::{HttpMethod, PreparedRequest};
pub use response::HttpResponse;
