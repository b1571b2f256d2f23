//! HTTP transport.
//!
//! The core never talks to the network itself; the command pipeline hands a
//! [`PreparedRequest`](crate::models::PreparedRequest) to [`send`] and gets
//! back the full response.

pub mod error;
pub mod native;

pub use error::RequestError;
pub use native::send;
