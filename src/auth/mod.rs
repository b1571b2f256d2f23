//! Presentation of pre-obtained credentials.
//!
//! restcli does not run authentication flows; it only turns a credential the
//! user already holds into a request header.

pub mod basic;

pub use basic::{basic_auth, basic_auth_from_arg};
