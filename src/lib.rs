//! restcli: a command-line client for JSON-based RESTful services.
//!
//! Services are described declaratively: a URI prefix, default headers, and
//! an ordered catalog of resource patterns, each with optional body
//! templates, field aliases and help text. restcli sends a request to a
//! resource, optionally starting from a template or a previously sent
//! request, rewrites fields of the JSON body on the way, and records every
//! request in a per-service history log.
//!
//! # Architecture
//!
//! - **body**: the `a.b[2].c` addressing language and ordered `name=value`
//!   replacement through resource aliases
//! - **resources**: first-match resource patterns, templates and aliases
//! - **history**: append-only numbered request log with a `HEAD` marker
//! - **config**: service documents, validation, one-shot environment resolution
//! - **services**: the home directory, installed services and their histories
//! - **models**: prepared requests and received responses
//! - **auth**: Basic credential headers
//! - **formatter**: JSON pretty-printing for display
//! - **executor**: HTTP transport (requires the `cli` feature)
//! - **commands**: the invocation pipeline (requires the `cli` feature)
//! - **cli**: clap argument model (requires the `cli` feature)
//!
//! # Usage
//!
//! ```text
//! restcli --install-service autoscale.json
//! restcli -s autoscale groups -m post -t -r name=prod
//! restcli -s autoscale --history
//! restcli -s autoscale -l 2 -r cooldown=60
//! ```
//!
//! # Data flow
//!
//! requested resource → resource catalog → template or history replay →
//! replacements → HTTP send → history append.

pub mod auth;
pub mod body;
pub mod config;
pub mod formatter;
pub mod history;
pub mod models;
pub mod resources;
pub mod services;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod commands;
#[cfg(feature = "cli")]
pub mod executor;
