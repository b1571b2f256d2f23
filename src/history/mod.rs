//! Per-service request history.
//!
//! Every request sent is appended to its service's history log, which the
//! CLI uses to list past requests (`--history`) and to replay the Nth most
//! recent one (`--last N`).
//!
//! # Example
//!
//! ```no_run
//! use restcli::history::History;
//!
//! let history = History::open("/home/me/.restcli/nova/history")?;
//! history.store("POST", "servers", Some("{\"server\": {}}"))?;
//! for entry in history.items(false) {
//!     println!("{:?} {} {}", entry.index, entry.method, entry.resource);
//! }
//! let previous = history.get(1)?;
//! # Ok::<(), restcli::history::HistoryError>(())
//! ```

pub mod models;
pub mod storage;
pub mod ui;

pub use models::{HistoryEntry, HistoryError};
pub use storage::{History, HistoryItems, StoreOutcome, HEAD_FILE};
pub use ui::{format_history_entry, format_history_list};
