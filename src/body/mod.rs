//! Reading and rewriting fields inside JSON request bodies.
//!
//! - **address**: parses `a.b[2].c` addresses and locates (container, key) pairs
//! - **mutator**: alias resolution and ordered `name=value` replacement

pub mod address;
pub mod error;
pub mod mutator;

pub use address::{
    extract_address, extract_address_mut, parse_address, read_address, write_address, PathToken,
};
pub use error::AddressError;
pub use mutator::{apply_replacements, coerce_value, resolve_alias, AliasTable, Replacement};
