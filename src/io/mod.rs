//! Input helpers.
//!
//! - CSV ingest + row validation (`ingest`)

pub mod ingest;

pub use ingest::*;
