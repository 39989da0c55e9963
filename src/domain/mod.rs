//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - validated step samples (`Sample`) and their column-wise collection (`Series`)
//! - run configuration (`RunConfig`) and its defaults

pub mod types;

pub use types::*;
