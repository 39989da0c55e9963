//! `step-chart` library crate.
//!
//! Reads an exercise step log (`Period,Intensity,AvgBPM[,Temperature]` CSV)
//! and renders it as a multi-axis PNG chart over elapsed time.
//!
//! The binary (`step-chart`) is a thin wrapper around [`app::run`] so the
//! pipeline stays testable without spawning processes.

pub mod app;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
