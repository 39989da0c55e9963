//! Chart rendering.
//!
//! - axis ranges + the temperature-axis decision (`layout`)
//! - drawing + PNG output (`chart`)

pub mod chart;
pub mod layout;

pub use chart::{draw_chart, render};
pub use layout::{ChartArtifact, ChartPlan};
