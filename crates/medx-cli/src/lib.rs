//! CLI library components for medx.

pub mod logging;
pub mod run;
