//! CLI library components for the county health pipeline.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
pub mod types;
