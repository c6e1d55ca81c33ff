//! CLI command implementations.

pub mod build;
pub mod show_config;
pub mod update;
