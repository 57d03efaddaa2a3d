//! CLI command implementations.

pub mod common;
pub mod config;
pub mod devices;
pub mod render;
pub mod run;
pub mod tone;
