//! CLI command implementations.

pub mod common;
pub mod config;
pub mod levels;
pub mod load;
pub mod run;
