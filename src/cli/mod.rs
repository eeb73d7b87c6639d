//! Command-line tooling

pub mod commands;

pub use commands::*;
