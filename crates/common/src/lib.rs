//! Shared ambient helpers for the option store crates.

pub mod utils;
