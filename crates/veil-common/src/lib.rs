//! Common utilities for the veil crates.
//!
//! This crate provides shared infrastructure used by all veil components:
//! - **Diagnostics** - colored terminal reports for configuration problems
//!   and lifecycle misuse, recorded per thread so callers can inspect them

pub mod diagnostics;
