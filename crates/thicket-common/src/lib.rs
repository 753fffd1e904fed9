//! Common utilities for the Thicket parser.
//!
//! This crate provides shared infrastructure used by the DOM and HTML crates:
//! - **Warning System** - deduplicated parse diagnostics routed through `log`

pub mod warning;
