//! Common utilities for the sift selector engine.
//!
//! This crate provides shared infrastructure used by the tree and selector crates:
//! - **Warning System** - deduplicated warnings for unsupported selector features

pub mod warning;
