//! Bookferry integration test suite
//!
//! This crate provides the shared fixtures used by the end-to-end transfer
//! tests: configuration pointing at a temporary tree and builders for item
//! directories in various states of readiness.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Shared fixtures for the integration tests
pub mod test_utils;
