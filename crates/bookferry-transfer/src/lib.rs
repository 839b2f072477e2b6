//! Pre-ingest transfer orchestration for Bookferry
//!
//! This crate decides, per book item, whether the item should be ingested
//! for the first time, have changed files propagated as an update, or be
//! left alone, and performs the resulting copies. Policy and destinations
//! come from [`bookferry_config::Config`]; transfer history is persisted per
//! item by [`bookferry_registry::TransferRegistry`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use bookferry_config::Config;
//! use bookferry_transfer::TransferEngine;
//!
//! # async fn example() -> bookferry_types::Result<()> {
//! let engine = TransferEngine::new(Config::default());
//! let summary = engine.transfer_ready_books().await?;
//! println!("ingested {}, updated {}", summary.ingested, summary.updated);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod copy;
pub mod engine;
pub mod metadata;
pub mod scan;
pub mod stats;

pub use engine::TransferEngine;
pub use metadata::find_publication_date;
pub use stats::DirectoryStatistics;
