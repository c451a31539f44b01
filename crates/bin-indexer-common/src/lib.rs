//! BIN Indexer Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the BIN indexer workspace members:
//!
//! - **Logging**: [`logging::LogConfig`] and the single subscriber installer
//! - **Checksums**: digest helpers for published index artifacts

pub mod checksum;
pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LogOutput};
