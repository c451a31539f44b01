//! BIN Indexer Library
//!
//! Ingests card-network BIN range tables and produces two correlated
//! outputs: a detail record per range, written to a record store, and a
//! serialized interval index mapping account ranges to record keys.
//!
//! # Supported Formats
//!
//! - **Redsys 3.8**: fixed-width, Windows-1252, with a totals trailer
//! - **Mastercard simplified**: UTF-8 CSV with a header row
//!
//! # Example
//!
//! ```no_run
//! use bin_indexer::{
//!     config::Config, formats::Format, index::IntervalIndex, location::{Location, LocationIo},
//!     orchestrator::IngestionOrchestrator, reference::IsoTables, storage::MemoryStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let descriptor = "redsys_3.8".parse::<Format>()?.descriptor()?;
//!     let store = MemoryStore::new();
//!     let io = LocationIo::new(config.s3);
//!
//!     let mut orchestrator = IngestionOrchestrator::new(
//!         &descriptor,
//!         &store,
//!         IntervalIndex::new(),
//!         &IsoTables,
//!         tracing::info_span!("ingest"),
//!     );
//!     let summary = orchestrator
//!         .run(&io, &Location::parse("./bins.txt")?, &Location::parse("./indexes/")?)
//!         .await?;
//!     println!("{} ranges stored", summary.records_stored);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decode;
pub mod descriptor;
pub mod error;
pub mod formats;
pub mod index;
pub mod key;
pub mod location;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod reference;
pub mod storage;
pub mod trailer;
pub mod translate;

pub use error::{IndexerError, Result};
