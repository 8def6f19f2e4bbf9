pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{AppConfig, StorageMode};

pub use adapters::storage::{LocalSink, ObjectStoreSink, OutputSink};
pub use core::{etl::EtlEngine, pipeline::PiwikPipeline};
pub use utils::error::{EtlError, Result};
