pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{Endpoint, PartitionKey, RunPlan, RunSummary, SkippedPartition};
pub use crate::domain::ports::{Pipeline, Sink, Token};
pub use crate::utils::error::Result;
