//! Pipeline orchestration: wiring, per-result processing, statistics.

mod orchestrator;
mod processor;
mod stats;

pub use orchestrator::{build_router, Pipeline, PipelineConfig, ProdRouter};
pub use processor::{ProcessedResult, ResultsProcessor};
pub use stats::PipelineStats;
