pub mod extraction;
pub mod ingest;
pub mod processor; // Report orchestrator

pub use processor::{PipelineError, ReportAnalysis, ReportOutcome, ReportPipeline, ReportRequest};
