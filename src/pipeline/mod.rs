// file: src/pipeline/mod.rs
// description: index build pipeline (builder, progress)
// reference: module organization

pub mod builder;
pub mod progress;

pub use builder::{BuildReport, IndexBuilder};
pub use progress::{PipelineStats, ProgressTracker};
