//! Batch generation pipeline.
//!
//! A session runs the planner once, then for every page the materializer,
//! the rasterizer and the reclaimer in strict order, and finally hands each
//! finished file to the finalizer.
//!
//! - [`PipelineBuilder`]: fluent builder wiring collaborators and config
//! - [`BatchPipeline`]: runs sessions, one at a time
//! - [`PipelineConfig`]: tuning knobs, loadable from file and environment
//!
//! # Example
//!
//! ```ignore
//! use ticketpress::{GenerationRequest, OutputMode, PipelineBuilder};
//!
//! let pipeline = PipelineBuilder::new().with_output_dir("out").build()?;
//! let report = pipeline
//!     .generate(&GenerationRequest::new(1, 500), OutputMode::Download)
//!     .await?;
//! println!("{} files written", report.files.len());
//! ```

mod builder;
pub mod config;
pub mod context;
mod finalizer;
mod materializer;
mod orchestrator;
pub mod planner;
mod rasterize;
mod reclaimer;
mod session;

pub use builder::PipelineBuilder;
pub use config::{PipelineConfig, QualityProfile};
pub use orchestrator::{BatchPipeline, SavedFile, SessionReport};
pub use planner::Plan;
pub use session::{CancelHandle, Progress};

/// A stage stopped early because the session was cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Interrupted;
