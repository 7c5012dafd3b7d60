//! Numbered ticket PDFs at volume.
//!
//! `ticketpress` turns a [`GenerationRequest`] (numbering range, layout and
//! styling) into one or more A4 PDFs whose pages are rasterized ticket
//! sheets. Large ranges are split into several files, progress is reported
//! after every page and a running session can be cancelled at any page
//! boundary.

pub mod error;
pub mod notify;
pub mod output;
pub mod pipeline;
pub mod template;

pub use error::PipelineError;
pub use notify::LogNotifier;
pub use output::{DirectorySink, SpoolPrintSurface};
pub use pipeline::{
    BatchPipeline, CancelHandle, PipelineBuilder, PipelineConfig, Plan, Progress, QualityProfile,
    SavedFile, SessionReport,
};
pub use template::TemplateTicketRenderer;

pub use ticketpress_traits as traits;
pub use ticketpress_types as types;
pub use ticketpress_types::{
    AssetRef, Color, DisplayMode, GenerationRequest, OutputFile, OutputMode, PageLayout,
    TicketStyle, TicketVisual, TicketsPerPage,
};
