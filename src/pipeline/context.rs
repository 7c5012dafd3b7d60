use crate::pipeline::config::PipelineConfig;
use std::sync::Arc;
use ticketpress_executor::OffloadImpl;
use ticketpress_traits::{
    AssetLoader, DocumentSink, EncoderFactory, Notifier, PageRasterizer, PrintSurface,
    TicketRenderer,
};

/// The collaborators and settings shared by every stage of a session.
/// Built once by the `PipelineBuilder`; cloning it only bumps reference
/// counts.
#[derive(Clone)]
pub struct PipelineContext {
    pub renderer: Arc<dyn TicketRenderer>,
    pub assets: Arc<dyn AssetLoader>,
    pub rasterizer: Arc<dyn PageRasterizer>,
    pub encoder: Arc<dyn EncoderFactory>,
    pub notifier: Arc<dyn Notifier>,
    pub sink: Arc<dyn DocumentSink>,
    pub print: Arc<dyn PrintSurface>,
    /// Runs JPEG encoding off the session task.
    pub offload: OffloadImpl,
    pub config: Arc<PipelineConfig>,
}
