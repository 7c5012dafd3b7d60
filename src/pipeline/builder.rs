// src/pipeline/builder.rs
use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::orchestrator::BatchPipeline;
use crate::error::PipelineError;
use crate::notify::LogNotifier;
use crate::output::{DirectorySink, SpoolPrintSurface};
use crate::template::TemplateTicketRenderer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ticketpress_executor::OffloadImpl;
use ticketpress_raster::{FontLibrary, SoftwareRasterizer};
use ticketpress_render_lopdf::{LopdfEncoderFactory, SpoolMode};
use ticketpress_resource::{FilesystemResourceProvider, ImageCache, ProviderAssetLoader};
use ticketpress_traits::{
    AssetLoader, DocumentSink, EncoderFactory, InMemoryResourceProvider, Notifier, PageRasterizer,
    PrintSurface, ResourceProvider, TicketRenderer,
};

fn font_library(config: &PipelineConfig) -> FontLibrary {
    let mut fonts = FontLibrary::bundled();
    if config.system_fonts {
        fonts = fonts.with_system_fonts();
    }
    if let Some(dir) = &config.font_dir {
        fonts = fonts.with_font_dir(dir);
    }
    log::debug!("Font library holds {} faces", fonts.face_count());
    fonts
}

/// A builder for creating a `BatchPipeline`.
///
/// Every collaborator has a default; override only the ones you need.
#[derive(Default)]
pub struct PipelineBuilder {
    config: PipelineConfig,
    renderer: Option<Arc<dyn TicketRenderer>>,
    provider: Option<Arc<dyn ResourceProvider>>,
    assets: Option<Arc<dyn AssetLoader>>,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
    encoder: Option<Arc<dyn EncoderFactory>>,
    notifier: Option<Arc<dyn Notifier>>,
    sink: Option<Arc<dyn DocumentSink>>,
    print: Option<Arc<dyn PrintSurface>>,
    offload: Option<OffloadImpl>,
    output_dir: Option<PathBuf>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the configuration from `path` and the environment.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PipelineError> {
        self.config = PipelineConfig::load(Some(path.as_ref()))?;
        Ok(self)
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn TicketRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Resolves relative asset paths against `dir`. Ignored when a custom
    /// asset loader is set.
    pub fn with_asset_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        let provider = FilesystemResourceProvider::new(dir);
        log::info!("Resolving assets under {}", provider.root().display());
        self.provider = Some(Arc::new(provider));
        self
    }

    pub fn with_resource_provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_asset_loader(mut self, assets: Arc<dyn AssetLoader>) -> Self {
        self.assets = Some(assets);
        self
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn EncoderFactory>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DocumentSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_print_surface(mut self, print: Arc<dyn PrintSurface>) -> Self {
        self.print = Some(print);
        self
    }

    pub fn with_offload(mut self, offload: OffloadImpl) -> Self {
        self.offload = Some(offload);
        self
    }

    /// Directory for downloaded files when no custom sink is set.
    pub fn with_output_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.output_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Consumes the builder and creates the `BatchPipeline`.
    pub fn build(self) -> Result<BatchPipeline, PipelineError> {
        self.config.validate()?;
        let config = Arc::new(self.config);

        let offload = match self.offload {
            Some(offload) => offload,
            None => OffloadImpl::with_threads(config.offload_threads)
                .map_err(|e| PipelineError::Config(e.to_string()))?,
        };
        log::info!(
            "Building pipeline with {} offload ({} threads)",
            ticketpress_executor::Offload::name(&offload),
            ticketpress_executor::Offload::parallelism(&offload)
        );

        let assets: Arc<dyn AssetLoader> = match self.assets {
            Some(assets) => assets,
            None => {
                let provider: Arc<dyn ResourceProvider> = self
                    .provider
                    .unwrap_or_else(|| Arc::new(InMemoryResourceProvider::new()));
                let cache = Arc::new(ImageCache::new(config.asset_cache_capacity));
                Arc::new(
                    ProviderAssetLoader::new(provider, cache, offload.clone())
                        .with_max_width(config.asset_max_width),
                )
            }
        };

        let encoder: Arc<dyn EncoderFactory> = match self.encoder {
            Some(encoder) => encoder,
            None => {
                let spool = if config.spool_to_disk {
                    SpoolMode::TempFile { dir: None }
                } else {
                    SpoolMode::Memory
                };
                Arc::new(LopdfEncoderFactory::new(spool))
            }
        };

        let output_dir = self.output_dir.unwrap_or_else(|| PathBuf::from("."));
        let context = PipelineContext {
            renderer: self
                .renderer
                .unwrap_or_else(|| Arc::new(TemplateTicketRenderer::new())),
            assets,
            rasterizer: self
                .rasterizer
                .unwrap_or_else(|| {
                    Arc::new(SoftwareRasterizer::with_fonts(
                        offload.clone(),
                        Arc::new(font_library(&config)),
                    ))
                }),
            encoder,
            notifier: self.notifier.unwrap_or_else(|| Arc::new(LogNotifier)),
            sink: self
                .sink
                .unwrap_or_else(|| Arc::new(DirectorySink::new(&output_dir))),
            print: self.print.unwrap_or_else(|| {
                Arc::new(SpoolPrintSurface::new(
                    std::env::temp_dir().join("ticketpress-print"),
                ))
            }),
            offload,
            config,
        };

        Ok(BatchPipeline::new(context))
    }
}
