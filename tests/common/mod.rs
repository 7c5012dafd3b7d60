pub mod fixtures;
pub mod pdf_assertions;
pub mod stubs;

use lopdf::Document as LopdfDocument;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stubs::{RecordingNotifier, RecordingPrintSurface, StaticRasterizer};
use ticketpress::{PipelineBuilder, PipelineConfig};
use ticketpress_executor::{InlineOffload, OffloadImpl};
use ticketpress_render_lopdf::{LopdfEncoderFactory, SpoolMode};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Wrapper around a generated PDF with helper methods
pub struct GeneratedPdf {
    pub bytes: Vec<u8>,
    pub doc: LopdfDocument,
}

impl GeneratedPdf {
    /// Create a GeneratedPdf from raw bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error>> {
        let doc = LopdfDocument::load_mem(&bytes)?;
        Ok(Self { bytes, doc })
    }

    pub fn from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Get the number of pages in the PDF
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Defaults tuned for fast tests: no pauses, tiny captures, inline offload.
pub fn test_config() -> PipelineConfig {
    let defaults = PipelineConfig::default();
    PipelineConfig {
        page_pause_small_ms: 0,
        page_pause_large_ms: 0,
        between_files_ms: 0,
        image_load_timeout_ms: 200,
        large_job: ticketpress::QualityProfile {
            scale: 0.1,
            quality: 0.6,
        },
        small_job: ticketpress::QualityProfile {
            scale: 0.2,
            quality: 0.7,
        },
        spool_to_disk: false,
        offload_threads: 0,
        ..defaults
    }
}

/// Everything a pipeline test inspects after a run.
pub struct Harness {
    pub out: tempfile::TempDir,
    pub notifier: Arc<RecordingNotifier>,
    pub print: Arc<RecordingPrintSurface>,
    pub rasterizer: Arc<StaticRasterizer>,
}

impl Harness {
    pub fn new() -> Self {
        init_logging();
        Self {
            out: tempfile::tempdir().expect("temp dir"),
            notifier: Arc::new(RecordingNotifier::default()),
            print: Arc::new(RecordingPrintSurface::default()),
            rasterizer: Arc::new(StaticRasterizer::default()),
        }
    }

    /// A builder wired to the harness's recorders, writing PDFs in memory
    /// and saving downloads under `out`.
    pub fn builder(&self, config: PipelineConfig) -> PipelineBuilder {
        PipelineBuilder::new()
            .with_config(config)
            .with_offload(OffloadImpl::Inline(InlineOffload))
            .with_encoder(Arc::new(LopdfEncoderFactory::new(SpoolMode::Memory)))
            .with_notifier(self.notifier.clone())
            .with_print_surface(self.print.clone())
            .with_rasterizer(self.rasterizer.clone())
            .with_output_dir(self.out.path())
    }

    /// File names written to the output directory, sorted.
    pub fn saved_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.out.path())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn saved_path(&self, name: &str) -> PathBuf {
        self.out.path().join(name)
    }
}
