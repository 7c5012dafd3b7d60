use thiserror::Error;
use ticketpress_traits::{EncodeError, OutputError};

/// Boxed cause carried by a fatal page failure.
pub type PageFault = Box<dyn std::error::Error + Send + Sync>;

/// Every way a generation session can end other than success.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("A generation is already in progress")]
    Busy,

    /// The user stopped the session. Not a fault: files saved before the
    /// cancellation stay on disk.
    #[error("Generation cancelled after {tickets_processed} tickets ({files_completed} files saved)")]
    Cancelled {
        tickets_processed: u64,
        files_completed: usize,
    },

    #[error("Failed to render tickets {first}-{last}: {source}")]
    Rasterization {
        first: u32,
        last: u32,
        #[source]
        source: PageFault,
    },

    #[error("Output failed: {0}")]
    Output(#[from] OutputError),

    #[error("Configuration is invalid: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub(crate) fn rasterization(first: u32, last: u32, source: impl Into<PageFault>) -> Self {
        PipelineError::Rasterization {
            first,
            last,
            source: source.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PipelineError::Cancelled { .. })
    }
}

impl From<config::ConfigError> for PipelineError {
    fn from(e: config::ConfigError) -> Self {
        PipelineError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Validation(e.to_string())
    }
}

// Encoder faults outside a page (opening or closing a document) have no
// ticket range and surface as output failures.
impl From<EncodeError> for PipelineError {
    fn from(e: EncodeError) -> Self {
        match e {
            EncodeError::Io(io) => PipelineError::Io(io),
            other => PipelineError::Output(OutputError::Unavailable(other.to_string())),
        }
    }
}
