use crate::encoder::EncodedDocument;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("output surface unavailable: {0}")]
    Unavailable(String),
}

/// Stores a finished download under its file name.
pub trait DocumentSink: Send + Sync {
    fn persist(&self, file_name: &str, document: EncodedDocument) -> Result<PathBuf, OutputError>;
}

/// Token for a print surface prepared ahead of the heavy work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintHandle(pub PathBuf);

impl PrintHandle {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// The print destination. `prepare` runs before any page is rendered so a
/// blocked surface is reported up front.
pub trait PrintSurface: Send + Sync {
    fn prepare(&self) -> Result<PrintHandle, OutputError>;

    /// Shows the document on a surface returned by `prepare`.
    fn show(&self, handle: &PrintHandle, document: EncodedDocument) -> Result<PathBuf, OutputError>;

    /// Opens a fresh surface when preparation had failed.
    fn open(&self, document: EncodedDocument) -> Result<PathBuf, OutputError>;

    fn close(&self, handle: PrintHandle);
}
