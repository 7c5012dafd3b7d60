//! Hands finished documents to the print surface or the download sink.

use super::Interrupted;
use crate::error::PipelineError;
use crate::pipeline::context::PipelineContext;
use log::{info, warn};
use std::path::PathBuf;
use ticketpress_traits::{EncodedDocument, PrintHandle};
use ticketpress_types::{OutputFile, OutputMode};
use tokio_util::sync::CancellationToken;

/// Where this session's documents go. For print, the surface is prepared
/// before any page is rendered.
#[derive(Debug)]
pub(crate) enum OutputTarget {
    Download,
    Print { handle: Option<PrintHandle> },
}

pub(crate) struct OutputFinalizer<'a> {
    ctx: &'a PipelineContext,
}

impl<'a> OutputFinalizer<'a> {
    pub(crate) fn new(ctx: &'a PipelineContext) -> Self {
        Self { ctx }
    }

    pub(crate) fn prepare(&self, mode: OutputMode) -> OutputTarget {
        match mode {
            OutputMode::Download => OutputTarget::Download,
            OutputMode::Print => match self.ctx.print.prepare() {
                Ok(handle) => OutputTarget::Print {
                    handle: Some(handle),
                },
                Err(e) => {
                    warn!("Print surface could not be prepared: {}", e);
                    self.ctx.notifier.warning(
                        "Print window blocked",
                        "The print window could not be opened in advance; the document will open in a new window when ready",
                    );
                    OutputTarget::Print { handle: None }
                }
            },
        }
    }

    /// Persists or shows one finished file.
    pub(crate) fn finish_file(
        &self,
        target: &mut OutputTarget,
        file: &OutputFile,
        document: EncodedDocument,
    ) -> Result<PathBuf, PipelineError> {
        let path = match target {
            OutputTarget::Download => self.ctx.sink.persist(&file.file_name(), document)?,
            OutputTarget::Print { handle } => match handle.take() {
                Some(handle) => match self.ctx.print.show(&handle, document) {
                    Ok(path) => path,
                    Err(e) => {
                        // The prepared surface would otherwise be left behind.
                        self.ctx.print.close(handle);
                        return Err(e.into());
                    }
                },
                None => self.ctx.print.open(document)?,
            },
        };
        info!(
            "Saved tickets {}-{} ({} pages) to {}",
            file.first,
            file.last,
            file.page_count(),
            path.display()
        );
        Ok(path)
    }

    /// Announces the next part and pauses before it starts. Returns early
    /// when the session is cancelled.
    pub(crate) async fn between_files(
        &self,
        next_part: u32,
        token: &CancellationToken,
    ) -> Result<(), Interrupted> {
        self.ctx.notifier.info(
            "Split output",
            &format!("Starting download of part {}...", next_part),
        );
        tokio::select! {
            _ = token.cancelled() => Err(Interrupted),
            _ = tokio::time::sleep(self.ctx.config.between_files()) => Ok(()),
        }
    }

    /// Closes a print surface that was prepared but never shown.
    pub(crate) fn abort(&self, target: OutputTarget) {
        if let OutputTarget::Print {
            handle: Some(handle),
        } = target
        {
            self.ctx.print.close(handle);
        }
    }
}
