//! Releases per-page buffers and keeps the session's footprint bounded.

use log::{debug, warn};
use std::sync::Arc;
use ticketpress_traits::{AssetLoader, Bitmap, DocumentEncoder, EncodeError, PageComposition};
use ticketpress_types::GenerationRequest;

/// Owns the scratch page and the captured bitmap for the duration of one
/// page. Dropping it releases the bitmap and clears the page on every exit
/// path, including errors.
pub(crate) struct PageScope<'a> {
    page: &'a mut PageComposition,
    bitmap: Option<Bitmap>,
}

impl<'a> PageScope<'a> {
    pub(crate) fn new(page: &'a mut PageComposition) -> Self {
        Self { page, bitmap: None }
    }

    pub(crate) fn page(&mut self) -> &mut PageComposition {
        &mut *self.page
    }

    pub(crate) fn hold(&mut self, bitmap: Bitmap) {
        self.bitmap = Some(bitmap);
    }
}

impl Drop for PageScope<'_> {
    fn drop(&mut self) {
        if let Some(bitmap) = self.bitmap.as_mut() {
            bitmap.release();
        }
        self.page.clear();
    }
}

pub(crate) struct MemoryReclaimer {
    assets: Arc<dyn AssetLoader>,
    interval: u32,
    ceiling_bytes: usize,
}

impl MemoryReclaimer {
    pub(crate) fn new(assets: Arc<dyn AssetLoader>, interval: u32, ceiling_bytes: usize) -> Self {
        Self {
            assets,
            interval: interval.max(1),
            ceiling_bytes,
        }
    }

    /// Runs after page number `pages_written` (one-based) of the session.
    pub(crate) fn after_page(
        &self,
        pages_written: u32,
        encoder: &mut dyn DocumentEncoder,
    ) -> Result<(), EncodeError> {
        if pages_written % self.interval != 0 {
            return Ok(());
        }
        encoder.flush()?;
        if let Some(usage) = memory_stats::memory_stats() {
            debug!(
                "Memory after {} pages: {:.1} MB resident",
                pages_written,
                usage.physical_mem as f64 / (1024.0 * 1024.0)
            );
            if usage.physical_mem > self.ceiling_bytes {
                warn!(
                    "Resident memory {:.1} MB is above the {:.0} MB ceiling; trimming asset cache",
                    usage.physical_mem as f64 / (1024.0 * 1024.0),
                    self.ceiling_bytes as f64 / (1024.0 * 1024.0)
                );
                self.assets.trim();
            }
        }
        Ok(())
    }

    /// Evicts the request's assets once a large session is over.
    pub(crate) fn release_session_assets(&self, request: &GenerationRequest) {
        for asset in request.asset_refs() {
            self.assets.release(&asset);
        }
    }
}
