//! Captures a materialized page and appends it to the active document.

use super::reclaimer::PageScope;
use crate::error::{PageFault, PipelineError};
use crate::pipeline::context::PipelineContext;
use log::debug;
use std::sync::Arc;
use ticketpress_traits::{CaptureOptions, DocumentEncoder};
use ticketpress_types::PageLayout;

/// Captures `scope`'s page, JPEG-encodes it on the offload pool and appends
/// it to `encoder`. The bitmap is handed back to `scope` so it is released
/// whether or not encoding succeeded.
pub(crate) async fn rasterize_page(
    ctx: &PipelineContext,
    layout: &PageLayout,
    scope: &mut PageScope<'_>,
    options: &CaptureOptions,
    encoder: &mut dyn DocumentEncoder,
) -> Result<(), PipelineError> {
    let fail = |e: PageFault| PipelineError::rasterization(layout.first, layout.last, e);

    let bitmap = ctx
        .rasterizer
        .capture(scope.page(), options)
        .await
        .map_err(|e| fail(Box::new(e)))?;
    debug!(
        "[PAGE-{}] captured {}x{} px",
        layout.index + 1,
        bitmap.width(),
        bitmap.height()
    );

    let factory = Arc::clone(&ctx.encoder);
    let quality = options.quality;
    let (bitmap, encoded) = ctx
        .offload
        .run(move || {
            let encoded = factory.encode_page(&bitmap, quality);
            (bitmap, encoded)
        })
        .await
        .map_err(|e| fail(Box::new(e)))?;
    scope.hold(bitmap);
    let encoded = encoded.map_err(|e| fail(Box::new(e)))?;

    encoder
        .append_page(&encoded)
        .map_err(|e| fail(Box::new(e)))?;
    debug!(
        "[PAGE-{}] appended {} KB of JPEG",
        layout.index + 1,
        encoded.jpeg.len() / 1024
    );
    Ok(())
}
