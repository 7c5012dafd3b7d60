//! Fills the scratch page for one `PageLayout` and waits for its assets.

use super::Interrupted;
use crate::pipeline::context::PipelineContext;
use futures::future::join_all;
use log::{debug, warn};
use std::time::Duration;
use ticketpress_traits::{AssetLoader, PageComposition, PlacedTicket, ResourceError, SharedImage};
use ticketpress_types::{AssetRef, GenerationRequest, PageGeometry, PageLayout, ticket_size_mm};
use tokio_util::sync::CancellationToken;

/// What happened while materializing one page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct MaterializeReport {
    pub placed: u32,
    pub skipped: u32,
    pub missing_assets: u32,
}

enum AssetOutcome {
    Loaded(AssetRef, SharedImage),
    Missing,
    Cancelled,
}

/// Loads one asset, giving up after `timeout` or when `token` fires. A
/// failure only means the asset is drawn as absent.
async fn load_bounded(
    loader: &dyn AssetLoader,
    asset: AssetRef,
    timeout: Duration,
    token: &CancellationToken,
) -> AssetOutcome {
    tokio::select! {
        biased;
        _ = token.cancelled() => AssetOutcome::Cancelled,
        loaded = tokio::time::timeout(timeout, loader.load(&asset)) => match loaded {
            Ok(Ok(image)) => AssetOutcome::Loaded(asset.clone(), image),
            Ok(Err(e)) => {
                warn!("Asset {} unavailable, drawing without it: {}", asset.display_name(), e);
                AssetOutcome::Missing
            }
            Err(_) => {
                let e = ResourceError::Timeout {
                    path: asset.display_name(),
                    millis: timeout.as_millis() as u64,
                };
                warn!("{}; drawing without it", e);
                AssetOutcome::Missing
            }
        },
    }
}

/// Waits for every asset concurrently, each under its own timeout.
async fn load_all(
    ctx: &PipelineContext,
    assets: Vec<AssetRef>,
    token: &CancellationToken,
) -> Result<(Vec<(AssetRef, SharedImage)>, u32), Interrupted> {
    let timeout = ctx.config.image_load_timeout();
    let outcomes = join_all(
        assets
            .into_iter()
            .map(|asset| load_bounded(ctx.assets.as_ref(), asset, timeout, token)),
    )
    .await;

    let mut loaded = Vec::with_capacity(outcomes.len());
    let mut missing = 0;
    for outcome in outcomes {
        match outcome {
            AssetOutcome::Loaded(asset, image) => loaded.push((asset, image)),
            AssetOutcome::Missing => missing += 1,
            AssetOutcome::Cancelled => return Err(Interrupted),
        }
    }
    Ok((loaded, missing))
}

/// Decodes the request's assets once so the first page finds them cached.
pub(crate) async fn prefetch(
    ctx: &PipelineContext,
    request: &GenerationRequest,
    token: &CancellationToken,
) -> Result<u32, Interrupted> {
    let assets = request.asset_refs();
    if assets.is_empty() {
        return Ok(0);
    }
    let (loaded, missing) = load_all(ctx, assets, token).await?;
    debug!("Prefetched {} assets ({} unavailable)", loaded.len(), missing);
    Ok(loaded.len() as u32)
}

/// Clears `page` and places one ticket per number of `layout`, in order.
pub(crate) async fn materialize(
    ctx: &PipelineContext,
    request: &GenerationRequest,
    layout: &PageLayout,
    page: &mut PageComposition,
    token: &CancellationToken,
) -> Result<MaterializeReport, Interrupted> {
    page.clear();
    page.page_index = layout.index;

    let geometry = PageGeometry::for_layout(request.tickets_per_page);
    let slots = geometry.slot_rects(layout.ticket_count());
    let mut report = MaterializeReport::default();

    for (number, slot) in layout.numbers().zip(slots) {
        let Some(visual) = ctx.renderer.render(number, request) else {
            warn!("Ticket {} could not be built; leaving its slot empty", number);
            report.skipped += 1;
            continue;
        };
        let size = ticket_size_mm(visual.mode).scaled(layout.scale);
        page.tickets.push(PlacedTicket {
            visual,
            frame: slot.centered(size),
            scale: layout.scale,
        });
        report.placed += 1;
    }

    let (loaded, missing) = load_all(ctx, page.asset_refs(), token).await?;
    page.assets.extend(loaded);
    report.missing_assets = missing;
    Ok(report)
}
