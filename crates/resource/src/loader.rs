use crate::cache::ImageCache;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::imageops::FilterType;
use log::{debug, warn};
use std::sync::Arc;
use ticketpress_executor::OffloadImpl;
use ticketpress_traits::{AssetLoader, ResourceError, ResourceProvider, SharedImage};
use ticketpress_types::AssetRef;

/// Widest decoded asset kept in memory; wider images are downscaled.
pub const DEFAULT_MAX_WIDTH: u32 = 1200;

/// The default `AssetLoader`.
///
/// `data:` URIs are decoded directly; anything else is fetched from the
/// provider. Fetching and decoding run on the offload pool, and the decoded
/// image is cached so later pages reuse it.
pub struct ProviderAssetLoader {
    provider: Arc<dyn ResourceProvider>,
    cache: Arc<ImageCache>,
    offload: OffloadImpl,
    max_width: u32,
}

impl ProviderAssetLoader {
    pub fn new(
        provider: Arc<dyn ResourceProvider>,
        cache: Arc<ImageCache>,
        offload: OffloadImpl,
    ) -> Self {
        Self {
            provider,
            cache,
            offload,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }

    pub fn with_max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width.max(1);
        self
    }

    pub fn cache(&self) -> &Arc<ImageCache> {
        &self.cache
    }
}

/// Splits a `data:` URI and returns its decoded payload.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ResourceError> {
    let invalid = |message: &str| ResourceError::Decode {
        path: "data URI".to_string(),
        message: message.to_string(),
    };
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| invalid("missing data: scheme"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| invalid("missing ',' separator"))?;
    if !header.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(invalid("only base64 payloads are supported"));
    }
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| invalid(&e.to_string()))
}

fn fetch_and_decode(
    provider: &dyn ResourceProvider,
    asset: &AssetRef,
    max_width: u32,
) -> Result<SharedImage, ResourceError> {
    let bytes = if asset.is_data_uri() {
        decode_data_uri(asset.as_str())?
    } else {
        provider.load(asset.as_str())?.to_vec()
    };

    let decoded = image::load_from_memory(&bytes).map_err(|e| ResourceError::Decode {
        path: asset.display_name(),
        message: e.to_string(),
    })?;

    let decoded = if decoded.width() > max_width {
        let height = ((decoded.height() as f64 * max_width as f64) / decoded.width() as f64)
            .round()
            .max(1.0) as u32;
        debug!(
            "Downscaling {} from {}px to {}px wide",
            asset.display_name(),
            decoded.width(),
            max_width
        );
        decoded.resize_exact(max_width, height, FilterType::Triangle)
    } else {
        decoded
    };

    Ok(Arc::new(decoded.into_rgba8()))
}

#[async_trait]
impl AssetLoader for ProviderAssetLoader {
    async fn load(&self, asset: &AssetRef) -> Result<SharedImage, ResourceError> {
        if let Some(hit) = self.cache.get(asset) {
            return Ok(hit);
        }

        let provider = Arc::clone(&self.provider);
        let job_asset = asset.clone();
        let max_width = self.max_width;
        let image = self
            .offload
            .run(move || fetch_and_decode(provider.as_ref(), &job_asset, max_width))
            .await
            .map_err(|e| ResourceError::LoadFailed {
                path: asset.display_name(),
                message: e.to_string(),
            })??;

        self.cache.insert(asset.clone(), Arc::clone(&image));
        Ok(image)
    }

    fn release(&self, asset: &AssetRef) {
        self.cache.remove(asset);
    }

    fn trim(&self) {
        let dropped = self.cache.len();
        self.cache.clear();
        if dropped > 0 {
            warn!("Dropped {} cached images under memory pressure", dropped);
        }
    }

    fn name(&self) -> &'static str {
        "ProviderAssetLoader"
    }
}
