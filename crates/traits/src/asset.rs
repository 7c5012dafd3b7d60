use crate::resource::ResourceError;
use async_trait::async_trait;
use image::RgbaImage;
use std::sync::Arc;
use ticketpress_types::AssetRef;

/// A decoded raster asset shared between every ticket that uses it.
pub type SharedImage = Arc<RgbaImage>;

/// Resolves and decodes the raster assets a ticket references.
///
/// `load` may suspend; callers bound it with their own timeout.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, asset: &AssetRef) -> Result<SharedImage, ResourceError>;

    /// Drops any cached copy of `asset`.
    fn release(&self, _asset: &AssetRef) {}

    /// Called under memory pressure; drops everything cached.
    fn trim(&self) {}

    fn name(&self) -> &'static str;
}
