//! Asset access for ticketpress.
//!
//! ## Available pieces
//!
//! - [`FilesystemResourceProvider`]: asset bytes from a local directory
//! - [`ImageCache`]: bounded store of decoded images, oldest entry evicted first
//! - [`ProviderAssetLoader`]: the default `AssetLoader`, resolving `data:` URIs
//!   and provider paths, decoding off the async task and caching the result
//!
//! The in-memory provider from ticketpress-traits is re-exported for convenience.

mod cache;
mod filesystem;
mod loader;

pub use cache::{DEFAULT_CACHE_CAPACITY, ImageCache};
pub use filesystem::FilesystemResourceProvider;
pub use loader::{DEFAULT_MAX_WIDTH, ProviderAssetLoader, decode_data_uri};

pub use ticketpress_traits::InMemoryResourceProvider;
