//! Seams between the batch pipeline and the collaborators it drives.
//!
//! The pipeline only ever talks to these traits; the workspace provides a
//! default implementation of each so the tool runs end to end.

pub mod asset;
pub mod encoder;
pub mod executor;
pub mod notify;
pub mod output;
pub mod raster;
pub mod renderer;
pub mod resource;

pub use asset::{AssetLoader, SharedImage};
pub use encoder::{DocumentEncoder, EncodeError, EncodedDocument, EncodedPage, EncoderFactory};
pub use executor::OffloadError;
pub use notify::{Notifier, NullNotifier};
pub use output::{DocumentSink, OutputError, PrintHandle, PrintSurface};
pub use raster::{Bitmap, CaptureOptions, PageComposition, PageRasterizer, PlacedTicket, RasterError};
pub use renderer::TicketRenderer;
pub use resource::{InMemoryResourceProvider, ResourceError, ResourceProvider, SharedResourceData};
