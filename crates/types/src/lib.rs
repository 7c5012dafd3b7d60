pub mod color;
pub mod geometry;
pub mod ids;
pub mod layout;
pub mod request;
pub mod template;

pub use color::Color;
pub use geometry::{Rect, Size};
pub use ids::AssetRef;
pub use layout::{OutputFile, PageGeometry, PageLayout, scale_factor, ticket_size_mm};
pub use request::{
    DisplayMode, GenerationRequest, InvalidTicketsPerPage, OutputMode, TicketStyle, TicketsPerPage,
};
pub use template::{TextLine, TicketVisual};
