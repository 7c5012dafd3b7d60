use ticketpress_types::{GenerationRequest, TicketVisual};

/// Builds the visual for one ticket number.
///
/// Returning `None` means the ticket could not be built; the pipeline skips
/// its slot with a warning and carries on with the batch.
pub trait TicketRenderer: Send + Sync {
    fn render(&self, number: u32, request: &GenerationRequest) -> Option<TicketVisual>;
}

impl<F> TicketRenderer for F
where
    F: Fn(u32, &GenerationRequest) -> Option<TicketVisual> + Send + Sync,
{
    fn render(&self, number: u32, request: &GenerationRequest) -> Option<TicketVisual> {
        self(number, request)
    }
}
