use ticketpress::{Color, DisplayMode, GenerationRequest, TicketStyle, TicketsPerPage};

/// A raffle request resembling a filled-in form.
pub fn raffle(start: u32, end: u32) -> GenerationRequest {
    GenerationRequest::new(start, end).with_style(TicketStyle {
        day_of_week: "SÁBADO".into(),
        date_text: "12 DE JULIO".into(),
        year: Some(2026),
        event_title: "Gran Rifa Anual".into(),
        event_subtitle: "Edición solidaria".into(),
        title_color: Color::rgb(74, 67, 126),
        voucher_type: "CENA".into(),
        location_1: "Plaza Mayor".into(),
        location_2: "Centro".into(),
        ..TicketStyle::default()
    })
}

pub fn with_assets(mut request: GenerationRequest, background: &str, qr: &str) -> GenerationRequest {
    request.style.image_url = background.into();
    request.style.qr_url = qr.into();
    request
}

pub fn layout(request: GenerationRequest, per_page: TicketsPerPage, mode: DisplayMode) -> GenerationRequest {
    request.with_tickets_per_page(per_page).with_mode(mode)
}
