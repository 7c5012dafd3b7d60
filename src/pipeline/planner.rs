//! Splits a request into output files and pages before any rendering.

use super::config::{PipelineConfig, QualityProfile};
use crate::error::PipelineError;
use serde::Serialize;
use ticketpress_types::{GenerationRequest, OutputFile, OutputMode, PageLayout, scale_factor};

/// The full page and file layout of one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub files: Vec<OutputFile>,
    pub total_tickets: u64,
    pub total_pages: u32,
    pub split: bool,
    pub scale: f32,
    pub quality: QualityProfile,
}

impl Plan {
    pub fn pages(&self) -> impl Iterator<Item = &PageLayout> {
        self.files.iter().flat_map(|f| f.pages.iter())
    }
}

pub fn validate(request: &GenerationRequest, config: &PipelineConfig) -> Result<u64, PipelineError> {
    if request.start_number < 1 {
        return Err(PipelineError::Validation(
            "start number must be at least 1".to_string(),
        ));
    }
    let total = request.total_tickets();
    if total <= 0 {
        return Err(PipelineError::Validation(format!(
            "end number {} is below start number {}",
            request.end_number, request.start_number
        )));
    }
    let total = total as u64;
    if total > u64::from(config.max_tickets_total) {
        return Err(PipelineError::Validation(format!(
            "{} tickets requested, the limit is {}",
            total, config.max_tickets_total
        )));
    }
    Ok(total)
}

/// Validates `request` and lays it out.
///
/// Splitting only happens for downloads: each chunk of at most
/// `max_tickets_per_file` tickets becomes its own file and is paginated on
/// its own, so no page spans two files.
pub fn plan(
    request: &GenerationRequest,
    mode: OutputMode,
    config: &PipelineConfig,
) -> Result<Plan, PipelineError> {
    let total_tickets = validate(request, config)?;
    let per_page = request.tickets_per_page.count();
    let scale = scale_factor(request.tickets_per_page, request.ticket_mode);
    let split = request.split_pdf
        && mode == OutputMode::Download
        && total_tickets > u64::from(config.max_tickets_per_file);

    let chunk = if split {
        config.max_tickets_per_file
    } else {
        u32::MAX
    };

    let mut files = Vec::new();
    let mut page_index = 0u32;
    let mut first = request.start_number;
    loop {
        let last = first.saturating_add(chunk - 1).min(request.end_number);
        let mut pages = Vec::new();
        let mut page_first = first;
        loop {
            let page_last = page_first.saturating_add(per_page - 1).min(last);
            pages.push(PageLayout {
                index: page_index,
                first: page_first,
                last: page_last,
                scale,
            });
            page_index += 1;
            if page_last == last {
                break;
            }
            page_first = page_last + 1;
        }
        let index = files.len() as u32;
        files.push(OutputFile {
            index,
            part: split.then_some(index + 1),
            first,
            last,
            pages,
        });
        if last == request.end_number {
            break;
        }
        first = last + 1;
    }

    Ok(Plan {
        files,
        total_tickets,
        total_pages: page_index,
        split,
        scale,
        quality: config.quality_for(total_tickets),
    })
}
