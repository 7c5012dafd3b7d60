//! Collaborator doubles that record what the pipeline asked of them.

use async_trait::async_trait;
use image::{Rgb, RgbImage, RgbaImage};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use ticketpress::CancelHandle;
use ticketpress::traits::{
    AssetLoader, Bitmap, CaptureOptions, EncodedDocument, Notifier, OutputError, PageComposition,
    PageRasterizer, PrintHandle, PrintSurface, RasterError, ResourceError, SharedImage,
    TicketRenderer,
};
use ticketpress::{GenerationRequest, TemplateTicketRenderer, TicketVisual};
use ticketpress::types::AssetRef;
use tokio::sync::{Notify, Semaphore};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Progress(f32, String),
    Info(String),
    Warning(String),
    Success(String),
    Error(String),
    Cancelled(String),
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Success(_) | Event::Error(_) | Event::Cancelled(_))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Event>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn terminal(&self) -> Vec<Event> {
        self.events().into_iter().filter(Event::is_terminal).collect()
    }

    pub fn percentages(&self) -> Vec<f32> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Progress(p, _) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Notifier for RecordingNotifier {
    fn progress(&self, percent: f32, message: &str) {
        self.push(Event::Progress(percent, message.to_string()));
    }
    fn info(&self, title: &str, message: &str) {
        self.push(Event::Info(format!("{}: {}", title, message)));
    }
    fn warning(&self, title: &str, message: &str) {
        self.push(Event::Warning(format!("{}: {}", title, message)));
    }
    fn success(&self, message: &str) {
        self.push(Event::Success(message.to_string()));
    }
    fn error(&self, title: &str, message: &str) {
        self.push(Event::Error(format!("{}: {}", title, message)));
    }
    fn cancelled(&self, message: &str) {
        self.push(Event::Cancelled(message.to_string()));
    }
}

/// What the rasterizer saw for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedPage {
    pub page_index: u32,
    pub numbers: Vec<u32>,
    pub assets: usize,
    pub scale: f32,
}

/// Returns a small flat bitmap per page and records the composition.
/// Optionally fails on one page index or blocks until released.
#[derive(Default)]
pub struct StaticRasterizer {
    pages: Mutex<Vec<CapturedPage>>,
    fail_on_page: OnceLock<u32>,
    gate: OnceLock<Gate>,
}

pub struct Gate {
    pub entered: Notify,
    pub release: Semaphore,
}

impl StaticRasterizer {
    pub fn failing_on(page_index: u32) -> Self {
        let rasterizer = Self::default();
        let _ = rasterizer.fail_on_page.set(page_index);
        rasterizer
    }

    /// Every capture signals `entered` and then waits for a `release` permit.
    pub fn gated() -> Self {
        let rasterizer = Self::default();
        let _ = rasterizer.gate.set(Gate {
            entered: Notify::new(),
            release: Semaphore::new(0),
        });
        rasterizer
    }

    pub fn gate(&self) -> &Gate {
        self.gate.get().expect("rasterizer is not gated")
    }

    pub fn pages(&self) -> Vec<CapturedPage> {
        self.pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageRasterizer for StaticRasterizer {
    async fn capture(
        &self,
        page: &PageComposition,
        options: &CaptureOptions,
    ) -> Result<Bitmap, RasterError> {
        if let Some(gate) = self.gate.get() {
            gate.entered.notify_one();
            gate.release
                .acquire()
                .await
                .map_err(|e| RasterError::Capture(e.to_string()))?
                .forget();
        }
        if self.fail_on_page.get() == Some(&page.page_index) {
            return Err(RasterError::Capture("simulated capture fault".into()));
        }
        self.pages.lock().unwrap().push(CapturedPage {
            page_index: page.page_index,
            numbers: page.tickets.iter().map(|t| t.visual.number).collect(),
            assets: page.assets.len(),
            scale: options.scale,
        });
        Ok(Bitmap::new(RgbImage::from_pixel(21, 30, Rgb([240, 240, 240]))))
    }

    fn name(&self) -> &'static str {
        "StaticRasterizer"
    }
}

/// Resolves refs listed as ready immediately; every other ref never loads.
#[derive(Default)]
pub struct PendingAssetLoader {
    ready: Vec<AssetRef>,
}

impl PendingAssetLoader {
    pub fn with_ready(ready: &[&str]) -> Self {
        Self {
            ready: ready.iter().map(|r| AssetRef::new(*r)).collect(),
        }
    }
}

#[async_trait]
impl AssetLoader for PendingAssetLoader {
    async fn load(&self, asset: &AssetRef) -> Result<SharedImage, ResourceError> {
        if self.ready.contains(asset) {
            return Ok(Arc::new(RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255]))));
        }
        std::future::pending().await
    }

    fn name(&self) -> &'static str {
        "PendingAssetLoader"
    }
}

/// The default renderer, but it cancels the session while rendering
/// `cancel_at`, and returns nothing for `skip`.
pub struct ScriptedRenderer {
    pub handle: OnceLock<CancelHandle>,
    pub cancel_at: Option<u32>,
    pub skip: Option<u32>,
}

impl ScriptedRenderer {
    pub fn cancelling_at(number: u32) -> Self {
        Self {
            handle: OnceLock::new(),
            cancel_at: Some(number),
            skip: None,
        }
    }

    pub fn skipping(number: u32) -> Self {
        Self {
            handle: OnceLock::new(),
            cancel_at: None,
            skip: Some(number),
        }
    }
}

impl TicketRenderer for ScriptedRenderer {
    fn render(&self, number: u32, request: &GenerationRequest) -> Option<TicketVisual> {
        if self.cancel_at == Some(number) {
            if let Some(handle) = self.handle.get() {
                handle.cancel();
            }
        }
        if self.skip == Some(number) {
            return None;
        }
        TemplateTicketRenderer.render(number, request)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintCall {
    Prepare,
    Show(PathBuf),
    Open,
    Close(PathBuf),
}

/// A print surface that keeps documents in memory and logs every call.
#[derive(Default)]
pub struct RecordingPrintSurface {
    calls: Mutex<Vec<PrintCall>>,
    documents: Mutex<Vec<Vec<u8>>>,
    pub blocked: OnceLock<()>,
    pub show_fails: OnceLock<()>,
}

impl RecordingPrintSurface {
    pub fn blocked() -> Self {
        let surface = Self::default();
        let _ = surface.blocked.set(());
        surface
    }

    /// Prepares fine but refuses to display the document.
    pub fn failing_show() -> Self {
        let surface = Self::default();
        let _ = surface.show_fails.set(());
        surface
    }

    pub fn calls(&self) -> Vec<PrintCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn documents(&self) -> Vec<Vec<u8>> {
        self.documents.lock().unwrap().clone()
    }
}

impl PrintSurface for RecordingPrintSurface {
    fn prepare(&self) -> Result<PrintHandle, OutputError> {
        self.calls.lock().unwrap().push(PrintCall::Prepare);
        if self.blocked.get().is_some() {
            return Err(OutputError::Unavailable("popup blocked".into()));
        }
        Ok(PrintHandle(PathBuf::from("print-window")))
    }

    fn show(&self, handle: &PrintHandle, document: EncodedDocument) -> Result<PathBuf, OutputError> {
        self.calls
            .lock()
            .unwrap()
            .push(PrintCall::Show(handle.path().to_path_buf()));
        if self.show_fails.get().is_some() {
            return Err(OutputError::Unavailable("print window was closed".into()));
        }
        self.documents.lock().unwrap().push(document.into_bytes()?);
        Ok(handle.path().to_path_buf())
    }

    fn open(&self, document: EncodedDocument) -> Result<PathBuf, OutputError> {
        self.calls.lock().unwrap().push(PrintCall::Open);
        self.documents.lock().unwrap().push(document.into_bytes()?);
        Ok(PathBuf::from("new-window"))
    }

    fn close(&self, handle: PrintHandle) {
        self.calls
            .lock()
            .unwrap()
            .push(PrintCall::Close(handle.path().to_path_buf()));
    }
}
