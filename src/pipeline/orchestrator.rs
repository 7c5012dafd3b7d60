// src/pipeline/orchestrator.rs
use super::Interrupted;
use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::finalizer::{OutputFinalizer, OutputTarget};
use super::materializer;
use super::planner::{self, Plan};
use super::rasterize::rasterize_page;
use super::reclaimer::{MemoryReclaimer, PageScope};
use super::session::{
    CancelHandle, GenerationSession, Progress, ProgressReporter, SessionSlot, page_percent,
};
use crate::error::PipelineError;
use log::{debug, error, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use ticketpress_traits::{CaptureOptions, EncodeError, PageComposition};
use ticketpress_types::{GenerationRequest, OutputFile, OutputMode};
use tokio::sync::watch;

/// A file written by a completed session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedFile {
    pub path: PathBuf,
    pub file: OutputFile,
}

/// Summary of a successful session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub files: Vec<SavedFile>,
    pub tickets_processed: u64,
    pub pages: u32,
    pub elapsed: Duration,
}

impl SessionReport {
    pub fn tickets_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.tickets_processed as f64 / secs
        } else {
            self.tickets_processed as f64
        }
    }
}

/// Turns generation requests into PDF files, one session at a time.
pub struct BatchPipeline {
    ctx: PipelineContext,
    slot: Arc<SessionSlot>,
    progress: Arc<watch::Sender<Progress>>,
}

impl BatchPipeline {
    pub(crate) fn new(ctx: PipelineContext) -> Self {
        let (tx, _) = watch::channel(Progress::default());
        Self {
            ctx,
            slot: Arc::new(SessionSlot::default()),
            progress: Arc::new(tx),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.ctx.config
    }

    pub fn is_processing(&self) -> bool {
        self.slot.is_busy()
    }

    /// Requests cancellation of the running session, if any. The session
    /// stops at its next page boundary.
    pub fn cancel(&self) -> bool {
        self.cancel_handle().cancel()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(Arc::clone(&self.slot))
    }

    pub fn subscribe_progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Lays out `request` without rendering anything.
    pub fn plan(&self, request: &GenerationRequest, mode: OutputMode) -> Result<Plan, PipelineError> {
        planner::plan(request, mode, &self.ctx.config)
    }

    /// Runs one full session. Returns `Busy` at once if another session is
    /// running on this pipeline.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        mode: OutputMode,
    ) -> Result<SessionReport, PipelineError> {
        let Some(guard) = self.slot.try_acquire() else {
            warn!("Rejecting generation request: a session is already running");
            self.ctx
                .notifier
                .warning("Busy", "A generation is already in progress");
            return Err(PipelineError::Busy);
        };

        let plan = match planner::plan(request, mode, &self.ctx.config) {
            Ok(plan) => plan,
            Err(e) => {
                self.ctx.notifier.error("Invalid request", &e.to_string());
                return Err(e);
            }
        };
        info!(
            "Generating tickets {}-{} ({} tickets, {} pages, {} files, {} mode)",
            request.start_number,
            request.end_number,
            plan.total_tickets,
            plan.total_pages,
            plan.files.len(),
            mode
        );

        let reporter = ProgressReporter::new(Arc::clone(&self.progress), Arc::clone(&self.ctx.notifier));
        let mut session = GenerationSession::new(guard, reporter);
        let finalizer = OutputFinalizer::new(&self.ctx);
        let mut target = finalizer.prepare(mode);
        let reclaimer = MemoryReclaimer::new(
            Arc::clone(&self.ctx.assets),
            self.ctx.config.reclaim_interval_pages,
            self.ctx.config.memory_ceiling_bytes(),
        );

        let outcome = self
            .run(&mut session, request, &plan, &finalizer, &mut target, &reclaimer)
            .await;

        if plan.total_tickets > u64::from(self.ctx.config.release_assets_above) {
            reclaimer.release_session_assets(request);
        }
        // Any document still open was not finished and is discarded here.
        session.encoder = None;

        let elapsed = session.started.elapsed();
        match outcome {
            Ok(files) => {
                let report = SessionReport {
                    files,
                    tickets_processed: session.tickets_processed,
                    pages: session.pages_written,
                    elapsed,
                };
                info!(
                    "Generated {} tickets in {:.1}s ({:.0} tickets/s)",
                    report.tickets_processed,
                    elapsed.as_secs_f64(),
                    report.tickets_per_second()
                );
                self.ctx.notifier.success(&format!(
                    "Completed in {:.1}s ({} tickets)",
                    elapsed.as_secs_f64(),
                    report.tickets_processed
                ));
                Ok(report)
            }
            Err(e) => {
                finalizer.abort(target);
                if e.is_cancelled() {
                    info!(
                        "Generation cancelled at {:.0}%: {}",
                        session.progress.percent(),
                        e
                    );
                    self.ctx.notifier.cancelled(&format!(
                        "Cancelled after {} of {} tickets in {:.1}s",
                        session.tickets_processed,
                        plan.total_tickets,
                        session.elapsed_secs()
                    ));
                } else {
                    error!("Generation failed: {}", e);
                    self.ctx.notifier.error(
                        "Generation failed",
                        &format!(
                            "{} ({} of {} tickets processed in {:.1}s)",
                            e,
                            session.tickets_processed,
                            plan.total_tickets,
                            session.elapsed_secs()
                        ),
                    );
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        session: &mut GenerationSession,
        request: &GenerationRequest,
        plan: &Plan,
        finalizer: &OutputFinalizer<'_>,
        target: &mut OutputTarget,
        reclaimer: &MemoryReclaimer,
    ) -> Result<Vec<SavedFile>, PipelineError> {
        let ctx = &self.ctx;
        let token = session.token().clone();

        session.progress.report(5.0, "Optimizing images...");
        if materializer::prefetch(ctx, request, &token).await.is_err() {
            return Err(session.cancelled());
        }

        let options = CaptureOptions::a4(plan.quality.scale, plan.quality.quality);
        let pause = ctx.config.page_pause(plan.total_tickets);
        let mut scratch = PageComposition::new();
        let mut saved = Vec::with_capacity(plan.files.len());

        for file in &plan.files {
            if file.index > 0 && finalizer.between_files(file.index + 1, &token).await.is_err() {
                return Err(session.cancelled());
            }
            session.encoder = Some(ctx.encoder.begin()?);

            for layout in &file.pages {
                if session.is_cancelled() {
                    return Err(session.cancelled());
                }
                let encoder = session
                    .encoder
                    .as_deref_mut()
                    .ok_or(EncodeError::NotStarted)?;

                {
                    let mut scope = PageScope::new(&mut scratch);
                    let report = match materializer::materialize(
                        ctx,
                        request,
                        layout,
                        scope.page(),
                        &token,
                    )
                    .await
                    {
                        Ok(report) => report,
                        Err(Interrupted) => return Err(session.cancelled()),
                    };
                    debug!(
                        "[PAGE-{}] tickets {}-{}: {} placed, {} skipped, {} assets missing",
                        layout.index + 1,
                        layout.first,
                        layout.last,
                        report.placed,
                        report.skipped,
                        report.missing_assets
                    );
                    rasterize_page(ctx, layout, &mut scope, &options, encoder).await?;
                }

                session.tickets_processed += u64::from(layout.ticket_count());
                session.pages_written += 1;
                reclaimer.after_page(session.pages_written, encoder)?;
                session.progress.report(
                    page_percent(layout.index + 1, plan.total_pages),
                    format!(
                        "Processing page {} of {}...",
                        layout.index + 1,
                        plan.total_pages
                    ),
                );

                tokio::select! {
                    _ = token.cancelled() => {}
                    _ = tokio::time::sleep(pause) => {}
                }
            }

            if file.index + 1 == plan.files.len() as u32 {
                session.progress.report(95.0, "Finalizing document...");
            }
            let encoder = session.encoder.take().ok_or(EncodeError::NotStarted)?;
            let document = encoder.finish()?;
            let path = finalizer.finish_file(target, file, document)?;
            session.files_completed += 1;
            saved.push(SavedFile {
                path,
                file: file.clone(),
            });
        }

        Ok(saved)
    }
}
