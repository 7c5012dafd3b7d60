//! Per-call runtime state: the single-session guard, the cancellation
//! token and progress reporting.

use crate::error::PipelineError;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use ticketpress_traits::{DocumentEncoder, Notifier};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Shared between a pipeline and its cancel handles.
#[derive(Debug, Default)]
pub(crate) struct SessionSlot {
    busy: AtomicBool,
    token: Mutex<Option<CancellationToken>>,
}

impl SessionSlot {
    fn token_slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.token.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Claims the slot, or returns `None` while another session holds it.
    ///
    /// The flag flips and the token is stored under the token lock, so a
    /// `cancel` that sees the slot busy always finds the token.
    pub(crate) fn try_acquire(self: &Arc<Self>) -> Option<ProcessingGuard> {
        let mut slot = self.token_slot();
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let token = CancellationToken::new();
        *slot = Some(token.clone());
        drop(slot);
        Some(ProcessingGuard {
            slot: Arc::clone(self),
            token,
        })
    }

    fn cancel(&self) -> bool {
        match self.token_slot().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}

/// Held for the lifetime of one session; dropping it frees the slot.
#[derive(Debug)]
pub(crate) struct ProcessingGuard {
    slot: Arc<SessionSlot>,
    token: CancellationToken,
}

impl ProcessingGuard {
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        let mut slot = self.slot.token_slot();
        slot.take();
        self.slot.busy.store(false, Ordering::Release);
    }
}

/// Cancels whichever session is running on the pipeline it came from.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    slot: Arc<SessionSlot>,
}

impl CancelHandle {
    pub(crate) fn new(slot: Arc<SessionSlot>) -> Self {
        Self { slot }
    }

    /// Returns `false` when nothing was running.
    pub fn cancel(&self) -> bool {
        self.slot.cancel()
    }

    pub fn is_processing(&self) -> bool {
        self.slot.is_busy()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Progress {
    pub percent: f32,
    pub message: String,
}

/// Forwards progress to the notifier and the watch channel, never letting
/// the percentage go backwards within a session.
pub(crate) struct ProgressReporter {
    tx: Arc<watch::Sender<Progress>>,
    notifier: Arc<dyn Notifier>,
    current: f32,
}

impl ProgressReporter {
    pub(crate) fn new(tx: Arc<watch::Sender<Progress>>, notifier: Arc<dyn Notifier>) -> Self {
        tx.send_replace(Progress::default());
        Self {
            tx,
            notifier,
            current: 0.0,
        }
    }

    pub(crate) fn report(&mut self, percent: f32, message: impl Into<String>) {
        self.current = self.current.max(percent.clamp(0.0, 100.0));
        let message = message.into();
        self.notifier.progress(self.current, &message);
        self.tx.send_replace(Progress {
            percent: self.current,
            message,
        });
    }

    pub(crate) fn percent(&self) -> f32 {
        self.current
    }
}

/// Progress after finishing page `done` (one-based) of `total`.
pub(crate) fn page_percent(done: u32, total: u32) -> f32 {
    10.0 + (done as f32 / total.max(1) as f32) * 80.0
}

/// Mutable state of one `generate` call. Dropping it discards any document
/// still being accumulated and releases the processing slot.
pub(crate) struct GenerationSession {
    pub(crate) guard: ProcessingGuard,
    pub(crate) started: Instant,
    pub(crate) progress: ProgressReporter,
    pub(crate) encoder: Option<Box<dyn DocumentEncoder>>,
    pub(crate) tickets_processed: u64,
    pub(crate) pages_written: u32,
    pub(crate) files_completed: usize,
}

impl GenerationSession {
    pub(crate) fn new(guard: ProcessingGuard, progress: ProgressReporter) -> Self {
        Self {
            guard,
            started: Instant::now(),
            progress,
            encoder: None,
            tickets_processed: 0,
            pages_written: 0,
            files_completed: 0,
        }
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        self.guard.token()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.guard.token().is_cancelled()
    }

    /// The error ending this session when the user cancels it.
    pub(crate) fn cancelled(&self) -> PipelineError {
        PipelineError::Cancelled {
            tickets_processed: self.tickets_processed,
            files_completed: self.files_completed,
        }
    }

    pub(crate) fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketpress_traits::NullNotifier;

    #[test]
    fn second_acquire_fails_until_guard_drops() {
        let slot = Arc::new(SessionSlot::default());
        let guard = slot.try_acquire().unwrap();
        assert!(slot.is_busy());
        assert!(slot.try_acquire().is_none());
        drop(guard);
        assert!(!slot.is_busy());
        assert!(slot.try_acquire().is_some());
    }

    #[test]
    fn cancel_reaches_running_session_only() {
        let slot = Arc::new(SessionSlot::default());
        let handle = CancelHandle::new(Arc::clone(&slot));
        assert!(!handle.cancel());

        let guard = slot.try_acquire().unwrap();
        assert!(handle.cancel());
        assert!(guard.token().is_cancelled());
        drop(guard);

        // A fresh session starts with a fresh token.
        let guard = slot.try_acquire().unwrap();
        assert!(!guard.token().is_cancelled());
    }

    #[test]
    fn busy_slot_always_has_a_token_to_cancel() {
        use std::sync::atomic::AtomicUsize;
        const ROUNDS: usize = 200;

        let slot = Arc::new(SessionSlot::default());
        let handle = CancelHandle::new(Arc::clone(&slot));
        let dropped = Arc::new(AtomicUsize::new(0));
        let worker = {
            let slot = Arc::clone(&slot);
            let dropped = Arc::clone(&dropped);
            std::thread::spawn(move || {
                for _ in 0..ROUNDS {
                    let guard = slot.try_acquire().unwrap();
                    while !guard.token().is_cancelled() {
                        std::thread::yield_now();
                    }
                    drop(guard);
                    dropped.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        for round in 0..ROUNDS {
            while !handle.is_processing() {
                std::thread::yield_now();
            }
            // The guard lives until cancelled, so a busy slot must already
            // hold its token.
            assert!(handle.cancel(), "round {round}");
            while dropped.load(Ordering::SeqCst) == round {
                std::thread::yield_now();
            }
        }
        worker.join().unwrap();
        assert!(!handle.is_processing());
    }

    #[test]
    fn progress_never_decreases() {
        let (tx, rx) = watch::channel(Progress::default());
        let mut reporter = ProgressReporter::new(Arc::new(tx), Arc::new(NullNotifier));
        reporter.report(40.0, "a");
        reporter.report(20.0, "b");
        assert_eq!(reporter.percent(), 40.0);
        assert_eq!(rx.borrow().message, "b");
        assert_eq!(rx.borrow().percent, 40.0);
    }

    #[test]
    fn page_percent_spans_ten_to_ninety() {
        assert_eq!(page_percent(0, 9), 10.0);
        assert_eq!(page_percent(9, 9), 90.0);
    }
}
