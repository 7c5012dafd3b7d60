//! Offload pools for the ticketpress pipeline.
//!
//! Page processing is strictly sequential on one async task, but decoding,
//! painting and JPEG encoding are CPU bound. Each of those runs as a single
//! unit of work on an offload pool and the task awaits its typed result.
//!
//! ## Available pools
//!
//! - [`RayonOffload`]: dedicated rayon thread pool (feature: `rayon`)
//! - [`InlineOffload`]: runs the job on the calling thread
//!
//! ```ignore
//! let offload = OffloadImpl::default();
//! let sum = offload.run(|| (1..=10).sum::<u32>()).await?;
//! ```

mod inline;
#[cfg(feature = "rayon")]
mod rayon_offload;

pub use inline::InlineOffload;
#[cfg(feature = "rayon")]
pub use rayon_offload::RayonOffload;
pub use ticketpress_traits::OffloadError;

use std::panic::{AssertUnwindSafe, catch_unwind};

/// Something that can run a detached job to completion.
pub trait Offload: Send + Sync {
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;

    fn parallelism(&self) -> usize;

    fn name(&self) -> &'static str;
}

/// Holds a concrete pool and delegates to it.
///
/// `Offload::spawn` is generic, so the trait cannot be a trait object; the
/// pipeline stores this enum instead of a `dyn Offload`.
#[derive(Clone, Debug)]
pub enum OffloadImpl {
    Inline(InlineOffload),

    #[cfg(feature = "rayon")]
    Rayon(RayonOffload),
}

impl OffloadImpl {
    /// Builds a rayon pool with `threads` workers, or an inline pool when
    /// `threads` is zero or rayon is disabled.
    pub fn with_threads(threads: usize) -> Result<Self, OffloadError> {
        if threads == 0 {
            return Ok(OffloadImpl::Inline(InlineOffload));
        }
        #[cfg(feature = "rayon")]
        {
            RayonOffload::new(threads).map(OffloadImpl::Rayon)
        }
        #[cfg(not(feature = "rayon"))]
        {
            log::warn!(
                "rayon support not compiled in; ignoring {} offload threads",
                threads
            );
            Ok(OffloadImpl::Inline(InlineOffload))
        }
    }

    /// Runs `job` on the pool and waits for its result without blocking the
    /// async task. A panic inside the job comes back as `OffloadError::Panicked`.
    pub async fn run<T, F>(&self, job: F) -> Result<T, OffloadError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = async_channel::bounded(1);
        let wrapped = move || {
            let outcome = catch_unwind(AssertUnwindSafe(job)).map_err(OffloadError::from_panic);
            // The receiver is gone only if the caller stopped waiting.
            let _ = tx.try_send(outcome);
        };
        self.spawn(wrapped);
        rx.recv().await.map_err(|_| OffloadError::Disconnected)?
    }
}

impl Offload for OffloadImpl {
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        match self {
            OffloadImpl::Inline(pool) => pool.spawn(job),
            #[cfg(feature = "rayon")]
            OffloadImpl::Rayon(pool) => pool.spawn(job),
        }
    }

    fn parallelism(&self) -> usize {
        match self {
            OffloadImpl::Inline(pool) => pool.parallelism(),
            #[cfg(feature = "rayon")]
            OffloadImpl::Rayon(pool) => pool.parallelism(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            OffloadImpl::Inline(pool) => pool.name(),
            #[cfg(feature = "rayon")]
            OffloadImpl::Rayon(pool) => pool.name(),
        }
    }
}

impl Default for OffloadImpl {
    fn default() -> Self {
        #[cfg(feature = "rayon")]
        {
            match RayonOffload::new(rayon::current_num_threads()) {
                Ok(pool) => OffloadImpl::Rayon(pool),
                Err(e) => {
                    log::warn!("Falling back to inline offload: {}", e);
                    OffloadImpl::Inline(InlineOffload)
                }
            }
        }
        #[cfg(not(feature = "rayon"))]
        {
            OffloadImpl::Inline(InlineOffload)
        }
    }
}
