//! Rayon-backed offload pool.
//!
//! Uses a dedicated pool rather than rayon's global one so the offload
//! thread count is configurable per pipeline.

use crate::{Offload, OffloadError};
use log::debug;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RayonOffload {
    pool: Arc<rayon::ThreadPool>,
}

impl RayonOffload {
    pub fn new(threads: usize) -> Result<Self, OffloadError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("ticketpress-offload-{}", i))
            .build()
            .map_err(|e| OffloadError::Build(e.to_string()))?;
        debug!("Built offload pool with {} threads", pool.current_num_threads());
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

impl Offload for RayonOffload {
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }

    fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn name(&self) -> &'static str {
        "RayonOffload"
    }
}
