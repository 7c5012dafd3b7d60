use crate::Offload;

/// Runs every job immediately on the calling thread.
///
/// Useful in tests and on single-core hosts; the awaiting task is blocked for
/// the duration of the job.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineOffload;

impl Offload for InlineOffload {
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        job()
    }

    fn parallelism(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "InlineOffload"
    }
}
