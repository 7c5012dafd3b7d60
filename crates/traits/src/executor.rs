use thiserror::Error;

/// Failure of a unit of work submitted to an offload pool. The job's own
/// result type carries domain errors; this only covers the transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffloadError {
    #[error("offloaded job panicked: {0}")]
    Panicked(String),

    #[error("offload pool dropped the job before it completed")]
    Disconnected,

    #[error("failed to build offload pool: {0}")]
    Build(String),
}

impl OffloadError {
    /// Extracts a readable message from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        OffloadError::Panicked(message)
    }
}
