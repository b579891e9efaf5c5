/// Result alias for observer operations
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that stop the observer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The event source failed
    #[error("event source error: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The local tree rejected an insertion
    #[error("accumulator error: {0}")]
    Accumulator(#[from] accumulator::Error),
}

impl Error {
    pub(crate) fn from_source<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Source(Box::new(error))
    }
}
