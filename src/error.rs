use uuid::Uuid;

/// Failures from the data API and document storage.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid name '{0}'")]
    InvalidName(String),

    #[error("'{0}' already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    Import(String),
}

/// Rejected time-tracking transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackingError {
    #[error("Timer is already running")]
    AlreadyRunning,

    #[error("Timer is not running")]
    NotRunning,

    #[error("Timer is not paused")]
    NotPaused,

    #[error("Session {0} not found")]
    SessionNotFound(Uuid),

    #[error("Session is still open; pause the timer before editing it")]
    SessionOpen,

    #[error("Cannot deduct {requested_ms} ms from a session holding {available_ms} ms")]
    Underflow { requested_ms: u64, available_ms: u64 },
}
