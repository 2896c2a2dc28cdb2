use thiserror::Error;

/// Errors surfaced by gateway fetches and view renders.
///
/// Nothing here is fatal to the session: the controller logs the error and
/// leaves the affected container blank or stale.
#[derive(Debug, Error)]
pub enum DashError {
    /// Transport failure or non-2xx status from the backend.
    #[error("network error on /{endpoint}: {message}")]
    Network {
        endpoint: &'static str,
        message: String,
    },

    /// A response arrived but a required field is missing or the wrong shape.
    #[error("malformed response: missing or invalid field `{field}`")]
    DataShape { field: String },

    /// Input too degenerate to chart.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}

impl DashError {
    pub fn shape(field: impl Into<String>) -> Self {
        DashError::DataShape {
            field: field.into(),
        }
    }

    pub fn degenerate(message: impl Into<String>) -> Self {
        DashError::DegenerateInput(message.into())
    }

    /// Short tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DashError::Network { .. } => "network",
            DashError::DataShape { .. } => "data_shape",
            DashError::DegenerateInput(_) => "degenerate_input",
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, DashError>;
