//! Error types for the aggregation engine.

use std::sync::Arc;

/// The main error type for the aggregation engine.
///
/// `Error` is `Clone` so a request can hand out the same cached failure on
/// every read after a failed materialization.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A request or plan was used in a way its contract forbids
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// An aggregate with no neutral value was read over zero elements
    #[error("Sequence contains no elements")]
    EmptySequence,

    /// A user-supplied callback (selector, comparer, folder) failed
    #[error("Callback error: {0}")]
    Callback(#[source] Arc<dyn std::error::Error + Send + Sync>),

    /// A custom error with a message
    #[error("{0}")]
    Custom(String),
}

// Convenience constructors
impl Error {
    /// Create a contract violation error with a message
    pub fn contract<S: Into<String>>(message: S) -> Self {
        Error::ContractViolation(message.into())
    }

    /// Create a callback error from any error type
    pub fn callback<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Error::Callback(Arc::new(error))
    }

    /// Create a custom error with a message
    pub fn custom<S: Into<String>>(message: S) -> Self {
        Error::Custom(message.into())
    }

    /// Returns true for [`Error::EmptySequence`]
    pub fn is_empty_sequence(&self) -> bool {
        matches!(self, Error::EmptySequence)
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Error {
    fn from(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Error::Callback(Arc::from(e))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Custom(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Custom(s.to_string())
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Helper trait for converting foreign errors into our Error type
pub trait IntoError<T> {
    fn into_callback_error(self) -> Result<T>;
}

impl<T, E> IntoError<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn into_callback_error(self) -> Result<T> {
        self.map_err(Error::callback)
    }
}
