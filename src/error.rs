use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Every way a hash or verify call can fail.
///
/// None of these reach the host as a fault: the `udf` adapter turns all of
/// them into a SQL `NULL`.
#[derive(Debug, Error)]
pub enum Error {
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error("input too large: {0}")]
    OversizeInput(&'static str),

    #[error("input contains a NUL byte: {0}")]
    EmbeddedNullByte(&'static str),

    #[error("entropy source unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("bcrypt primitive failed: {0}")]
    PrimitiveFailure(String),
}

impl Error {
    /// Attaches the name of the offending argument to a buffer copy failure.
    pub(crate) fn from_copy(err: crate::crypto::CopyError, what: &'static str) -> Self {
        use crate::crypto::CopyError;

        match err {
            CopyError::TooLarge => Error::OversizeInput(what),
            CopyError::NullByte => Error::EmbeddedNullByte(what),
            CopyError::InvalidArgs => Error::MissingInput(what),
        }
    }
}
