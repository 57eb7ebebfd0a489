use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the store clients and the chat relay.
#[derive(Debug, Error)]
pub enum Error {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The object was written but could not be made public.
    #[error("set object acl for {key}: {message}")]
    AclError { key: String, message: String },

    #[error("schema mismatch: missing required field {0}")]
    SchemaMismatch(&'static str),

    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    #[error("relay unavailable: {0}")]
    RelayUnavailable(String),

    #[error("{0}")]
    Validation(String),
}

impl Error {
    pub fn store_unavailable(err: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(err.to_string())
    }
}
