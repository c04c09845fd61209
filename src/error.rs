use std::io;
use thiserror::Error;

/// type alias for all operations in this crate that could fail with a [`DictError`]
pub type Result<T> = std::result::Result<T, DictError>;

/// The error variants used throughout the dictionary server.
///
/// The first eight variants mirror the wire-level error taxonomy: each one has
/// a stable numeric code that the server sends to clients as `ERROR:<code>`.
/// The remaining variants wrap lower level errors from third party crates, or
/// carry validation failures from the command line binaries; on the wire they
/// all collapse into the OS failure code.
#[derive(Debug, Error)]
pub enum DictError {
    /// a syscall-level I/O failure while touching the store or the socket
    #[error("os failure: {0}")]
    Os(#[from] io::Error),

    /// the request buffer was empty
    #[error("empty request buffer")]
    NullInput,

    /// the request buffer is shorter than the shortest command keyword
    #[error("request buffer shorter than a command keyword")]
    BufferTooSmall,

    /// the request buffer could not be used (oversized message or bad encoding)
    #[error("unusable request buffer")]
    BufferError,

    /// no known command keyword was found in the request
    #[error("invalid command")]
    InvalidCommand,

    /// the command was recognized but an argument it requires was not supplied
    #[error("missing argument for command")]
    MissingArgument,

    /// more arguments were supplied than any command accepts
    #[error("too many arguments for command")]
    TooManyArguments,

    /// the requested key does not exist in the store
    #[error("key not found")]
    KeyNotFound,

    /// the key index file could not be serialized or deserialized
    #[error("key index error: {0}")]
    Index(#[from] serde_json::Error),

    /// an error reported by the sled storage engine
    #[error("sled engine error: {0}")]
    Sled(#[from] sled::Error),

    /// a command line parameter failed validation
    #[error("{0}")]
    Parsing(String),
}

impl DictError {
    /// The numeric code sent to clients in an `ERROR:<code>` response.
    ///
    /// Codes are part of the wire protocol and must stay stable. Variants
    /// without a code of their own report as an OS failure.
    pub fn wire_code(&self) -> u8 {
        match self {
            DictError::Os(_) => 1,
            DictError::NullInput => 2,
            DictError::BufferTooSmall => 3,
            DictError::BufferError => 4,
            DictError::InvalidCommand => 5,
            DictError::MissingArgument => 6,
            DictError::TooManyArguments => 7,
            DictError::KeyNotFound => 8,
            _ => 1,
        }
    }
}
