/// Errors that can happen within the gcsbench-client
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Any error emitted from the underlying [`reqwest`] client.
    ///
    /// Transport failures (connection, DNS, TLS) are propagated unchanged and
    /// are terminal for the current operation.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// Errors encountered when obtaining credentials from GCP.
    #[error("GCP authentication error: {0}")]
    Auth(#[from] gcp_auth::Error),
    /// The service broke the upload protocol: an unexpected HTTP status, a
    /// missing expected header, or a malformed response body.
    #[error("protocol error: {message}")]
    Protocol {
        /// What the service sent, including the offending status or header.
        message: String,
    },
    /// A chunk was rejected before any network call was made.
    ///
    /// Non-final chunks must be non-empty multiples of
    /// [`MIN_CHUNK_SIZE`](crate::MIN_CHUNK_SIZE); only the final chunk may be
    /// empty.
    #[error("invalid chunk: {message}")]
    InvalidChunk {
        /// Why the chunk was rejected.
        message: String,
    },
    /// Error when URL manipulation fails.
    #[error("{message}")]
    InvalidUrl {
        /// The URL error message.
        message: String,
    },
}

impl Error {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_chunk(message: impl Into<String>) -> Self {
        Self::InvalidChunk {
            message: message.into(),
        }
    }
}

/// A convenience alias that defaults our [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;
