use std::path::PathBuf;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A call was made with unusable arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The driver handle has already been released.
    #[error("bad handle: transport already released")]
    BadHandle,

    /// Failed to open the requested source or destination.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A permanent I/O error occurred on the underlying channel.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The channel accepted zero bytes for a non-empty write.
    #[error("channel accepted no bytes ({remaining} bytes unwritten)")]
    WriteZero { remaining: usize },

    /// The context has no read capability.
    #[error("context is not open for reading")]
    NoReader,

    /// The context has no write capability.
    #[error("context is not open for writing")]
    NoWriter,

    /// One or more capabilities failed to close. All were still released.
    #[error("{failures} capability close(s) failed; first: {first}")]
    Close {
        failures: usize,
        first: Box<TransportError>,
    },
}

impl TransportError {
    /// The OS error code behind this failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            TransportError::Io(err) | TransportError::Open { source: err, .. } => {
                err.raw_os_error()
            }
            TransportError::Close { first, .. } => first.raw_os_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_os_error_reaches_through_close_aggregate() {
        let err = TransportError::Close {
            failures: 2,
            first: Box::new(TransportError::Io(std::io::Error::from_raw_os_error(9))),
        };
        assert_eq!(err.raw_os_error(), Some(9));
        assert_eq!(TransportError::NoReader.raw_os_error(), None);
    }
}
