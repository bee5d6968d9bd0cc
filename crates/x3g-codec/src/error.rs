use x3g_transport::TransportError;

/// Errors that can occur while reading or writing commands.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The stream ended partway through a command.
    #[error("command {tag} truncated (expected {expected} bytes, got {got})")]
    Truncated { tag: u8, expected: usize, got: usize },

    /// The command would exceed the maximum record size.
    #[error("command {tag} too large ({len} bytes, max {max})")]
    RecordTooLarge { tag: u8, len: usize, max: usize },

    /// A tag with no command definition was found while decoding a buffer.
    #[error("unrecognized command {tag}")]
    Unrecognized { tag: u8 },

    /// A buffer did not hold exactly one well-formed command.
    #[error("invalid command: {0}")]
    InvalidRecord(String),

    /// A previous read failed; the stream position is no longer trustworthy.
    #[error("reader halted after an earlier error")]
    Halted,
}

impl CodecError {
    /// OS error code, if the failure came from the transport.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            CodecError::Transport(err) => err.raw_os_error(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn transport_errors_keep_os_code() {
        let err = CodecError::from(TransportError::Io(io::Error::from_raw_os_error(28)));
        assert_eq!(err.raw_os_error(), Some(28));
        assert_eq!(CodecError::Halted.raw_os_error(), None);
    }

    #[test]
    fn messages_name_the_tag() {
        let err = CodecError::Truncated {
            tag: 133,
            expected: 4,
            got: 1,
        };
        assert_eq!(err.to_string(), "command 133 truncated (expected 4 bytes, got 1)");
    }
}
