//! Transient-error classification.
//!
//! Which OS codes count as transient is platform specific. Interruption and
//! temporary resource exhaustion are always treated as retryable.

use std::io::{self, ErrorKind};

/// How a failed I/O attempt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Re-attempt immediately (interrupted, transient resource exhaustion).
    Retry,
    /// Non-blocking channel has no data or room right now.
    WouldBlock,
    /// Anything else. The operation has failed.
    Permanent,
}

/// Classify a raw OS error code.
#[cfg(unix)]
pub fn classify_os_error(code: i32) -> ErrorClass {
    if code == libc::EINTR || code == libc::ENOMEM || code == libc::ENOBUFS {
        return ErrorClass::Retry;
    }
    #[cfg(any(target_os = "linux", target_os = "android"))]
    if code == libc::ENOSR {
        return ErrorClass::Retry;
    }
    // EWOULDBLOCK aliases EAGAIN on most platforms but not all.
    if code == libc::EAGAIN || code == libc::EWOULDBLOCK {
        return ErrorClass::WouldBlock;
    }
    ErrorClass::Permanent
}

/// Classify a raw OS error code.
///
/// Without a platform errno table the code itself is not interpreted;
/// [`classify`] falls back to the portable [`ErrorKind`].
#[cfg(not(unix))]
pub fn classify_os_error(_code: i32) -> ErrorClass {
    ErrorClass::Permanent
}

/// Classify an I/O error, preferring the OS code and falling back to its kind.
pub fn classify(err: &io::Error) -> ErrorClass {
    if let Some(code) = err.raw_os_error() {
        let class = classify_os_error(code);
        if class != ErrorClass::Permanent {
            return class;
        }
    }
    match err.kind() {
        ErrorKind::Interrupted | ErrorKind::OutOfMemory => ErrorClass::Retry,
        ErrorKind::WouldBlock => ErrorClass::WouldBlock,
        _ => ErrorClass::Permanent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interrupted_kind_is_retry() {
        let err = io::Error::from(ErrorKind::Interrupted);
        assert_eq!(classify(&err), ErrorClass::Retry);
    }

    #[test]
    fn would_block_kind_is_would_block() {
        let err = io::Error::from(ErrorKind::WouldBlock);
        assert_eq!(classify(&err), ErrorClass::WouldBlock);
    }

    #[test]
    fn other_kinds_are_permanent() {
        for kind in [
            ErrorKind::NotFound,
            ErrorKind::PermissionDenied,
            ErrorKind::BrokenPipe,
            ErrorKind::UnexpectedEof,
        ] {
            assert_eq!(classify(&io::Error::from(kind)), ErrorClass::Permanent);
        }
    }

    #[test]
    #[cfg(unix)]
    fn unix_codes() {
        assert_eq!(classify_os_error(libc::EINTR), ErrorClass::Retry);
        assert_eq!(classify_os_error(libc::ENOMEM), ErrorClass::Retry);
        assert_eq!(classify_os_error(libc::ENOBUFS), ErrorClass::Retry);
        assert_eq!(classify_os_error(libc::EAGAIN), ErrorClass::WouldBlock);
        assert_eq!(classify_os_error(libc::EWOULDBLOCK), ErrorClass::WouldBlock);
        assert_eq!(classify_os_error(libc::EBADF), ErrorClass::Permanent);
        assert_eq!(classify_os_error(libc::EIO), ErrorClass::Permanent);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn linux_stream_resource_is_retry() {
        assert_eq!(classify_os_error(libc::ENOSR), ErrorClass::Retry);
    }

    #[test]
    #[cfg(unix)]
    fn raw_os_error_takes_precedence() {
        let err = io::Error::from_raw_os_error(libc::ENOBUFS);
        assert_eq!(classify(&err), ErrorClass::Retry);
        let err = io::Error::from_raw_os_error(libc::EPIPE);
        assert_eq!(classify(&err), ErrorClass::Permanent);
    }
}
