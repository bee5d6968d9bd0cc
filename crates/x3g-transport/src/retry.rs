//! Exact-count transfer loops over `std::io` primitives.
//!
//! Transient failures (see [`crate::classify`]) are absorbed here and never
//! surface to callers. Every other failure is returned immediately.

use std::io::{Read, Write};

use tracing::trace;

use crate::classify::{classify, ErrorClass};
use crate::error::{Result, TransportError};

/// Scratch buffer size used to discard bytes beyond a destination's capacity.
pub const DRAIN_CHUNK_SIZE: usize = 1024;

/// Fill `buf` completely unless end-of-file intervenes.
///
/// Returns the number of bytes read. A value smaller than `buf.len()` means
/// the channel reported end-of-file.
pub fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if classify(&err) == ErrorClass::Retry => {
                trace!(error = %err, "retrying read after transient error");
            }
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    Ok(filled)
}

/// Consume `nbytes` from the channel, retaining at most `buf.len()` of them.
///
/// Bytes past `buf.len()` are read through a [`DRAIN_CHUNK_SIZE`] scratch
/// buffer and dropped so the channel stays aligned. Returns the total number
/// of bytes consumed, retained or not; it is less than `nbytes` only on
/// end-of-file.
pub fn read_bounded<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    nbytes: usize,
) -> Result<usize> {
    if nbytes == 0 {
        return Ok(0);
    }

    let keep = nbytes.min(buf.len());
    let mut consumed = read_full(reader, &mut buf[..keep])?;
    if consumed < keep || keep == nbytes {
        return Ok(consumed);
    }

    let mut scratch = [0u8; DRAIN_CHUNK_SIZE];
    let mut remaining = nbytes - keep;
    while remaining > 0 {
        let chunk = remaining.min(DRAIN_CHUNK_SIZE);
        let n = read_full(reader, &mut scratch[..chunk])?;
        consumed += n;
        remaining -= n;
        if n < chunk {
            break;
        }
    }
    trace!(kept = keep, dropped = consumed - keep, "drained bytes past capacity");
    Ok(consumed)
}

/// Write all of `buf`, retrying transient and would-block failures.
///
/// Returns `buf.len()` on success.
pub fn write_full<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<usize> {
    let mut offset = 0usize;
    while offset < buf.len() {
        match writer.write(&buf[offset..]) {
            Ok(0) => {
                return Err(TransportError::WriteZero {
                    remaining: buf.len() - offset,
                })
            }
            Ok(n) => offset += n,
            Err(err) if classify(&err) != ErrorClass::Permanent => {
                trace!(error = %err, "retrying write after transient error");
            }
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
    flush_full(writer)?;
    Ok(offset)
}

/// Flush the writer, retrying transient and would-block failures.
pub fn flush_full<W: Write + ?Sized>(writer: &mut W) -> Result<()> {
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if classify(&err) != ErrorClass::Permanent => continue,
            Err(err) => return Err(TransportError::Io(err)),
        }
    }
}
