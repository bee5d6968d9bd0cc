use crate::error::Result;

/// A read capability: a driver state plus its read and close operations.
///
/// Implementations must absorb transient errors and only return short
/// counts on end-of-file.
pub trait ByteReader {
    /// Consume `nbytes` from the channel, storing at most `buf.len()` of them.
    ///
    /// Returns the number of bytes consumed. Anything less than `nbytes`
    /// means end-of-file was reached first.
    fn read(&mut self, buf: &mut [u8], nbytes: usize) -> Result<usize>;

    /// Running total of bytes consumed, including drained bytes.
    fn bytes_read(&self) -> u64;

    /// Release the driver state. The state is freed even if closing fails.
    fn close(self: Box<Self>) -> Result<()>;
}

/// A write capability: a driver state plus its write and close operations.
pub trait ByteWriter {
    /// Write all of `buf`. Returns `buf.len()` on success.
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Running total of bytes accepted by the channel.
    fn bytes_written(&self) -> u64;

    /// Release the driver state. The state is freed even if closing fails.
    fn close(self: Box<Self>) -> Result<()>;
}
