//! Capabilities over arbitrary `std::io` streams.

use std::io::{Read, Write};

use crate::error::Result;
use crate::retry::{flush_full, read_bounded, write_full};
use crate::traits::{ByteReader, ByteWriter};

/// Read capability over any [`Read`] implementation.
#[derive(Debug)]
pub struct IoReader<R> {
    inner: R,
    nread: u64,
}

impl<R: Read> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, nread: 0 }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

impl<R: Read> ByteReader for IoReader<R> {
    fn read(&mut self, buf: &mut [u8], nbytes: usize) -> Result<usize> {
        let n = read_bounded(&mut self.inner, buf, nbytes)?;
        self.nread += n as u64;
        Ok(n)
    }

    fn bytes_read(&self) -> u64 {
        self.nread
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Write capability over any [`Write`] implementation.
///
/// Closing flushes the stream and then drops it.
#[derive(Debug)]
pub struct IoWriter<W> {
    inner: W,
    nwritten: u64,
}

impl<W: Write> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, nwritten: 0 }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}

impl<W: Write> ByteWriter for IoWriter<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let n = write_full(&mut self.inner, buf)?;
        self.nwritten += n as u64;
        Ok(n)
    }

    fn bytes_written(&self) -> u64 {
        self.nwritten
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        flush_full(&mut self.inner)
    }
}
