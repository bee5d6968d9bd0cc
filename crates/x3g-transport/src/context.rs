use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::stdio::StdioTransport;
use crate::traits::{ByteReader, ByteWriter};

/// Transport families that [`Context::open`] can select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportKind {
    /// A named file, or stdin/stdout when no source is given.
    #[default]
    Stdio,
}

/// Parameters for [`Context::open`].
#[derive(Debug, Clone)]
pub struct OpenConfig {
    /// Transport family.
    pub kind: TransportKind,
    /// Path to open. `None` means stdin (reading) or stdout (creating).
    pub source: Option<PathBuf>,
    /// Create for writing instead of opening read-only.
    pub create: bool,
    /// Permission mask used when creating. Default: `0o644`.
    pub mode: u32,
}

impl OpenConfig {
    /// Read-only open of `source`.
    pub fn read(source: Option<impl Into<PathBuf>>) -> Self {
        Self {
            source: source.map(Into::into),
            ..Self::default()
        }
    }

    /// Create-for-write open of `source`.
    pub fn create(source: Option<impl Into<PathBuf>>) -> Self {
        Self {
            source: source.map(Into::into),
            create: true,
            ..Self::default()
        }
    }

    /// Override the permission mask.
    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for OpenConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Stdio,
            source: None,
            create: false,
            mode: StdioTransport::DEFAULT_MODE,
        }
    }
}

/// An open stream: one optional read capability and an ordered list of write
/// capabilities.
///
/// Every write is broadcast to all write capabilities in registration order.
/// Each capability's driver state is owned here and released by
/// [`Context::close`]; dropping a context without closing releases them
/// without reporting close errors.
pub struct Context {
    reader: Option<Box<dyn ByteReader>>,
    writers: Vec<Box<dyn ByteWriter>>,
}

impl Context {
    /// Open a transport of `kind` on `source`.
    ///
    /// When `create` is false the context can only read; otherwise it starts
    /// with exactly one write capability and no read capability.
    pub fn open(
        kind: TransportKind,
        source: Option<&Path>,
        create: bool,
        mode: u32,
    ) -> Result<Self> {
        match kind {
            TransportKind::Stdio => {
                let transport = StdioTransport::open(source, create, mode)?;
                if create {
                    Ok(Self::from_writer(transport))
                } else {
                    Ok(Self::from_reader(transport))
                }
            }
        }
    }

    /// Open using an [`OpenConfig`].
    pub fn open_with(config: &OpenConfig) -> Result<Self> {
        Self::open(
            config.kind,
            config.source.as_deref(),
            config.create,
            config.mode,
        )
    }

    /// Context reading from `reader`, with no write capability.
    pub fn from_reader(reader: impl ByteReader + 'static) -> Self {
        Self {
            reader: Some(Box::new(reader)),
            writers: Vec::new(),
        }
    }

    /// Context writing to `writer` as its primary write capability.
    pub fn from_writer(writer: impl ByteWriter + 'static) -> Self {
        Self {
            reader: None,
            writers: vec![Box::new(writer)],
        }
    }

    /// Register an additional write capability.
    ///
    /// Subsequent writes reach it after every capability registered before it.
    pub fn add_writer(&mut self, writer: impl ByteWriter + 'static) {
        self.add_boxed_writer(Box::new(writer));
    }

    /// Register an already boxed write capability.
    pub fn add_boxed_writer(&mut self, writer: Box<dyn ByteWriter>) {
        self.writers.push(writer);
        debug!(writers = self.writers.len(), "registered write capability");
    }

    /// Whether the context has a read capability.
    pub fn is_readable(&self) -> bool {
        self.reader.is_some()
    }

    /// Number of registered write capabilities.
    pub fn writer_count(&self) -> usize {
        self.writers.len()
    }

    /// Consume `nbytes`, retaining at most `buf.len()`; see [`ByteReader::read`].
    pub fn read(&mut self, buf: &mut [u8], nbytes: usize) -> Result<usize> {
        let reader = self.reader.as_mut().ok_or(TransportError::NoReader)?;
        reader.read(buf, nbytes)
    }

    /// Write `buf` to every write capability in registration order.
    ///
    /// Stops at the first failing capability. Capabilities before it have
    /// already received the bytes; nothing is rolled back.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if self.writers.is_empty() {
            return Err(TransportError::NoWriter);
        }
        for (index, writer) in self.writers.iter_mut().enumerate() {
            let n = writer.write(buf).inspect_err(|err| {
                warn!(writer = index, error = %err, "fan-out write failed");
            })?;
            if n != buf.len() {
                return Err(TransportError::WriteZero {
                    remaining: buf.len() - n,
                });
            }
        }
        Ok(())
    }

    /// Bytes consumed by the read capability so far.
    pub fn bytes_read(&self) -> u64 {
        self.reader.as_ref().map_or(0, |reader| reader.bytes_read())
    }

    /// Bytes accepted so far by each write capability, in registration order.
    pub fn bytes_written(&self) -> Vec<u64> {
        self.writers.iter().map(|writer| writer.bytes_written()).collect()
    }

    /// Close the read capability and every write capability, in order.
    ///
    /// Every capability is released even when an earlier close fails. The
    /// first failure is reported along with the failure count.
    pub fn close(self) -> Result<()> {
        let mut failures = 0usize;
        let mut first = None;

        let readers = self.reader.into_iter().map(|reader| reader.close());
        let writers = self.writers.into_iter().map(|writer| writer.close());
        for result in readers.chain(writers) {
            if let Err(err) = result {
                failures += 1;
                if first.is_none() {
                    first = Some(err);
                }
            }
        }

        match first {
            None => {
                debug!("closed transport context");
                Ok(())
            }
            Some(first) => {
                warn!(failures, error = %first, "transport context closed with errors");
                Err(TransportError::Close {
                    failures,
                    first: Box::new(first),
                })
            }
        }
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("readable", &self.is_readable())
            .field("writers", &self.writers.len())
            .finish()
    }
}
