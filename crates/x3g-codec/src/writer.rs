use std::path::Path;

use bytes::BytesMut;
use tracing::trace;
use x3g_transport::{ByteWriter, Context, TransportKind};

use crate::codec::{encode_record, Command, MAX_RECORD_SIZE};
use crate::error::{CodecError, Result};
use crate::record::Record;

/// Encodes commands and broadcasts them to every write capability of a
/// transport context.
#[derive(Debug)]
pub struct CommandWriter {
    ctx: Context,
    buf: BytesMut,
    commands_written: u64,
}

impl CommandWriter {
    /// Wrap a context with at least one write capability.
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            buf: BytesMut::with_capacity(MAX_RECORD_SIZE),
            commands_written: 0,
        }
    }

    /// Create `dest` for writing with permission `mode`; `None` writes stdout.
    pub fn create(dest: Option<&Path>, mode: u32) -> Result<Self> {
        let ctx = Context::open(TransportKind::Stdio, dest, true, mode)?;
        Ok(Self::new(ctx))
    }

    /// Register another destination. Later writes reach it after every
    /// destination registered before it.
    pub fn add_writer(&mut self, writer: impl ByteWriter + 'static) {
        self.ctx.add_writer(writer);
    }

    /// Encode `cmd` from its record and write it to every destination.
    ///
    /// Stops at the first destination that fails; earlier destinations keep
    /// the bytes they already received.
    pub fn write_command(&mut self, cmd: &Command) -> Result<()> {
        self.write_record(cmd.record())
    }

    /// Encode `record` and write it to every destination.
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.buf.clear();
        encode_record(record, &mut self.buf)?;
        self.ctx.write_all(&self.buf)?;
        self.commands_written += 1;
        trace!(tag = record.tag(), len = self.buf.len(), "wrote command");
        Ok(())
    }

    pub fn commands_written(&self) -> u64 {
        self.commands_written
    }

    /// Bytes accepted by each destination, in registration order.
    pub fn bytes_written(&self) -> Vec<u64> {
        self.ctx.bytes_written()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Consume the writer and return its context.
    pub fn into_context(self) -> Context {
        self.ctx
    }

    /// Close every destination; see [`Context::close`].
    pub fn close(self) -> Result<()> {
        self.ctx.close().map_err(CodecError::from)
    }
}
