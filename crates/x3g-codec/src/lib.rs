//! Binary command codec for s3g/x3g motion-control streams.
//!
//! A stream is a plain concatenation of records. Each record is:
//! - A 1-byte command tag
//! - The tag's payload fields, little-endian, packed in declaration order
//! - For text and tool commands, a count byte followed by that many bytes
//!
//! No record exceeds [`MAX_RECORD_SIZE`] bytes. Reads go through a
//! [`x3g_transport::Context`], so partial reads and transient errors never
//! reach the caller.

pub mod codec;
pub mod command;
pub mod error;
pub mod reader;
pub mod record;
pub mod tags;
pub mod writer;

pub use codec::{decode_command, encode_record, Command, MAX_RECORD_SIZE};
pub use command::{commands, is_blocking, lookup, CommandInfo, Length};
pub use error::{CodecError, Result};
pub use reader::{CommandReader, RawRead, ReadOutcome, SkippedCommand};
pub use record::{QueuePoint, QueuePointKind, Record, ToolCommand};
pub use writer::CommandWriter;
