//! Retry-safe byte transport for s3g/x3g command streams.
//!
//! Provides the plumbing the command codec sits on:
//! - Classification of OS-level I/O errors into retry / would-block / permanent
//! - Exact-count reads and writes that absorb transient failures
//! - A [`Context`] bundling one read capability and any number of write
//!   capabilities (fan-out)
//!
//! This is the lowest layer of x3g. Everything else builds on top of the
//! [`Context`] type provided here.

pub mod classify;
pub mod context;
pub mod error;
pub mod io;
pub mod retry;
pub mod stdio;
pub mod traits;

pub use classify::{classify, classify_os_error, ErrorClass};
pub use context::{Context, OpenConfig, TransportKind};
pub use error::{Result, TransportError};
pub use io::{IoReader, IoWriter};
pub use retry::DRAIN_CHUNK_SIZE;
pub use stdio::{StdioHandle, StdioTransport};
pub use traits::{ByteReader, ByteWriter};
