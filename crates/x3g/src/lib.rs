//! Codec and transport for s3g/x3g motion-control command streams.
//!
//! x3g reads tagged binary command records from a file or standard stream,
//! decodes them into typed records, and re-encodes them to one or more sinks.
//!
//! # Crate Structure
//!
//! - [`transport`]: Retry-safe byte transports and the fan-out context
//! - [`codec`]: Command metadata, typed records, command reader and writer

/// Re-export transport types.
pub mod transport {
    pub use x3g_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use x3g_codec::*;
}
