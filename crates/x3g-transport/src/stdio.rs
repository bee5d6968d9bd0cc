use std::fs::{File, OpenOptions};
use std::io::{self, Read, Stdin, Stdout, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::retry::{read_bounded, write_full};
use crate::traits::{ByteReader, ByteWriter};

/// The OS-level handle behind a [`StdioTransport`].
#[derive(Debug)]
pub enum StdioHandle {
    File(File),
    Stdin(Stdin),
    Stdout(Stdout),
}

impl StdioHandle {
    fn name(&self) -> &'static str {
        match self {
            StdioHandle::File(_) => "file",
            StdioHandle::Stdin(_) => "stdin",
            StdioHandle::Stdout(_) => "stdout",
        }
    }

    /// Release the handle. The process's standard streams are flushed but
    /// left open.
    fn close(self) -> io::Result<()> {
        match self {
            StdioHandle::File(file) => close_file(file),
            StdioHandle::Stdin(_) => Ok(()),
            StdioHandle::Stdout(mut out) => out.flush(),
        }
    }
}

impl Read for StdioHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            StdioHandle::File(file) => file.read(buf),
            StdioHandle::Stdin(stdin) => stdin.read(buf),
            StdioHandle::Stdout(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdout is not readable",
            )),
        }
    }
}

impl Write for StdioHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            StdioHandle::File(file) => file.write(buf),
            StdioHandle::Stdout(out) => out.write(buf),
            StdioHandle::Stdin(_) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "stdin is not writable",
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            StdioHandle::File(file) => file.flush(),
            StdioHandle::Stdout(out) => out.flush(),
            StdioHandle::Stdin(_) => Ok(()),
        }
    }
}

#[cfg(unix)]
fn close_file(file: File) -> io::Result<()> {
    use std::os::fd::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: `fd` was released by `File` above and is owned solely here, so
    // it is closed exactly once.
    let rc = unsafe { libc::close(fd) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

/// File and standard-stream transport.
///
/// Owns one OS handle plus running transfer counts. The handle is released
/// exactly once; any I/O after that fails with [`TransportError::BadHandle`].
#[derive(Debug)]
pub struct StdioTransport {
    handle: Option<StdioHandle>,
    nread: u64,
    nwritten: u64,
}

impl StdioTransport {
    /// Default permission mode for created files.
    pub const DEFAULT_MODE: u32 = 0o644;

    /// Wrap an already open handle.
    pub fn from_handle(handle: StdioHandle) -> Self {
        Self {
            handle: Some(handle),
            nread: 0,
            nwritten: 0,
        }
    }

    /// Open `source` for reading, or create it for writing.
    ///
    /// An absent `source` selects stdin when reading and stdout when
    /// creating. `mode` is the permission mask for a created file and is
    /// only honored on Unix. An existing file is truncated on create.
    pub fn open(source: Option<&Path>, create: bool, mode: u32) -> Result<Self> {
        let handle = match source {
            None if create => StdioHandle::Stdout(io::stdout()),
            None => StdioHandle::Stdin(io::stdin()),
            Some(path) => {
                let mut options = OpenOptions::new();
                if create {
                    options.write(true).create(true).truncate(true);
                    #[cfg(unix)]
                    {
                        use std::os::unix::fs::OpenOptionsExt;
                        options.mode(mode);
                    }
                } else {
                    options.read(true);
                }
                let file = options.open(path).map_err(|source| TransportError::Open {
                    path: path.to_path_buf(),
                    source,
                })?;
                StdioHandle::File(file)
            }
        };
        #[cfg(not(unix))]
        let _ = mode;

        debug!(?source, create, handle = handle.name(), "opened stdio transport");
        Ok(Self::from_handle(handle))
    }

    /// Whether the handle is still held.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Release the handle. A second call fails with
    /// [`TransportError::BadHandle`].
    pub fn close(&mut self) -> Result<()> {
        let handle = self.handle.take().ok_or(TransportError::BadHandle)?;
        let name = handle.name();
        handle.close().map_err(|err| {
            warn!(handle = name, error = %err, "close failed");
            TransportError::Io(err)
        })?;
        debug!(
            handle = name,
            nread = self.nread,
            nwritten = self.nwritten,
            "closed stdio transport"
        );
        Ok(())
    }

    fn handle_mut(&mut self) -> Result<&mut StdioHandle> {
        self.handle.as_mut().ok_or(TransportError::BadHandle)
    }
}

impl ByteReader for StdioTransport {
    fn read(&mut self, buf: &mut [u8], nbytes: usize) -> Result<usize> {
        let n = read_bounded(self.handle_mut()?, buf, nbytes)?;
        self.nread += n as u64;
        Ok(n)
    }

    fn bytes_read(&self) -> u64 {
        self.nread
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        StdioTransport::close(&mut self)
    }
}

impl ByteWriter for StdioTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let n = write_full(self.handle_mut()?, buf)?;
        self.nwritten += n as u64;
        Ok(n)
    }

    fn bytes_written(&self) -> u64 {
        self.nwritten
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        StdioTransport::close(&mut self)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "x3g-stdio-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn create_write_then_read_back() {
        let dir = unique_temp_dir("roundtrip");
        let path = dir.join("out.x3g");

        let mut writer = StdioTransport::open(Some(&path), true, 0o644).unwrap();
        assert_eq!(ByteWriter::write(&mut writer, b"\x86\x01").unwrap(), 2);
        assert_eq!(writer.bytes_written(), 2);
        ByteWriter::close(Box::new(writer)).unwrap();

        let mut reader = StdioTransport::open(Some(&path), false, 0).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(ByteReader::read(&mut reader, &mut buf, 4).unwrap(), 2);
        assert_eq!(&buf[..2], b"\x86\x01");
        assert_eq!(reader.bytes_read(), 2);
        ByteReader::close(Box::new(reader)).unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = unique_temp_dir("truncate");
        let path = dir.join("out.x3g");
        std::fs::write(&path, b"previous contents").unwrap();

        let mut writer = StdioTransport::open(Some(&path), true, 0o644).unwrap();
        ByteWriter::write(&mut writer, b"new").unwrap();
        ByteWriter::close(Box::new(writer)).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(unix)]
    fn create_applies_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = unique_temp_dir("mode");
        let path = dir.join("private.x3g");

        let writer = StdioTransport::open(Some(&path), true, 0o600).unwrap();
        ByteWriter::close(Box::new(writer)).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn open_missing_file_reports_path() {
        let dir = unique_temp_dir("missing");
        let path = dir.join("absent.s3g");

        let err = StdioTransport::open(Some(&path), false, 0).unwrap_err();
        assert!(matches!(&err, TransportError::Open { path: p, .. } if p == &path));
        assert!(err.raw_os_error().is_some());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn io_after_close_is_bad_handle() {
        let dir = unique_temp_dir("closed");
        let path = dir.join("closed.x3g");
        std::fs::write(&path, b"abc").unwrap();

        let mut transport = StdioTransport::open(Some(&path), false, 0).unwrap();
        transport.close().unwrap();
        assert!(!transport.is_open());

        let mut buf = [0u8; 1];
        let err = ByteReader::read(&mut transport, &mut buf, 1).unwrap_err();
        assert!(matches!(err, TransportError::BadHandle));
        assert!(matches!(transport.close(), Err(TransportError::BadHandle)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn stdin_is_not_writable() {
        let mut transport = StdioTransport::from_handle(StdioHandle::Stdin(io::stdin()));
        let err = ByteWriter::write(&mut transport, b"x").unwrap_err();
        assert!(matches!(err, TransportError::Io(e) if e.kind() == io::ErrorKind::Unsupported));
    }
}
