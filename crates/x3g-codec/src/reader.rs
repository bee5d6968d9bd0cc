use std::path::Path;

use tracing::{trace, warn};
use x3g_transport::{Context, TransportKind};

use crate::codec::{check_size, Command, MAX_RECORD_SIZE};
use crate::command::{lookup, CommandInfo, Length};
use crate::error::{CodecError, Result};

/// Result of one successful read attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    /// A complete command was consumed.
    Command(T),
    /// The stream ended cleanly at a command boundary.
    EndOfStream,
    /// The tag has no definition. The reader is halted afterwards because
    /// the payload length cannot be known.
    Unrecognized { tag: u8 },
}

impl<T> ReadOutcome<T> {
    /// The command, if one was read.
    pub fn command(self) -> Option<T> {
        match self {
            ReadOutcome::Command(cmd) => Some(cmd),
            _ => None,
        }
    }
}

/// A command that was consumed without decoding its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedCommand {
    pub tag: u8,
    pub description: &'static str,
    /// Bytes consumed, tag included.
    pub wire_len: usize,
    pub blocking: bool,
}

/// Result of [`CommandReader::read_command_raw`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawRead {
    pub outcome: ReadOutcome<Command>,
    /// True wire length of the command, even if the caller's buffer was
    /// smaller. Zero at end of stream, one for an unrecognized tag.
    pub raw_len: usize,
}

/// Raw bytes of one command as read from the stream.
struct Frame {
    info: &'static CommandInfo,
    buf: [u8; MAX_RECORD_SIZE],
    len: usize,
}

impl Frame {
    fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Reads commands one at a time from a transport context.
///
/// Any transport error, framing error or unrecognized tag halts the reader:
/// later reads fail with [`CodecError::Halted`] until it is closed and a new
/// one is opened.
#[derive(Debug)]
pub struct CommandReader {
    ctx: Context,
    halted: bool,
    commands_read: u64,
}

impl CommandReader {
    /// Wrap a readable context.
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            halted: false,
            commands_read: 0,
        }
    }

    /// Open `source` for reading; `None` reads stdin.
    pub fn open(source: Option<&Path>) -> Result<Self> {
        let ctx = Context::open(TransportKind::Stdio, source, false, 0)?;
        Ok(Self::new(ctx))
    }

    /// Read and decode the next command.
    pub fn read_command(&mut self) -> Result<ReadOutcome<Command>> {
        match self.next_frame(true)? {
            ReadOutcome::Command(frame) => {
                let cmd = self.decode(&frame)?;
                Ok(ReadOutcome::Command(cmd))
            }
            ReadOutcome::EndOfStream => Ok(ReadOutcome::EndOfStream),
            ReadOutcome::Unrecognized { tag } => Ok(ReadOutcome::Unrecognized { tag }),
        }
    }

    /// Advance past the next command without decoding it.
    ///
    /// Payload bytes not needed to find the command's length are drained
    /// rather than retained.
    pub fn skip_command(&mut self) -> Result<ReadOutcome<SkippedCommand>> {
        Ok(match self.next_frame(false)? {
            ReadOutcome::Command(frame) => ReadOutcome::Command(SkippedCommand {
                tag: frame.info.tag,
                description: frame.info.name,
                wire_len: frame.len,
                blocking: frame.info.blocking,
            }),
            ReadOutcome::EndOfStream => ReadOutcome::EndOfStream,
            ReadOutcome::Unrecognized { tag } => ReadOutcome::Unrecognized { tag },
        })
    }

    /// Like [`read_command`](Self::read_command), and also copy up to
    /// `raw_buf.len()` wire bytes into `raw_buf`.
    pub fn read_command_raw(&mut self, raw_buf: &mut [u8]) -> Result<RawRead> {
        match self.next_frame(true)? {
            ReadOutcome::Command(frame) => {
                let n = frame.len.min(raw_buf.len());
                raw_buf[..n].copy_from_slice(&frame.bytes()[..n]);
                let cmd = self.decode(&frame)?;
                Ok(RawRead {
                    outcome: ReadOutcome::Command(cmd),
                    raw_len: frame.len,
                })
            }
            ReadOutcome::EndOfStream => Ok(RawRead {
                outcome: ReadOutcome::EndOfStream,
                raw_len: 0,
            }),
            ReadOutcome::Unrecognized { tag } => {
                if let Some(first) = raw_buf.first_mut() {
                    *first = tag;
                }
                Ok(RawRead {
                    outcome: ReadOutcome::Unrecognized { tag },
                    raw_len: 1,
                })
            }
        }
    }

    /// Whether an earlier failure has stopped this reader.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Commands consumed so far, decoded or skipped.
    pub fn commands_read(&self) -> u64 {
        self.commands_read
    }

    /// Bytes consumed from the stream so far.
    pub fn bytes_read(&self) -> u64 {
        self.ctx.bytes_read()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Consume the reader and return its context.
    pub fn into_context(self) -> Context {
        self.ctx
    }

    /// Close the underlying context.
    pub fn close(self) -> Result<()> {
        self.ctx.close().map_err(CodecError::from)
    }

    fn decode(&mut self, frame: &Frame) -> Result<Command> {
        Command::from_raw(frame.bytes()).inspect_err(|err| self.halt(err))
    }

    fn halt(&mut self, err: &CodecError) {
        warn!(error = %err, "command stream halted");
        self.halted = true;
    }

    fn next_frame(&mut self, retain: bool) -> Result<ReadOutcome<Frame>> {
        if self.halted {
            return Err(CodecError::Halted);
        }
        match self.read_frame(retain) {
            Ok(ReadOutcome::Unrecognized { tag }) => {
                warn!(tag, offset = self.ctx.bytes_read() - 1, "unrecognized command");
                self.halted = true;
                Ok(ReadOutcome::Unrecognized { tag })
            }
            Ok(outcome) => {
                if let ReadOutcome::Command(frame) = &outcome {
                    self.commands_read += 1;
                    trace!(tag = frame.info.tag, len = frame.len, "read command");
                }
                Ok(outcome)
            }
            Err(err) => {
                self.halt(&err);
                Err(err)
            }
        }
    }

    fn read_frame(&mut self, retain: bool) -> Result<ReadOutcome<Frame>> {
        let mut buf = [0u8; MAX_RECORD_SIZE];
        if self.ctx.read(&mut buf[..1], 1)? == 0 {
            return Ok(ReadOutcome::EndOfStream);
        }
        let tag = buf[0];
        let Some(info) = lookup(tag) else {
            return Ok(ReadOutcome::Unrecognized { tag });
        };

        // For fixed commands the head is the whole payload, so an oversized
        // definition is rejected before anything else is read.
        let head = info.length.head_len();
        check_size(tag, 1 + head)?;
        let head_is_all = matches!(info.length, Length::Fixed(_));
        if retain || !head_is_all {
            self.consume(tag, &mut buf[1..1 + head], head, 0, head)?;
        } else {
            self.consume(tag, &mut [], head, 0, head)?;
        }

        let payload = info.length.payload_len(&buf[1..1 + head]);
        let len = 1 + payload;
        check_size(tag, len)?;
        let rest = payload - head;
        if rest > 0 {
            if retain {
                self.consume(tag, &mut buf[1 + head..len], rest, head, payload)?;
            } else {
                self.consume(tag, &mut [], rest, head, payload)?;
            }
        }

        Ok(ReadOutcome::Command(Frame { info, buf, len }))
    }

    /// Consume exactly `nbytes`, retaining what fits in `dst`.
    fn consume(
        &mut self,
        tag: u8,
        dst: &mut [u8],
        nbytes: usize,
        got: usize,
        expected: usize,
    ) -> Result<()> {
        let n = self.ctx.read(dst, nbytes)?;
        if n < nbytes {
            return Err(CodecError::Truncated {
                tag,
                expected,
                got: got + n,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, ErrorKind, Read};

    use bytes::BytesMut;
    use x3g_transport::{IoReader, TransportError};

    use super::*;
    use crate::codec::encode_record;
    use crate::record::{
        AxesMask, BuildStart, Delay, DisplayMessage, QueuePoint, QueuePointKind, Record,
        SetRgbLed, ToolCommand,
    };
    use crate::tags;

    fn reader_over(bytes: Vec<u8>) -> CommandReader {
        CommandReader::new(Context::from_reader(IoReader::new(Cursor::new(bytes))))
    }

    fn wire(records: &[Record]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        for record in records {
            encode_record(record, &mut buf).unwrap();
        }
        buf.to_vec()
    }

    fn point() -> Record {
        Record::QueuePoint(QueuePoint {
            kind: QueuePointKind::Extended,
            x: 100,
            y: 200,
            z: -300,
            a: 4,
            b: 5,
            rate: 800,
            ..QueuePoint::default()
        })
    }

    #[test]
    fn read_sequence_then_end_of_stream() {
        let records = vec![
            point(),
            Record::Delay(Delay { millis: 250 }),
            Record::DisplayMessage(DisplayMessage {
                options: 1,
                message: b"Heating".to_vec(),
                ..DisplayMessage::default()
            }),
        ];
        let mut reader = reader_over(wire(&records));

        for expected in &records {
            let cmd = reader.read_command().unwrap().command().unwrap();
            assert_eq!(cmd.record(), expected);
            assert_eq!(cmd.raw()[0], expected.tag());
        }
        assert_eq!(reader.read_command().unwrap(), ReadOutcome::EndOfStream);
        assert_eq!(reader.read_command().unwrap(), ReadOutcome::EndOfStream);
        assert!(!reader.is_halted());
        assert_eq!(reader.commands_read(), 3);
        reader.close().unwrap();
    }

    #[test]
    fn empty_stream_is_clean_end() {
        let mut reader = reader_over(Vec::new());
        assert_eq!(reader.read_command().unwrap(), ReadOutcome::EndOfStream);
    }

    #[test]
    fn eof_mid_payload_is_truncated_and_halts() {
        let mut bytes = wire(&[Record::Delay(Delay { millis: 1 })]);
        bytes.truncate(3);
        let mut reader = reader_over(bytes);

        let err = reader.read_command().unwrap_err();
        assert!(matches!(
            err,
            CodecError::Truncated {
                tag: 133,
                expected: 4,
                got: 2
            }
        ));
        assert!(reader.is_halted());
        assert!(matches!(reader.read_command(), Err(CodecError::Halted)));
    }

    #[test]
    fn eof_inside_text_is_truncated() {
        let mut bytes = wire(&[Record::BuildStart(BuildStart {
            steps: 1,
            name: b"bracket".to_vec(),
        })]);
        bytes.truncate(8);
        let mut reader = reader_over(bytes);
        assert!(matches!(
            reader.read_command(),
            Err(CodecError::Truncated {
                tag: 153,
                expected: 12,
                got: 7
            })
        ));
    }

    #[test]
    fn unknown_tag_halts_reader() {
        let mut bytes = wire(&[Record::EnableAxes(AxesMask { axes: 0x87 })]);
        bytes.extend_from_slice(&[138, 0, 0]);
        bytes.extend(wire(&[Record::Delay(Delay { millis: 9 })]));
        let mut reader = reader_over(bytes);

        assert!(matches!(reader.read_command().unwrap(), ReadOutcome::Command(_)));
        assert_eq!(
            reader.read_command().unwrap(),
            ReadOutcome::Unrecognized { tag: 138 }
        );
        assert!(reader.is_halted());
        assert!(matches!(reader.read_command(), Err(CodecError::Halted)));
        assert!(matches!(reader.skip_command(), Err(CodecError::Halted)));
    }

    #[test]
    fn oversized_text_length_is_rejected() {
        let bytes = vec![tags::DISPLAY_MESSAGE, 0, 0, 0, 0, 40, b'a', b'b'];
        let mut reader = reader_over(bytes);
        let err = reader.read_command().unwrap_err();
        assert!(matches!(
            err,
            CodecError::RecordTooLarge {
                tag: 149,
                len: 46,
                max: 32
            }
        ));
        assert!(reader.is_halted());
        // Only the tag and head were consumed.
        assert_eq!(reader.bytes_read(), 6);
    }

    #[test]
    fn skip_keeps_alignment() {
        let records = vec![
            point(),
            Record::ToolCommand(ToolCommand::new(0, tags::tool::SET_TEMPERATURE, [0xdc, 0])),
            Record::SetRgbLed(SetRgbLed {
                red: 10,
                green: 20,
                blue: 30,
                ..SetRgbLed::default()
            }),
        ];
        let bytes = wire(&records);
        let total = bytes.len() as u64;
        let mut reader = reader_over(bytes);

        let skipped = reader.skip_command().unwrap().command().unwrap();
        assert_eq!(skipped.tag, tags::QUEUE_POINT_EXT);
        assert_eq!(skipped.wire_len, 25);
        assert!(skipped.blocking);

        let skipped = reader.skip_command().unwrap().command().unwrap();
        assert_eq!(skipped.description, "tool action command");
        assert_eq!(skipped.wire_len, 6);

        let cmd = reader.read_command().unwrap().command().unwrap();
        assert_eq!(cmd.record(), &records[2]);
        assert_eq!(reader.bytes_read(), total);
    }

    #[test]
    fn raw_copy_reports_true_length() {
        let bytes = wire(&[point(), Record::Delay(Delay { millis: 3 })]);
        let mut reader = reader_over(bytes.clone());

        let mut small = [0u8; 4];
        let read = reader.read_command_raw(&mut small).unwrap();
        assert_eq!(read.raw_len, 25);
        assert_eq!(&small, &bytes[..4]);
        assert!(matches!(read.outcome, ReadOutcome::Command(_)));

        let mut large = [0u8; MAX_RECORD_SIZE];
        let read = reader.read_command_raw(&mut large).unwrap();
        assert_eq!(read.raw_len, 5);
        assert_eq!(&large[..5], &bytes[25..]);

        let read = reader.read_command_raw(&mut large).unwrap();
        assert_eq!(read.outcome, ReadOutcome::EndOfStream);
        assert_eq!(read.raw_len, 0);
    }

    #[test]
    fn raw_copy_of_unknown_tag() {
        let mut reader = reader_over(vec![0x01, 0x02]);
        let mut buf = [0u8; 8];
        let read = reader.read_command_raw(&mut buf).unwrap();
        assert_eq!(read.outcome, ReadOutcome::Unrecognized { tag: 1 });
        assert_eq!(read.raw_len, 1);
        assert_eq!(buf[0], 1);
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn partial_reads_are_assembled() {
        let records = vec![point(), Record::Delay(Delay { millis: 42 })];
        let reader = ByteByByteReader {
            bytes: wire(&records),
            pos: 0,
        };
        let mut reader = CommandReader::new(Context::from_reader(IoReader::new(reader)));

        for expected in &records {
            let cmd = reader.read_command().unwrap().command().unwrap();
            assert_eq!(cmd.record(), expected);
        }
        assert_eq!(reader.read_command().unwrap(), ReadOutcome::EndOfStream);
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(wire(&[Record::Delay(Delay { millis: 5 })])),
        };
        let mut reader = CommandReader::new(Context::from_reader(IoReader::new(reader)));
        let cmd = reader.read_command().unwrap().command().unwrap();
        assert_eq!(cmd.record(), &Record::Delay(Delay { millis: 5 }));
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(5))
        }
    }

    #[test]
    fn transport_error_carries_os_code_and_halts() {
        let mut reader = CommandReader::new(Context::from_reader(IoReader::new(BrokenReader)));
        let err = reader.read_command().unwrap_err();
        assert!(matches!(err, CodecError::Transport(TransportError::Io(_))));
        assert_eq!(err.raw_os_error(), Some(5));
        assert!(matches!(reader.read_command(), Err(CodecError::Halted)));
    }

    #[test]
    fn write_only_context_cannot_read() {
        let ctx = Context::from_writer(x3g_transport::IoWriter::new(Vec::new()));
        let mut reader = CommandReader::new(ctx);
        assert!(matches!(
            reader.read_command(),
            Err(CodecError::Transport(TransportError::NoReader))
        ));
    }
}
