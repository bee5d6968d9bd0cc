use bytes::{BufMut, Bytes, BytesMut};

use crate::command::{lookup, CommandInfo};
use crate::error::{CodecError, Result};
use crate::record::Record;

/// Largest record on the wire, tag included.
pub const MAX_RECORD_SIZE: usize = 32;

/// A decoded command: metadata, the exact wire bytes and the typed record.
///
/// `raw()` always starts with the tag and its length equals `wire_len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    info: &'static CommandInfo,
    raw: Bytes,
    record: Record,
}

impl Command {
    /// Build a command from a record, encoding its wire bytes.
    pub fn new(record: Record) -> Result<Self> {
        let tag = record.tag();
        let info = lookup(tag).ok_or(CodecError::Unrecognized { tag })?;
        let mut raw = BytesMut::with_capacity(MAX_RECORD_SIZE);
        encode_record(&record, &mut raw)?;
        Ok(Self {
            info,
            raw: raw.freeze(),
            record,
        })
    }

    /// Decode exactly one command from `raw`.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        let (&tag, payload) = raw
            .split_first()
            .ok_or_else(|| CodecError::InvalidRecord("empty buffer".into()))?;
        let info = lookup(tag).ok_or(CodecError::Unrecognized { tag })?;

        let head = info.length.head_len();
        if payload.len() < head {
            return Err(CodecError::Truncated {
                tag,
                expected: head,
                got: payload.len(),
            });
        }
        let expected = info.length.payload_len(&payload[..head]);
        check_size(tag, 1 + expected)?;
        if payload.len() < expected {
            return Err(CodecError::Truncated {
                tag,
                expected,
                got: payload.len(),
            });
        }
        if payload.len() > expected {
            return Err(CodecError::InvalidRecord(format!(
                "{} trailing bytes after command {tag}",
                payload.len() - expected
            )));
        }

        let record = Record::decode(tag, payload).ok_or(CodecError::Unrecognized { tag })?;
        Ok(Self {
            info,
            raw: Bytes::copy_from_slice(raw),
            record,
        })
    }

    pub fn tag(&self) -> u8 {
        self.info.tag
    }

    /// Descriptor from the metadata table.
    pub fn description(&self) -> &'static str {
        self.info.name
    }

    pub fn info(&self) -> &'static CommandInfo {
        self.info
    }

    /// Total wire length, tag included.
    pub fn wire_len(&self) -> usize {
        self.raw.len()
    }

    /// Exact wire bytes, starting with the tag.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    /// Whether this command occupies the firmware's motion queue.
    pub fn is_blocking(&self) -> bool {
        self.info.blocking
    }
}

pub(crate) fn check_size(tag: u8, len: usize) -> Result<()> {
    if len > MAX_RECORD_SIZE {
        return Err(CodecError::RecordTooLarge {
            tag,
            len,
            max: MAX_RECORD_SIZE,
        });
    }
    Ok(())
}

/// Encode a record (tag, then payload fields) into the wire format.
///
/// On error nothing is appended to `dst`.
pub fn encode_record(record: &Record, dst: &mut BytesMut) -> Result<()> {
    let start = dst.len();
    let tag = record.tag();
    dst.reserve(MAX_RECORD_SIZE);
    dst.put_u8(tag);
    record.encode_payload(dst);
    if let Err(err) = check_size(tag, dst.len() - start) {
        dst.truncate(start);
        return Err(err);
    }
    Ok(())
}

/// Decode a command from the front of a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a complete command yet.
/// On success, consumes the command bytes from the buffer.
pub fn decode_command(src: &mut BytesMut) -> Result<Option<Command>> {
    let Some(&tag) = src.first() else {
        return Ok(None);
    };
    let info = lookup(tag).ok_or(CodecError::Unrecognized { tag })?;

    let head = info.length.head_len();
    if src.len() < 1 + head {
        return Ok(None);
    }
    let total = 1 + info.length.payload_len(&src[1..1 + head]);
    check_size(tag, total)?;
    if src.len() < total {
        return Ok(None);
    }

    let raw = src.split_to(total);
    Command::from_raw(&raw).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{
        BuildStart, Delay, DisplayMessage, QueuePoint, QueuePointKind, SetRgbLed, StreamVersion,
        ToolCommand,
    };
    use crate::tags;

    fn sample_point(kind: QueuePointKind) -> Record {
        let point = QueuePoint {
            kind: QueuePointKind::NewExtended,
            x: 1000,
            y: -2000,
            z: 300,
            a: -40,
            b: 5,
            rate: 1250,
            rel: 0x18,
            distance: 12.5,
            feedrate_mult_64: 64,
        };
        Record::QueuePoint(point.to_kind(kind))
    }

    #[test]
    fn command_from_record() {
        let cmd = Command::new(Record::Delay(Delay { millis: 1500 })).unwrap();
        assert_eq!(cmd.tag(), tags::DELAY);
        assert_eq!(cmd.description(), "delay");
        assert_eq!(cmd.raw().as_ref(), &[133, 0xdc, 0x05, 0, 0]);
        assert_eq!(cmd.wire_len(), 5);
        assert!(cmd.is_blocking());
    }

    #[test]
    fn raw_first_byte_is_tag() {
        let cmd = Command::new(Record::SetRgbLed(SetRgbLed {
            red: 255,
            ..SetRgbLed::default()
        }))
        .unwrap();
        assert_eq!(cmd.raw()[0], tags::SET_RGB_LED);
        assert!(!cmd.is_blocking());
    }

    #[test]
    fn from_raw_reproduces_bytes() {
        for kind in [
            QueuePointKind::Absolute,
            QueuePointKind::Extended,
            QueuePointKind::New,
            QueuePointKind::NewExtended,
        ] {
            let cmd = Command::new(sample_point(kind)).unwrap();
            let decoded = Command::from_raw(cmd.raw()).unwrap();
            assert_eq!(decoded, cmd);
            assert_eq!(decoded.wire_len(), 1 + kind.wire_len());
        }
    }

    #[test]
    fn from_raw_rejects_bad_buffers() {
        assert!(matches!(
            Command::from_raw(&[]),
            Err(CodecError::InvalidRecord(_))
        ));
        assert!(matches!(
            Command::from_raw(&[138]),
            Err(CodecError::Unrecognized { tag: 138 })
        ));
        assert!(matches!(
            Command::from_raw(&[tags::DELAY, 1, 2]),
            Err(CodecError::Truncated {
                tag: 133,
                expected: 4,
                got: 2
            })
        ));
        assert!(matches!(
            Command::from_raw(&[tags::CHANGE_TOOL, 0, 0]),
            Err(CodecError::InvalidRecord(_))
        ));
    }

    #[test]
    fn oversized_text_is_rejected() {
        let record = Record::DisplayMessage(DisplayMessage {
            message: vec![b'x'; 27],
            ..DisplayMessage::default()
        });
        let mut buf = BytesMut::from(&b"keep"[..]);
        let err = encode_record(&record, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            CodecError::RecordTooLarge {
                tag: 149,
                len: 33,
                max: 32
            }
        ));
        assert_eq!(buf.as_ref(), b"keep");

        let fits = Record::DisplayMessage(DisplayMessage {
            message: vec![b'x'; 26],
            ..DisplayMessage::default()
        });
        assert_eq!(Command::new(fits).unwrap().wire_len(), MAX_RECORD_SIZE);
    }

    #[test]
    fn declared_length_over_limit_is_rejected_before_payload() {
        // Build start claims 200 name bytes; only the head is present.
        let raw = [tags::BUILD_START_NOTIFICATION, 0, 0, 0, 0, 200];
        assert!(matches!(
            Command::from_raw(&raw),
            Err(CodecError::RecordTooLarge { tag: 153, .. })
        ));
        let mut buf = BytesMut::from(&raw[..]);
        assert!(matches!(
            decode_command(&mut buf),
            Err(CodecError::RecordTooLarge { .. })
        ));
    }

    #[test]
    fn decode_incomplete_and_multiple() {
        let mut buf = BytesMut::new();
        encode_record(&Record::Delay(Delay { millis: 7 }), &mut buf).unwrap();
        encode_record(
            &Record::ToolCommand(ToolCommand::new(0, tags::tool::SET_TEMPERATURE, [220, 0])),
            &mut buf,
        )
        .unwrap();
        encode_record(
            &Record::BuildStart(BuildStart {
                steps: 10,
                name: b"part".to_vec(),
            }),
            &mut buf,
        )
        .unwrap();

        let mut partial = BytesMut::from(&buf[..3]);
        assert!(decode_command(&mut partial).unwrap().is_none());
        assert_eq!(partial.len(), 3);

        let first = decode_command(&mut buf).unwrap().unwrap();
        assert_eq!(first.tag(), tags::DELAY);
        let second = decode_command(&mut buf).unwrap().unwrap();
        let Record::ToolCommand(tool) = second.record() else {
            panic!("expected tool command");
        };
        assert_eq!(tool.value(), 220);
        let third = decode_command(&mut buf).unwrap().unwrap();
        assert_eq!(third.wire_len(), 1 + 5 + 4);
        assert!(buf.is_empty());
        assert!(decode_command(&mut buf).unwrap().is_none());
    }

    #[test]
    fn stream_version_layout() {
        let record = Record::StreamVersion(StreamVersion {
            version_high: 1,
            version_low: 2,
            bot_type: 0xD314,
            ..StreamVersion::default()
        });
        let cmd = Command::new(record).unwrap();
        assert_eq!(cmd.wire_len(), 21);
        assert_eq!(&cmd.raw()[..3], &[157, 1, 2]);
        assert_eq!(&cmd.raw()[8..10], &[0x14, 0xD3]);
    }
}
