//! Typed payloads for every command.
//!
//! All fields are little-endian and packed with no padding, in declaration
//! order. The payload excludes the leading tag byte.

use std::borrow::Cow;

use bytes::{Buf, BufMut, BytesMut};

use crate::tags;

/// A fixed-width little-endian wire field.
trait Field: Sized {
    fn get(src: &mut &[u8]) -> Self;
    fn put(&self, dst: &mut BytesMut);
}

impl Field for u8 {
    fn get(src: &mut &[u8]) -> Self {
        src.get_u8()
    }
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u8(*self);
    }
}

impl Field for u16 {
    fn get(src: &mut &[u8]) -> Self {
        src.get_u16_le()
    }
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u16_le(*self);
    }
}

impl Field for i32 {
    fn get(src: &mut &[u8]) -> Self {
        src.get_i32_le()
    }
    fn put(&self, dst: &mut BytesMut) {
        dst.put_i32_le(*self);
    }
}

impl Field for u32 {
    fn get(src: &mut &[u8]) -> Self {
        src.get_u32_le()
    }
    fn put(&self, dst: &mut BytesMut) {
        dst.put_u32_le(*self);
    }
}

impl Field for f32 {
    fn get(src: &mut &[u8]) -> Self {
        src.get_f32_le()
    }
    fn put(&self, dst: &mut BytesMut) {
        dst.put_f32_le(*self);
    }
}

/// Payload body codec. Callers guarantee `src` holds the whole payload.
trait Payload: Sized {
    fn decode(src: &mut &[u8]) -> Self;
    fn encode(&self, dst: &mut BytesMut);
}

macro_rules! wire_struct {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* pub $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: $ty, )*
        }

        impl $name {
            /// Encoded payload size in bytes.
            pub const WIRE_LEN: usize = 0 $( + std::mem::size_of::<$ty>() )*;
        }

        impl Payload for $name {
            fn decode(src: &mut &[u8]) -> Self {
                Self {
                    $( $field: <$ty as Field>::get(src), )*
                }
            }

            fn encode(&self, dst: &mut BytesMut) {
                $( Field::put(&self.$field, dst); )*
            }
        }
    };
}

wire_struct! {
    pub struct SetPosition {
        pub x: i32,
        pub y: i32,
        pub z: i32,
    }
}

wire_struct! {
    pub struct SetPositionExt {
        pub x: i32,
        pub y: i32,
        pub z: i32,
        pub a: i32,
        pub b: i32,
    }
}

wire_struct! {
    pub struct Delay {
        pub millis: u32,
    }
}

wire_struct! {
    /// Homing search toward the minimum or maximum endstops.
    pub struct FindAxes {
        /// Axis bitmask.
        pub flags: u8,
        /// Microseconds per step.
        pub feedrate: u32,
        /// Seconds.
        pub timeout: u16,
    }
}

wire_struct! {
    pub struct ChangeTool {
        pub index: u8,
    }
}

wire_struct! {
    /// Wait for a tool or the build platform to reach temperature.
    pub struct WaitFor {
        pub index: u8,
        pub ping_delay: u16,
        pub timeout: u16,
    }
}

wire_struct! {
    /// Axis bitmask (X = bit 0 ... B = bit 4).
    ///
    /// For enable/disable, bit 7 set means enable.
    pub struct AxesMask {
        pub axes: u8,
    }
}

wire_struct! {
    pub struct SetPotValue {
        pub axis: u8,
        pub value: u8,
    }
}

wire_struct! {
    pub struct SetRgbLed {
        pub red: u8,
        pub green: u8,
        pub blue: u8,
        pub blink_rate: u8,
        pub effect: u8,
    }
}

wire_struct! {
    pub struct SetBeep {
        pub frequency: u16,
        pub duration: u16,
        pub effect: u8,
    }
}

wire_struct! {
    pub struct PauseForButton {
        pub mask: u8,
        pub timeout: u16,
        pub timeout_behavior: u8,
    }
}

wire_struct! {
    pub struct SetBuildPercent {
        pub percentage: u8,
        pub reserved: u8,
    }
}

wire_struct! {
    pub struct QueueSong {
        pub song_id: u8,
    }
}

wire_struct! {
    pub struct ResetToFactory {
        pub options: u8,
    }
}

wire_struct! {
    pub struct BuildEnd {
        pub flags: u8,
    }
}

wire_struct! {
    pub struct AccelerationToggle {
        pub enabled: u8,
    }
}

wire_struct! {
    /// x3g stream header.
    pub struct StreamVersion {
        pub version_high: u8,
        pub version_low: u8,
        pub reserved1: u8,
        pub reserved2: u32,
        pub bot_type: u16,
        pub reserved3: u16,
        pub reserved4: u32,
        pub reserved5: u32,
        pub reserved6: u8,
    }
}

wire_struct! {
    pub struct PauseAtZ {
        pub z: f32,
    }
}

wire_struct! {
    /// Per-axis limits for max acceleration or max feed rate.
    pub struct AxisLimits {
        pub x: i32,
        pub y: i32,
        pub z: i32,
        pub a: i32,
    }
}

wire_struct! {
    pub struct DefaultAccel {
        pub s: i32,
        pub t: i32,
    }
}

wire_struct! {
    pub struct AdvancedAccel {
        pub s: i32,
        pub t: i32,
        pub x: i32,
        pub z: i32,
    }
}

wire_struct! {
    pub struct FilamentDiameter {
        pub d: i32,
    }
}

wire_struct! {
    pub struct AdvanceK {
        pub s: i32,
        pub k: i32,
    }
}

wire_struct! {
    pub struct ExtruderStepsMm {
        pub a: i32,
    }
}

wire_struct! {
    pub struct MoodRgb {
        pub r: u8,
        pub g: u8,
        pub b: u8,
        pub fade_speed: u8,
        pub write_to_eeprom: u8,
    }
}

wire_struct! {
    pub struct MoodHsb {
        pub h: u8,
        pub s: u8,
        pub b: u8,
        pub write_to_eeprom: u8,
    }
}

wire_struct! {
    pub struct MoodScript {
        pub script_id: u8,
        pub write_to_eeprom: u8,
    }
}

wire_struct! {
    pub struct BuzzerRepeats {
        pub repeats: u8,
    }
}

wire_struct! {
    pub struct BuzzerBuzz {
        pub buzzes: u8,
        pub duration: u8,
        pub repeats: u8,
    }
}

wire_struct! {
    /// Steps per millimetre, scaled by [`AxisStepsMm::SCALE`].
    pub struct AxisStepsMm {
        pub x: u32,
        pub y: u32,
        pub z: u32,
        pub a: u32,
    }
}

impl AxisStepsMm {
    pub const SCALE: f64 = 10_000.0;

    /// Unscaled steps per millimetre for X, Y, Z, A.
    pub fn as_f64(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.a].map(|v| f64::from(v) / Self::SCALE)
    }
}

/// Which wire shape a [`QueuePoint`] travels as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePointKind {
    /// X/Y/Z plus dda.
    #[default]
    Absolute,
    /// X/Y/Z/A/B plus dda.
    Extended,
    /// X/Y/Z/A/B, duration in microseconds and a relative-axes mask.
    New,
    /// x3g point: adds distance and feed-rate multiplier.
    NewExtended,
}

impl QueuePointKind {
    pub const fn tag(self) -> u8 {
        match self {
            QueuePointKind::Absolute => tags::QUEUE_POINT_ABS,
            QueuePointKind::Extended => tags::QUEUE_POINT_EXT,
            QueuePointKind::New => tags::QUEUE_POINT_NEW,
            QueuePointKind::NewExtended => tags::QUEUE_POINT_NEW_EXT,
        }
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tags::QUEUE_POINT_ABS => Some(QueuePointKind::Absolute),
            tags::QUEUE_POINT_EXT => Some(QueuePointKind::Extended),
            tags::QUEUE_POINT_NEW => Some(QueuePointKind::New),
            tags::QUEUE_POINT_NEW_EXT => Some(QueuePointKind::NewExtended),
            _ => None,
        }
    }

    /// Encoded payload size in bytes.
    pub const fn wire_len(self) -> usize {
        match self {
            QueuePointKind::Absolute => 16,
            QueuePointKind::Extended => 24,
            QueuePointKind::New => 25,
            QueuePointKind::NewExtended => 31,
        }
    }

    fn has_ab(self) -> bool {
        !matches!(self, QueuePointKind::Absolute)
    }

    fn has_rel(self) -> bool {
        matches!(self, QueuePointKind::New | QueuePointKind::NewExtended)
    }

    fn has_distance(self) -> bool {
        matches!(self, QueuePointKind::NewExtended)
    }
}

/// Canonical form of the four queue-point commands.
///
/// Fields a kind does not carry are zero after decoding and ignored when
/// encoding:
///
/// | kind        | a, b | rel | distance | feedrate_mult_64 |
/// |-------------|------|-----|----------|------------------|
/// | Absolute    | 0    | 0   | 0.0      | 0                |
/// | Extended    | wire | 0   | 0.0      | 0                |
/// | New         | wire | wire| 0.0      | 0                |
/// | NewExtended | wire | wire| wire     | wire             |
///
/// `rate` is the dda (microseconds per step) for Absolute and Extended, the
/// move duration in microseconds for New, and the dda rate for NewExtended.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QueuePoint {
    pub kind: QueuePointKind,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub a: i32,
    pub b: i32,
    pub rate: i32,
    pub rel: u8,
    pub distance: f32,
    pub feedrate_mult_64: u16,
}

impl QueuePoint {
    /// Reinterpret as another kind, zero-filling fields the target lacks.
    pub fn to_kind(self, kind: QueuePointKind) -> Self {
        Self {
            kind,
            a: if kind.has_ab() { self.a } else { 0 },
            b: if kind.has_ab() { self.b } else { 0 },
            rel: if kind.has_rel() { self.rel } else { 0 },
            distance: if kind.has_distance() { self.distance } else { 0.0 },
            feedrate_mult_64: if kind.has_distance() {
                self.feedrate_mult_64
            } else {
                0
            },
            ..self
        }
    }

    fn decode(kind: QueuePointKind, src: &mut &[u8]) -> Self {
        let mut point = Self {
            kind,
            x: src.get_i32_le(),
            y: src.get_i32_le(),
            z: src.get_i32_le(),
            ..Self::default()
        };
        if kind.has_ab() {
            point.a = src.get_i32_le();
            point.b = src.get_i32_le();
        }
        point.rate = src.get_i32_le();
        if kind.has_rel() {
            point.rel = src.get_u8();
        }
        if kind.has_distance() {
            point.distance = src.get_f32_le();
            point.feedrate_mult_64 = src.get_u16_le();
        }
        point
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_i32_le(self.x);
        dst.put_i32_le(self.y);
        dst.put_i32_le(self.z);
        if self.kind.has_ab() {
            dst.put_i32_le(self.a);
            dst.put_i32_le(self.b);
        }
        dst.put_i32_le(self.rate);
        if self.kind.has_rel() {
            dst.put_u8(self.rel);
        }
        if self.kind.has_distance() {
            dst.put_f32_le(self.distance);
            dst.put_u16_le(self.feedrate_mult_64);
        }
    }
}

/// Reads a count byte followed by that many bytes.
fn get_counted(src: &mut &[u8]) -> Vec<u8> {
    let len = usize::from(src.get_u8()).min(src.remaining());
    let bytes = src[..len].to_vec();
    src.advance(len);
    bytes
}

fn put_counted(bytes: &[u8], dst: &mut BytesMut) {
    dst.put_u8(bytes.len().min(usize::from(u8::MAX)) as u8);
    dst.put_slice(bytes);
}

/// Tool action command: an embedded sub-command for one tool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolCommand {
    pub index: u8,
    pub subcommand: u8,
    pub payload: Vec<u8>,
}

impl ToolCommand {
    /// Payload bytes before the sub-command's own data (index, id, length).
    pub const HEAD_LEN: usize = 3;

    pub fn new(index: u8, subcommand: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            subcommand,
            payload: payload.into(),
        }
    }

    /// Name of the embedded sub-command.
    pub fn subcommand_name(&self) -> &'static str {
        tags::tool::name(self.subcommand)
    }

    /// The sub-command's argument: the first one or two payload bytes,
    /// little-endian. Zero when there is no payload.
    pub fn value(&self) -> u16 {
        match self.payload.as_slice() {
            [] => 0,
            [lo] => u16::from(*lo),
            [lo, hi, ..] => u16::from_le_bytes([*lo, *hi]),
        }
    }

    fn decode(src: &mut &[u8]) -> Self {
        let index = src.get_u8();
        let subcommand = src.get_u8();
        Self {
            index,
            subcommand,
            payload: get_counted(src),
        }
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u8(self.index);
        dst.put_u8(self.subcommand);
        put_counted(&self.payload, dst);
    }
}

/// Text for the display panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayMessage {
    pub options: u8,
    pub x: u8,
    pub y: u8,
    pub timeout: u8,
    pub message: Vec<u8>,
}

impl DisplayMessage {
    /// Payload bytes before the text (options, x, y, timeout, length).
    pub const HEAD_LEN: usize = 5;

    /// Message text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.message)
    }

    fn decode(src: &mut &[u8]) -> Self {
        Self {
            options: src.get_u8(),
            x: src.get_u8(),
            y: src.get_u8(),
            timeout: src.get_u8(),
            message: get_counted(src),
        }
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u8(self.options);
        dst.put_u8(self.x);
        dst.put_u8(self.y);
        dst.put_u8(self.timeout);
        put_counted(&self.message, dst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildStart {
    pub steps: u32,
    pub name: Vec<u8>,
}

impl BuildStart {
    /// Payload bytes before the name (steps, length).
    pub const HEAD_LEN: usize = 5;

    /// Build name, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    fn decode(src: &mut &[u8]) -> Self {
        Self {
            steps: src.get_u32_le(),
            name: get_counted(src),
        }
    }

    fn encode(&self, dst: &mut BytesMut) {
        dst.put_u32_le(self.steps);
        put_counted(&self.name, dst);
    }
}

/// A decoded command payload. The variant determines the tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    QueuePoint(QueuePoint),
    SetPosition(SetPosition),
    FindAxesMinimums(FindAxes),
    FindAxesMaximums(FindAxes),
    Delay(Delay),
    ChangeTool(ChangeTool),
    WaitForTool(WaitFor),
    ToolCommand(ToolCommand),
    EnableAxes(AxesMask),
    SetPositionExt(SetPositionExt),
    WaitForPlatform(WaitFor),
    StoreHomePositions(AxesMask),
    RecallHomePositions(AxesMask),
    SetPotValue(SetPotValue),
    SetRgbLed(SetRgbLed),
    SetBeep(SetBeep),
    PauseForButton(PauseForButton),
    DisplayMessage(DisplayMessage),
    SetBuildPercent(SetBuildPercent),
    QueueSong(QueueSong),
    ResetToFactory(ResetToFactory),
    BuildStart(BuildStart),
    BuildEnd(BuildEnd),
    SetAccelerationToggle(AccelerationToggle),
    StreamVersion(StreamVersion),
    PauseAtZ(PauseAtZ),
    SetMaxAccel(AxisLimits),
    SetMaxFeedrate(AxisLimits),
    SetDefaultAccel(DefaultAccel),
    SetAdvancedAccel(AdvancedAccel),
    SetFilamentDiameter(FilamentDiameter),
    SetAdvanceK(AdvanceK),
    SetExtruderStepsMm(ExtruderStepsMm),
    SetAcceleration(AccelerationToggle),
    MoodSetRgb(MoodRgb),
    MoodSetHsb(MoodHsb),
    MoodPlayScript(MoodScript),
    BuzzerRepeats(BuzzerRepeats),
    BuzzerBuzz(BuzzerBuzz),
    SetAxisStepsMm(AxisStepsMm),
}

impl Record {
    /// The command tag this record is sent under.
    pub fn tag(&self) -> u8 {
        match self {
            Record::QueuePoint(p) => p.kind.tag(),
            Record::SetPosition(_) => tags::SET_POSITION,
            Record::FindAxesMinimums(_) => tags::FIND_AXES_MINIMUMS,
            Record::FindAxesMaximums(_) => tags::FIND_AXES_MAXIMUMS,
            Record::Delay(_) => tags::DELAY,
            Record::ChangeTool(_) => tags::CHANGE_TOOL,
            Record::WaitForTool(_) => tags::WAIT_FOR_TOOL,
            Record::ToolCommand(_) => tags::TOOL_COMMAND,
            Record::EnableAxes(_) => tags::ENABLE_AXES,
            Record::SetPositionExt(_) => tags::SET_POSITION_EXT,
            Record::WaitForPlatform(_) => tags::WAIT_FOR_PLATFORM,
            Record::StoreHomePositions(_) => tags::STORE_HOME_POSITIONS,
            Record::RecallHomePositions(_) => tags::RECALL_HOME_POSITIONS,
            Record::SetPotValue(_) => tags::SET_POT_VALUE,
            Record::SetRgbLed(_) => tags::SET_RGB_LED,
            Record::SetBeep(_) => tags::SET_BEEP,
            Record::PauseForButton(_) => tags::PAUSE_FOR_BUTTON,
            Record::DisplayMessage(_) => tags::DISPLAY_MESSAGE,
            Record::SetBuildPercent(_) => tags::SET_BUILD_PERCENT,
            Record::QueueSong(_) => tags::QUEUE_SONG,
            Record::ResetToFactory(_) => tags::RESET_TO_FACTORY,
            Record::BuildStart(_) => tags::BUILD_START_NOTIFICATION,
            Record::BuildEnd(_) => tags::BUILD_END_NOTIFICATION,
            Record::SetAccelerationToggle(_) => tags::SET_ACCELERATION_TOGGLE,
            Record::StreamVersion(_) => tags::STREAM_VERSION,
            Record::PauseAtZ(_) => tags::PAUSE_AT_ZPOS,
            Record::SetMaxAccel(_) => tags::SET_MAX_ACCEL,
            Record::SetMaxFeedrate(_) => tags::SET_MAX_FEEDRATE,
            Record::SetDefaultAccel(_) => tags::SET_DEFAULT_ACCEL,
            Record::SetAdvancedAccel(_) => tags::SET_ADVANCED_ACCEL,
            Record::SetFilamentDiameter(_) => tags::SET_FILAMENT_DIAMETER,
            Record::SetAdvanceK(_) => tags::SET_ADVANCE_K,
            Record::SetExtruderStepsMm(_) => tags::SET_EXTRUDER_STEPSMM,
            Record::SetAcceleration(_) => tags::SET_ACCELERATION,
            Record::MoodSetRgb(_) => tags::MOOD_LIGHT_SET_RGB,
            Record::MoodSetHsb(_) => tags::MOOD_LIGHT_SET_HSB,
            Record::MoodPlayScript(_) => tags::MOOD_LIGHT_PLAY_SCRIPT,
            Record::BuzzerRepeats(_) => tags::BUZZER_REPEATS,
            Record::BuzzerBuzz(_) => tags::BUZZER_BUZZ,
            Record::SetAxisStepsMm(_) => tags::SET_AXIS_STEPS_MM,
        }
    }

    /// Decode the payload for `tag`. Returns `None` for an unknown tag.
    ///
    /// `payload` must already be framed to the command's full length.
    pub(crate) fn decode(tag: u8, payload: &[u8]) -> Option<Self> {
        let src = &mut &payload[..];
        if let Some(kind) = QueuePointKind::from_tag(tag) {
            return Some(Record::QueuePoint(QueuePoint::decode(kind, src)));
        }
        let record = match tag {
            tags::SET_POSITION => Record::SetPosition(Payload::decode(src)),
            tags::FIND_AXES_MINIMUMS => Record::FindAxesMinimums(Payload::decode(src)),
            tags::FIND_AXES_MAXIMUMS => Record::FindAxesMaximums(Payload::decode(src)),
            tags::DELAY => Record::Delay(Payload::decode(src)),
            tags::CHANGE_TOOL => Record::ChangeTool(Payload::decode(src)),
            tags::WAIT_FOR_TOOL => Record::WaitForTool(Payload::decode(src)),
            tags::TOOL_COMMAND => Record::ToolCommand(ToolCommand::decode(src)),
            tags::ENABLE_AXES => Record::EnableAxes(Payload::decode(src)),
            tags::SET_POSITION_EXT => Record::SetPositionExt(Payload::decode(src)),
            tags::WAIT_FOR_PLATFORM => Record::WaitForPlatform(Payload::decode(src)),
            tags::STORE_HOME_POSITIONS => Record::StoreHomePositions(Payload::decode(src)),
            tags::RECALL_HOME_POSITIONS => Record::RecallHomePositions(Payload::decode(src)),
            tags::SET_POT_VALUE => Record::SetPotValue(Payload::decode(src)),
            tags::SET_RGB_LED => Record::SetRgbLed(Payload::decode(src)),
            tags::SET_BEEP => Record::SetBeep(Payload::decode(src)),
            tags::PAUSE_FOR_BUTTON => Record::PauseForButton(Payload::decode(src)),
            tags::DISPLAY_MESSAGE => Record::DisplayMessage(DisplayMessage::decode(src)),
            tags::SET_BUILD_PERCENT => Record::SetBuildPercent(Payload::decode(src)),
            tags::QUEUE_SONG => Record::QueueSong(Payload::decode(src)),
            tags::RESET_TO_FACTORY => Record::ResetToFactory(Payload::decode(src)),
            tags::BUILD_START_NOTIFICATION => Record::BuildStart(BuildStart::decode(src)),
            tags::BUILD_END_NOTIFICATION => Record::BuildEnd(Payload::decode(src)),
            tags::SET_ACCELERATION_TOGGLE => Record::SetAccelerationToggle(Payload::decode(src)),
            tags::STREAM_VERSION => Record::StreamVersion(Payload::decode(src)),
            tags::PAUSE_AT_ZPOS => Record::PauseAtZ(Payload::decode(src)),
            tags::SET_MAX_ACCEL => Record::SetMaxAccel(Payload::decode(src)),
            tags::SET_MAX_FEEDRATE => Record::SetMaxFeedrate(Payload::decode(src)),
            tags::SET_DEFAULT_ACCEL => Record::SetDefaultAccel(Payload::decode(src)),
            tags::SET_ADVANCED_ACCEL => Record::SetAdvancedAccel(Payload::decode(src)),
            tags::SET_FILAMENT_DIAMETER => Record::SetFilamentDiameter(Payload::decode(src)),
            tags::SET_ADVANCE_K => Record::SetAdvanceK(Payload::decode(src)),
            tags::SET_EXTRUDER_STEPSMM => Record::SetExtruderStepsMm(Payload::decode(src)),
            tags::SET_ACCELERATION => Record::SetAcceleration(Payload::decode(src)),
            tags::MOOD_LIGHT_SET_RGB => Record::MoodSetRgb(Payload::decode(src)),
            tags::MOOD_LIGHT_SET_HSB => Record::MoodSetHsb(Payload::decode(src)),
            tags::MOOD_LIGHT_PLAY_SCRIPT => Record::MoodPlayScript(Payload::decode(src)),
            tags::BUZZER_REPEATS => Record::BuzzerRepeats(Payload::decode(src)),
            tags::BUZZER_BUZZ => Record::BuzzerBuzz(Payload::decode(src)),
            tags::SET_AXIS_STEPS_MM => Record::SetAxisStepsMm(Payload::decode(src)),
            _ => return None,
        };
        Some(record)
    }

    /// Append the payload (without the tag) to `dst`.
    pub(crate) fn encode_payload(&self, dst: &mut BytesMut) {
        match self {
            Record::QueuePoint(p) => p.encode(dst),
            Record::ToolCommand(t) => t.encode(dst),
            Record::DisplayMessage(m) => m.encode(dst),
            Record::BuildStart(b) => b.encode(dst),
            Record::SetPosition(p) => p.encode(dst),
            Record::FindAxesMinimums(f) | Record::FindAxesMaximums(f) => f.encode(dst),
            Record::Delay(d) => d.encode(dst),
            Record::ChangeTool(c) => c.encode(dst),
            Record::WaitForTool(w) | Record::WaitForPlatform(w) => w.encode(dst),
            Record::EnableAxes(m)
            | Record::StoreHomePositions(m)
            | Record::RecallHomePositions(m) => m.encode(dst),
            Record::SetPositionExt(p) => p.encode(dst),
            Record::SetPotValue(p) => p.encode(dst),
            Record::SetRgbLed(l) => l.encode(dst),
            Record::SetBeep(b) => b.encode(dst),
            Record::PauseForButton(p) => p.encode(dst),
            Record::SetBuildPercent(p) => p.encode(dst),
            Record::QueueSong(s) => s.encode(dst),
            Record::ResetToFactory(r) => r.encode(dst),
            Record::BuildEnd(b) => b.encode(dst),
            Record::SetAccelerationToggle(t) | Record::SetAcceleration(t) => t.encode(dst),
            Record::StreamVersion(v) => v.encode(dst),
            Record::PauseAtZ(p) => p.encode(dst),
            Record::SetMaxAccel(l) | Record::SetMaxFeedrate(l) => l.encode(dst),
            Record::SetDefaultAccel(a) => a.encode(dst),
            Record::SetAdvancedAccel(a) => a.encode(dst),
            Record::SetFilamentDiameter(d) => d.encode(dst),
            Record::SetAdvanceK(k) => k.encode(dst),
            Record::SetExtruderStepsMm(s) => s.encode(dst),
            Record::MoodSetRgb(m) => m.encode(dst),
            Record::MoodSetHsb(m) => m.encode(dst),
            Record::MoodPlayScript(m) => m.encode(dst),
            Record::BuzzerRepeats(b) => b.encode(dst),
            Record::BuzzerBuzz(b) => b.encode(dst),
            Record::SetAxisStepsMm(s) => s.encode(dst),
        }
    }
}
