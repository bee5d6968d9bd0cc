//! Static command metadata: name, payload length and blocking flag per tag.

use std::sync::LazyLock;

use crate::record::{
    AccelerationToggle, AdvanceK, AdvancedAccel, AxesMask, AxisLimits, AxisStepsMm, BuildEnd,
    BuildStart, BuzzerBuzz, BuzzerRepeats, ChangeTool, DefaultAccel, Delay, DisplayMessage,
    ExtruderStepsMm, FilamentDiameter, FindAxes, MoodHsb, MoodRgb, MoodScript, PauseAtZ,
    PauseForButton, QueuePointKind, QueueSong, ResetToFactory, SetBeep, SetBuildPercent,
    SetPosition, SetPositionExt, SetPotValue, SetRgbLed, StreamVersion, ToolCommand, WaitFor,
};
use crate::tags;

/// Payload length rule for a command. Lengths exclude the tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Always exactly this many bytes.
    Fixed(usize),
    /// `head` fixed bytes, the last of which counts the variable bytes that
    /// follow.
    Prefixed { head: usize },
}

impl Length {
    /// Bytes that must be read before the full length is known.
    pub fn head_len(self) -> usize {
        match self {
            Length::Fixed(n) => n,
            Length::Prefixed { head } => head,
        }
    }

    /// Whole payload length, given at least the head bytes.
    pub fn payload_len(self, head_bytes: &[u8]) -> usize {
        match self {
            Length::Fixed(n) => n,
            Length::Prefixed { head } => {
                let count = head
                    .checked_sub(1)
                    .and_then(|i| head_bytes.get(i))
                    .copied()
                    .unwrap_or(0);
                head + usize::from(count)
            }
        }
    }
}

/// Metadata for one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub tag: u8,
    /// Human-readable description.
    pub name: &'static str,
    pub length: Length,
    /// Whether the command makes the machine wait before the next command.
    pub blocking: bool,
}

const fn fixed(tag: u8, name: &'static str, len: usize, blocking: bool) -> CommandInfo {
    CommandInfo {
        tag,
        name,
        length: Length::Fixed(len),
        blocking,
    }
}

const fn prefixed(tag: u8, name: &'static str, head: usize) -> CommandInfo {
    CommandInfo {
        tag,
        name,
        length: Length::Prefixed { head },
        blocking: false,
    }
}

/// Every known command, in tag order.
static COMMANDS: [CommandInfo; 43] = [
    fixed(
        tags::QUEUE_POINT_ABS,
        "queue point absolute",
        QueuePointKind::Absolute.wire_len(),
        true,
    ),
    fixed(tags::SET_POSITION, "set position", SetPosition::WIRE_LEN, false),
    fixed(
        tags::FIND_AXES_MINIMUMS,
        "find axes minimums",
        FindAxes::WIRE_LEN,
        true,
    ),
    fixed(
        tags::FIND_AXES_MAXIMUMS,
        "find axes maximums",
        FindAxes::WIRE_LEN,
        true,
    ),
    fixed(tags::DELAY, "delay", Delay::WIRE_LEN, true),
    fixed(tags::CHANGE_TOOL, "change tool", ChangeTool::WIRE_LEN, false),
    fixed(
        tags::WAIT_FOR_TOOL,
        "wait for tool ready",
        WaitFor::WIRE_LEN,
        true,
    ),
    prefixed(
        tags::TOOL_COMMAND,
        "tool action command",
        ToolCommand::HEAD_LEN,
    ),
    fixed(
        tags::ENABLE_AXES,
        "enable/disable axes",
        AxesMask::WIRE_LEN,
        false,
    ),
    fixed(
        tags::QUEUE_POINT_EXT,
        "queue point extended",
        QueuePointKind::Extended.wire_len(),
        true,
    ),
    fixed(
        tags::SET_POSITION_EXT,
        "set position extended",
        SetPositionExt::WIRE_LEN,
        false,
    ),
    fixed(
        tags::WAIT_FOR_PLATFORM,
        "wait for platform ready",
        WaitFor::WIRE_LEN,
        true,
    ),
    fixed(
        tags::QUEUE_POINT_NEW,
        "queue point new",
        QueuePointKind::New.wire_len(),
        true,
    ),
    fixed(
        tags::STORE_HOME_POSITIONS,
        "store home positions",
        AxesMask::WIRE_LEN,
        false,
    ),
    fixed(
        tags::RECALL_HOME_POSITIONS,
        "recall home positions",
        AxesMask::WIRE_LEN,
        false,
    ),
    fixed(
        tags::SET_POT_VALUE,
        "set digital potentiometer",
        SetPotValue::WIRE_LEN,
        false,
    ),
    fixed(tags::SET_RGB_LED, "set RGB LED", SetRgbLed::WIRE_LEN, false),
    fixed(tags::SET_BEEP, "set beep", SetBeep::WIRE_LEN, false),
    fixed(
        tags::PAUSE_FOR_BUTTON,
        "pause for button",
        PauseForButton::WIRE_LEN,
        true,
    ),
    prefixed(
        tags::DISPLAY_MESSAGE,
        "display message",
        DisplayMessage::HEAD_LEN,
    ),
    fixed(
        tags::SET_BUILD_PERCENT,
        "set build percentage",
        SetBuildPercent::WIRE_LEN,
        false,
    ),
    fixed(tags::QUEUE_SONG, "queue song", QueueSong::WIRE_LEN, false),
    fixed(
        tags::RESET_TO_FACTORY,
        "reset to factory",
        ResetToFactory::WIRE_LEN,
        false,
    ),
    prefixed(
        tags::BUILD_START_NOTIFICATION,
        "build start notification",
        BuildStart::HEAD_LEN,
    ),
    fixed(
        tags::BUILD_END_NOTIFICATION,
        "build end notification",
        BuildEnd::WIRE_LEN,
        false,
    ),
    fixed(
        tags::QUEUE_POINT_NEW_EXT,
        "queue point new extended",
        QueuePointKind::NewExtended.wire_len(),
        true,
    ),
    fixed(
        tags::SET_ACCELERATION_TOGGLE,
        "set segment acceleration",
        AccelerationToggle::WIRE_LEN,
        false,
    ),
    fixed(
        tags::STREAM_VERSION,
        "stream version",
        StreamVersion::WIRE_LEN,
        false,
    ),
    fixed(
        tags::PAUSE_AT_ZPOS,
        "pause at Z position",
        PauseAtZ::WIRE_LEN,
        true,
    ),
    fixed(
        tags::SET_MAX_ACCEL,
        "set max acceleration",
        AxisLimits::WIRE_LEN,
        false,
    ),
    fixed(
        tags::SET_MAX_FEEDRATE,
        "set max feedrate",
        AxisLimits::WIRE_LEN,
        false,
    ),
    fixed(
        tags::SET_DEFAULT_ACCEL,
        "set default acceleration",
        DefaultAccel::WIRE_LEN,
        false,
    ),
    fixed(
        tags::SET_ADVANCED_ACCEL,
        "set advanced acceleration",
        AdvancedAccel::WIRE_LEN,
        false,
    ),
    fixed(
        tags::SET_FILAMENT_DIAMETER,
        "set filament diameter",
        FilamentDiameter::WIRE_LEN,
        false,
    ),
    fixed(
        tags::SET_ADVANCE_K,
        "set advance K",
        AdvanceK::WIRE_LEN,
        false,
    ),
    fixed(
        tags::SET_EXTRUDER_STEPSMM,
        "set extruder steps per mm",
        ExtruderStepsMm::WIRE_LEN,
        false,
    ),
    fixed(
        tags::SET_ACCELERATION,
        "set acceleration",
        AccelerationToggle::WIRE_LEN,
        false,
    ),
    fixed(
        tags::MOOD_LIGHT_SET_RGB,
        "mood light set RGB",
        MoodRgb::WIRE_LEN,
        false,
    ),
    fixed(
        tags::MOOD_LIGHT_SET_HSB,
        "mood light set HSB",
        MoodHsb::WIRE_LEN,
        false,
    ),
    fixed(
        tags::MOOD_LIGHT_PLAY_SCRIPT,
        "mood light play script",
        MoodScript::WIRE_LEN,
        false,
    ),
    fixed(
        tags::BUZZER_REPEATS,
        "buzzer repeats",
        BuzzerRepeats::WIRE_LEN,
        false,
    ),
    fixed(tags::BUZZER_BUZZ, "buzzer buzz", BuzzerBuzz::WIRE_LEN, false),
    fixed(
        tags::SET_AXIS_STEPS_MM,
        "set axis steps per mm",
        AxisStepsMm::WIRE_LEN,
        false,
    ),
];

static BY_TAG: LazyLock<[Option<&'static CommandInfo>; 256]> = LazyLock::new(|| {
    let mut table = [None; 256];
    for info in &COMMANDS {
        table[usize::from(info.tag)] = Some(info);
    }
    table
});

/// Metadata for `tag`, or `None` if the tag is not a known command.
pub fn lookup(tag: u8) -> Option<&'static CommandInfo> {
    BY_TAG[usize::from(tag)]
}

/// All known commands in ascending tag order.
pub fn commands() -> impl Iterator<Item = &'static CommandInfo> {
    COMMANDS.iter()
}

/// Whether `tag` is a known blocking command.
pub fn is_blocking(tag: u8) -> bool {
    lookup(tag).is_some_and(|info| info.blocking)
}
