//! Command identifiers.
//!
//! Tags 129-158 are the standard host action commands. Tags 200-213 are
//! extended firmware parameter commands.

/// Queue a point in absolute X/Y/Z coordinates.
pub const QUEUE_POINT_ABS: u8 = 129;
pub const SET_POSITION: u8 = 130;
pub const FIND_AXES_MINIMUMS: u8 = 131;
pub const FIND_AXES_MAXIMUMS: u8 = 132;
pub const DELAY: u8 = 133;
pub const CHANGE_TOOL: u8 = 134;
pub const WAIT_FOR_TOOL: u8 = 135;
/// Tool action command; carries an embedded sub-command.
pub const TOOL_COMMAND: u8 = 136;
pub const ENABLE_AXES: u8 = 137;
/// Queue a point in absolute X/Y/Z/A/B coordinates.
pub const QUEUE_POINT_EXT: u8 = 139;
pub const SET_POSITION_EXT: u8 = 140;
pub const WAIT_FOR_PLATFORM: u8 = 141;
/// Queue a point with a duration and relative-axes mask.
pub const QUEUE_POINT_NEW: u8 = 142;
pub const STORE_HOME_POSITIONS: u8 = 143;
pub const RECALL_HOME_POSITIONS: u8 = 144;
pub const SET_POT_VALUE: u8 = 145;
pub const SET_RGB_LED: u8 = 146;
pub const SET_BEEP: u8 = 147;
pub const PAUSE_FOR_BUTTON: u8 = 148;
pub const DISPLAY_MESSAGE: u8 = 149;
pub const SET_BUILD_PERCENT: u8 = 150;
pub const QUEUE_SONG: u8 = 151;
pub const RESET_TO_FACTORY: u8 = 152;
pub const BUILD_START_NOTIFICATION: u8 = 153;
pub const BUILD_END_NOTIFICATION: u8 = 154;
/// x3g queue point with distance and feed-rate multiplier.
pub const QUEUE_POINT_NEW_EXT: u8 = 155;
pub const SET_ACCELERATION_TOGGLE: u8 = 156;
pub const STREAM_VERSION: u8 = 157;
pub const PAUSE_AT_ZPOS: u8 = 158;

pub const SET_MAX_ACCEL: u8 = 200;
pub const SET_MAX_FEEDRATE: u8 = 201;
pub const SET_DEFAULT_ACCEL: u8 = 202;
pub const SET_ADVANCED_ACCEL: u8 = 203;
pub const SET_FILAMENT_DIAMETER: u8 = 204;
pub const SET_ADVANCE_K: u8 = 205;
pub const SET_EXTRUDER_STEPSMM: u8 = 206;
pub const SET_ACCELERATION: u8 = 207;
pub const MOOD_LIGHT_SET_RGB: u8 = 208;
pub const MOOD_LIGHT_SET_HSB: u8 = 209;
pub const MOOD_LIGHT_PLAY_SCRIPT: u8 = 210;
pub const BUZZER_REPEATS: u8 = 211;
pub const BUZZER_BUZZ: u8 = 212;
pub const SET_AXIS_STEPS_MM: u8 = 213;

/// Returns true if the tag is one of the four queue-point commands.
pub fn is_queue_point(tag: u8) -> bool {
    matches!(
        tag,
        QUEUE_POINT_ABS | QUEUE_POINT_EXT | QUEUE_POINT_NEW | QUEUE_POINT_NEW_EXT
    )
}

/// Returns true if the tag is in the extended parameter range.
pub fn is_extended(tag: u8) -> bool {
    (SET_MAX_ACCEL..=SET_AXIS_STEPS_MM).contains(&tag)
}

/// Tool sub-command identifiers carried inside [`TOOL_COMMAND`].
pub mod tool {
    pub const INIT: u8 = 1;
    pub const SET_TEMPERATURE: u8 = 3;
    pub const SET_MOTOR_1_PWM: u8 = 4;
    pub const SET_MOTOR_2_PWM: u8 = 5;
    pub const SET_MOTOR_1_RPM: u8 = 6;
    pub const SET_MOTOR_2_RPM: u8 = 7;
    pub const SET_MOTOR_1_DIRECTION: u8 = 8;
    pub const SET_MOTOR_2_DIRECTION: u8 = 9;
    pub const TOGGLE_MOTOR_1: u8 = 10;
    pub const TOGGLE_MOTOR_2: u8 = 11;
    pub const TOGGLE_FAN: u8 = 12;
    pub const TOGGLE_VALVE: u8 = 13;
    pub const SET_SERVO_1_POSITION: u8 = 14;
    pub const SET_SERVO_2_POSITION: u8 = 15;
    pub const PAUSE: u8 = 23;
    pub const ABORT: u8 = 24;
    pub const TOGGLE_ABP: u8 = 27;
    pub const SET_PLATFORM_TEMPERATURE: u8 = 31;

    /// Human-readable name for a tool sub-command.
    pub fn name(id: u8) -> &'static str {
        match id {
            INIT => "initialize tool",
            SET_TEMPERATURE => "set tool temperature",
            SET_MOTOR_1_PWM => "set motor 1 speed (PWM)",
            SET_MOTOR_2_PWM => "set motor 2 speed (PWM)",
            SET_MOTOR_1_RPM => "set motor 1 speed (RPM)",
            SET_MOTOR_2_RPM => "set motor 2 speed (RPM)",
            SET_MOTOR_1_DIRECTION => "set motor 1 direction",
            SET_MOTOR_2_DIRECTION => "set motor 2 direction",
            TOGGLE_MOTOR_1 => "toggle motor 1",
            TOGGLE_MOTOR_2 => "toggle motor 2",
            TOGGLE_FAN => "toggle fan",
            TOGGLE_VALVE => "toggle valve",
            SET_SERVO_1_POSITION => "set servo 1 position",
            SET_SERVO_2_POSITION => "set servo 2 position",
            PAUSE => "pause",
            ABORT => "abort",
            TOGGLE_ABP => "toggle automated build platform",
            SET_PLATFORM_TEMPERATURE => "set platform temperature",
            _ => "unknown tool command",
        }
    }
}
