use std::fmt::Write as _;
use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::{json, Map, Value};
use x3g_codec::record::{AxisLimits, FindAxes, WaitFor};
use x3g_codec::{Command, Record, SkippedCommand};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One dumped command, ready for display.
#[derive(Debug, Serialize)]
pub struct CommandOutput {
    pub index: u64,
    /// Byte offset of the tag within the stream.
    pub offset: u64,
    pub tag: u8,
    pub name: &'static str,
    pub length: usize,
    pub blocking: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl CommandOutput {
    pub fn decoded(index: u64, offset: u64, cmd: &Command) -> Self {
        Self {
            index,
            offset,
            tag: cmd.tag(),
            name: cmd.description(),
            length: cmd.wire_len(),
            blocking: cmd.is_blocking(),
            fields: Some(record_fields(cmd.record())),
            raw: Some(hex(cmd.raw())),
        }
    }

    pub fn skipped(index: u64, offset: u64, cmd: &SkippedCommand) -> Self {
        Self {
            index,
            offset,
            tag: cmd.tag,
            name: cmd.description,
            length: cmd.wire_len,
            blocking: cmd.blocking,
            fields: None,
            raw: None,
        }
    }

    fn fields_summary(&self) -> String {
        self.fields.as_ref().map_or_else(String::new, |fields| {
            fields
                .iter()
                .map(|(k, v)| format!("{k}={}", plain(v)))
                .collect::<Vec<_>>()
                .join(" ")
        })
    }
}

/// Accumulates output so table mode can render a single table.
pub struct Printer {
    format: OutputFormat,
    rows: Vec<CommandOutput>,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            rows: Vec::new(),
        }
    }

    pub fn print(&mut self, out: CommandOutput, raw: Option<&[u8]>) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputFormat::Table => self.rows.push(out),
            OutputFormat::Pretty => {
                let marker = if out.blocking { " [blocking]" } else { "" };
                println!(
                    "#{} @{} {} ({}) len={}{marker} {}",
                    out.index,
                    out.offset,
                    out.tag,
                    out.name,
                    out.length,
                    out.fields_summary()
                );
            }
            OutputFormat::Raw => {
                if let Some(raw) = raw {
                    print_raw(raw);
                }
            }
        }
    }

    /// Flush buffered rows. Only table mode buffers.
    pub fn finish(self) {
        if self.format != OutputFormat::Table || self.rows.is_empty() {
            return;
        }
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["#", "OFFSET", "TAG", "COMMAND", "LEN", "BLOCKING", "FIELDS"]);
        for row in &self.rows {
            table.add_row(vec![
                row.index.to_string(),
                row.offset.to_string(),
                row.tag.to_string(),
                row.name.to_string(),
                row.length.to_string(),
                if row.blocking { "yes" } else { "no" }.to_string(),
                row.fields_summary(),
            ]);
        }
        println!("{table}");
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

fn find_axes(f: &FindAxes) -> Value {
    json!({ "flags": f.flags, "feedrate": f.feedrate, "timeout": f.timeout })
}

fn wait_for(w: &WaitFor) -> Value {
    json!({ "index": w.index, "ping_delay": w.ping_delay, "timeout": w.timeout })
}

fn axis_limits(l: &AxisLimits) -> Value {
    json!({ "x": l.x, "y": l.y, "z": l.z, "a": l.a })
}

/// Named field values of a record.
pub fn record_fields(record: &Record) -> Map<String, Value> {
    let value = match record {
        Record::QueuePoint(p) => json!({
            "kind": format!("{:?}", p.kind),
            "x": p.x, "y": p.y, "z": p.z, "a": p.a, "b": p.b,
            "rate": p.rate, "rel": p.rel,
            "distance": p.distance, "feedrate_mult_64": p.feedrate_mult_64
        }),
        Record::SetPosition(p) => json!({ "x": p.x, "y": p.y, "z": p.z }),
        Record::FindAxesMinimums(f) | Record::FindAxesMaximums(f) => find_axes(f),
        Record::Delay(d) => json!({ "millis": d.millis }),
        Record::ChangeTool(c) => json!({ "index": c.index }),
        Record::WaitForTool(w) | Record::WaitForPlatform(w) => wait_for(w),
        Record::ToolCommand(t) => json!({
            "index": t.index,
            "subcommand": t.subcommand,
            "subcommand_name": t.subcommand_name(),
            "value": t.value(),
            "payload": hex(&t.payload)
        }),
        Record::EnableAxes(m) => json!({ "axes": m.axes & 0x1f, "enable": m.axes & 0x80 != 0 }),
        Record::StoreHomePositions(m) | Record::RecallHomePositions(m) => {
            json!({ "axes": m.axes })
        }
        Record::SetPositionExt(p) => {
            json!({ "x": p.x, "y": p.y, "z": p.z, "a": p.a, "b": p.b })
        }
        Record::SetPotValue(p) => json!({ "axis": p.axis, "value": p.value }),
        Record::SetRgbLed(l) => json!({
            "red": l.red, "green": l.green, "blue": l.blue,
            "blink_rate": l.blink_rate, "effect": l.effect
        }),
        Record::SetBeep(b) => json!({
            "frequency": b.frequency, "duration": b.duration, "effect": b.effect
        }),
        Record::PauseForButton(p) => json!({
            "mask": p.mask, "timeout": p.timeout, "timeout_behavior": p.timeout_behavior
        }),
        Record::DisplayMessage(m) => json!({
            "options": m.options, "x": m.x, "y": m.y, "timeout": m.timeout,
            "message": m.text()
        }),
        Record::SetBuildPercent(p) => json!({ "percentage": p.percentage }),
        Record::QueueSong(s) => json!({ "song_id": s.song_id }),
        Record::ResetToFactory(r) => json!({ "options": r.options }),
        Record::BuildStart(b) => json!({ "steps": b.steps, "name": b.text() }),
        Record::BuildEnd(b) => json!({ "flags": b.flags }),
        Record::SetAccelerationToggle(t) | Record::SetAcceleration(t) => {
            json!({ "enabled": t.enabled })
        }
        Record::StreamVersion(v) => json!({
            "version": format!("{}.{}", v.version_high, v.version_low),
            "bot_type": format!("0x{:04X}", v.bot_type)
        }),
        Record::PauseAtZ(p) => json!({ "z": p.z }),
        Record::SetMaxAccel(l) | Record::SetMaxFeedrate(l) => axis_limits(l),
        Record::SetDefaultAccel(a) => json!({ "s": a.s, "t": a.t }),
        Record::SetAdvancedAccel(a) => json!({ "s": a.s, "t": a.t, "x": a.x, "z": a.z }),
        Record::SetFilamentDiameter(d) => json!({ "d": d.d }),
        Record::SetAdvanceK(k) => json!({ "s": k.s, "k": k.k }),
        Record::SetExtruderStepsMm(s) => json!({ "a": s.a }),
        Record::MoodSetRgb(m) => json!({
            "r": m.r, "g": m.g, "b": m.b,
            "fade_speed": m.fade_speed, "write_to_eeprom": m.write_to_eeprom
        }),
        Record::MoodSetHsb(m) => json!({
            "h": m.h, "s": m.s, "b": m.b, "write_to_eeprom": m.write_to_eeprom
        }),
        Record::MoodPlayScript(m) => json!({
            "script_id": m.script_id, "write_to_eeprom": m.write_to_eeprom
        }),
        Record::BuzzerRepeats(b) => json!({ "repeats": b.repeats }),
        Record::BuzzerBuzz(b) => json!({
            "buzzes": b.buzzes, "duration": b.duration, "repeats": b.repeats
        }),
        Record::SetAxisStepsMm(s) => {
            let [x, y, z, a] = s.as_f64();
            json!({ "x": x, "y": y, "z": z, "a": a })
        }
    };
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
