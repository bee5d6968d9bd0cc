use serde::Serialize;
use tracing::{debug, info};
use x3g_codec::{CommandReader, CommandWriter, ReadOutcome};
use x3g_transport::StdioTransport;

use crate::cmd::{stream_path, CopyArgs};
use crate::exit::{codec_error, transport_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::OutputFormat;

#[derive(Debug, Serialize)]
struct CopySummary {
    commands: u64,
    bytes_read: u64,
    /// Bytes written per destination: output first, then each tee.
    bytes_written: Vec<u64>,
}

pub fn run(args: CopyArgs, format: OutputFormat) -> CliResult<i32> {
    let to_stdout = stream_path(&args.output).is_none();

    let mut reader = CommandReader::open(stream_path(&args.input))
        .map_err(|err| codec_error("open input failed", err))?;
    let mut writer = CommandWriter::create(stream_path(&args.output), args.mode)
        .map_err(|err| codec_error("create output failed", err))?;
    for path in &args.tee {
        let tee = StdioTransport::open(stream_path(path), true, args.mode)
            .map_err(|err| transport_error("create tee failed", err))?;
        writer.add_writer(tee);
        debug!(path = %path.display(), "added tee destination");
    }

    let copied = pump(&mut reader, &mut writer);

    let summary = CopySummary {
        commands: writer.commands_written(),
        bytes_read: reader.bytes_read(),
        bytes_written: writer.bytes_written(),
    };
    let closed_out = writer.close();
    let closed_in = reader.close();
    copied?;
    closed_out.map_err(|err| codec_error("close output failed", err))?;
    closed_in.map_err(|err| codec_error("close input failed", err))?;

    info!(
        commands = summary.commands,
        bytes_read = summary.bytes_read,
        "copy complete"
    );
    if !to_stdout {
        print_summary(&summary, format);
    }
    Ok(SUCCESS)
}

fn pump(reader: &mut CommandReader, writer: &mut CommandWriter) -> CliResult<()> {
    loop {
        let offset = reader.bytes_read();
        match reader
            .read_command()
            .map_err(|err| codec_error(&format!("read failed at offset {offset}"), err))?
        {
            ReadOutcome::Command(cmd) => writer
                .write_command(&cmd)
                .map_err(|err| codec_error("write failed", err))?,
            ReadOutcome::EndOfStream => return Ok(()),
            ReadOutcome::Unrecognized { tag } => {
                return Err(CliError::new(
                    DATA_INVALID,
                    format!("unrecognized command {tag} at offset {offset}"),
                ));
            }
        }
    }
}

fn print_summary(summary: &CopySummary, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(summary).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Raw => {}
        OutputFormat::Table | OutputFormat::Pretty => {
            let written = summary
                .bytes_written
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            println!(
                "copied {} commands ({} bytes) to {} destination(s): {written}",
                summary.commands,
                summary.bytes_read,
                summary.bytes_written.len()
            );
        }
    }
}
