use x3g_codec::{CommandReader, ReadOutcome, MAX_RECORD_SIZE};

use crate::cmd::{stream_path, DumpArgs};
use crate::exit::{codec_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{CommandOutput, OutputFormat, Printer};

pub fn run(args: DumpArgs, format: OutputFormat) -> CliResult<i32> {
    let mut reader = CommandReader::open(stream_path(&args.input))
        .map_err(|err| codec_error("open failed", err))?;
    let mut printer = Printer::new(format);

    let result = walk(&mut reader, &mut printer, &args);
    printer.finish();
    result?;

    tracing::debug!(
        commands = reader.commands_read(),
        bytes = reader.bytes_read(),
        "dump complete"
    );
    reader
        .close()
        .map_err(|err| codec_error("close failed", err))?;
    Ok(SUCCESS)
}

fn walk(reader: &mut CommandReader, printer: &mut Printer, args: &DumpArgs) -> CliResult<()> {
    let mut index = 0u64;
    let mut raw = [0u8; MAX_RECORD_SIZE];

    while args.count.is_none_or(|count| index < count) {
        let offset = reader.bytes_read();
        let tag = if args.skip_decode {
            match reader
                .skip_command()
                .map_err(|err| read_error(offset, err))?
            {
                ReadOutcome::Command(cmd) => {
                    printer.print(CommandOutput::skipped(index, offset, &cmd), None);
                    None
                }
                ReadOutcome::EndOfStream => break,
                ReadOutcome::Unrecognized { tag } => Some(tag),
            }
        } else {
            let read = reader
                .read_command_raw(&mut raw)
                .map_err(|err| read_error(offset, err))?;
            match read.outcome {
                ReadOutcome::Command(cmd) => {
                    let out = CommandOutput::decoded(index, offset, &cmd);
                    printer.print(out, Some(&raw[..read.raw_len]));
                    None
                }
                ReadOutcome::EndOfStream => break,
                ReadOutcome::Unrecognized { tag } => Some(tag),
            }
        };

        if let Some(tag) = tag {
            return Err(CliError::new(
                DATA_INVALID,
                format!("unrecognized command {tag} at offset {offset}"),
            ));
        }
        index += 1;
    }
    Ok(())
}

fn read_error(offset: u64, err: x3g_codec::CodecError) -> CliError {
    codec_error(&format!("read failed at offset {offset}"), err)
}
