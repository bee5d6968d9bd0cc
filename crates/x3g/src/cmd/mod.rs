use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod copy;
pub mod dump;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode and print every command in a stream.
    Dump(DumpArgs),
    /// Re-encode a stream to one or more destinations.
    Copy(CopyArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Dump(args) => dump::run(args, format),
        Command::Copy(args) => copy::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// `-` selects the standard stream.
pub fn stream_path(path: &Path) -> Option<&Path> {
    if path == Path::new("-") {
        None
    } else {
        Some(path)
    }
}

/// Parse an octal permission mask such as `644` or `0o600`.
pub fn parse_mode(value: &str) -> Result<u32, String> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| format!("invalid octal mode: {value}"))
}

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Stream to read (`-` for stdin).
    pub input: PathBuf,
    /// Stop after N commands.
    #[arg(long)]
    pub count: Option<u64>,
    /// Only walk command boundaries; do not decode fields.
    #[arg(long)]
    pub skip_decode: bool,
}

#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Stream to read (`-` for stdin).
    pub input: PathBuf,
    /// Destination to create (`-` for stdout).
    pub output: PathBuf,
    /// Additional destination receiving the same bytes (repeatable).
    #[arg(long, value_name = "PATH")]
    pub tee: Vec<PathBuf>,
    /// Permission mask for created files, in octal.
    #[arg(long, default_value = "644", value_parser = parse_mode)]
    pub mode: u32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_is_standard_stream() {
        assert_eq!(stream_path(Path::new("-")), None);
        assert_eq!(
            stream_path(Path::new("part.x3g")),
            Some(Path::new("part.x3g"))
        );
    }

    #[test]
    fn modes_are_octal() {
        assert_eq!(parse_mode("644"), Ok(0o644));
        assert_eq!(parse_mode("0o600"), Ok(0o600));
        assert!(parse_mode("999").is_err());
        assert!(parse_mode("77777").is_err());
    }
}
