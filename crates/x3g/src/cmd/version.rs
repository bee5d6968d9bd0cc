use x3g_codec::commands;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("x3g {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: x3g");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("X3G_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("max_record_size: {}", x3g_codec::MAX_RECORD_SIZE);
    println!("drain_chunk_size: {}", x3g_transport::DRAIN_CHUNK_SIZE);

    let known = commands().count();
    let blocking = commands().filter(|info| info.blocking).count();
    println!("commands: {known} ({blocking} blocking)");

    Ok(SUCCESS)
}
