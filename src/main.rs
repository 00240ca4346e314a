use std::path::Path;

use clap::{crate_description, crate_name, crate_version, Arg, ArgAction, Command};
use log::LevelFilter;

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .arg(
            Arg::new("gamelist")
                .short('g')
                .long("gamelist")
                .help("Path to the gamelist.xml describing the games to package"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Directory recipes are written to (default: 'recipes' next to the gamelist)"),
        )
        .arg(
            Arg::new("core")
                .short('c')
                .long("core")
                .help("Path to the emulator core binary bundled into every recipe"),
        )
        .arg(
            Arg::new("bios")
                .short('b')
                .long("bios")
                .help("Directory of BIOS files copied flat into every recipe's roms folder"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let gamelist_path = matches.get_one::<String>("gamelist").map(Path::new);
    let core_path = matches.get_one::<String>("core").map(Path::new);
    let bios_dir = matches.get_one::<String>("bios").map(Path::new);
    let output_dir = matches.get_one::<String>("output").map(Path::new);

    resep::build_recipes(gamelist_path, core_path, bios_dir, output_dir)?;

    Ok(())
}
