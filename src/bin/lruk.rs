use std::fs::File;
use std::io;
use std::io::Read;

use lruk::config::ReplacerConfig;
use lruk::error::Result;
use lruk::storage::buffer::Replacer;
use lruk::trace::{self, Replay};

fn main() -> Result<()> {
    let args = clap::command!()
        .about("Replay a frame access trace through the LRU-K replacer")
        .arg(
            clap::Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file path for the replacer")
                .default_value(""),
        )
        .arg(clap::Arg::new("trace").help("The trace file to replay, read stdin if absent"))
        .get_matches();

    let file = args.get_one::<String>("config").map(String::as_str).unwrap_or_default();
    let cfg = ReplacerConfig::new(file)?;
    let loglevel = cfg.log_level.parse::<simplelog::LevelFilter>()?;
    let mut logconfig = simplelog::ConfigBuilder::new();
    simplelog::TermLogger::init(
        loglevel,
        logconfig.build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let mut script = String::new();
    match args.get_one::<String>("trace") {
        Some(filename) => File::open(filename)?.read_to_string(&mut script)?,
        None => io::stdin().read_to_string(&mut script)?,
    };
    let commands = trace::parse(&script)?;

    let mut replay = Replay::new(cfg.capacity, cfg.k)?;
    let mut stdout = io::stdout().lock();
    replay.run(&commands, &mut stdout)?;
    log::info!(
        "replayed {} commands, {} evictable frames left",
        commands.len(),
        replay.replacer().size()?
    );
    Ok(())
}
