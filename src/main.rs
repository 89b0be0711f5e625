use std::path::PathBuf;

use clap::Parser;

use aide::config::Config;
use aide::{alog, Assistant, Command, Result};

/// Aide - a personal assistant that weighs weather against your calendar
#[derive(Parser, Debug)]
#[command(name = "aide")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to ~/.aide/aide.toml)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (writes to ~/.aide/aide.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Print the reply as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if config.calendar.path.is_none() {
        config.calendar.path = Some(Config::calendar_path()?);
    }

    aide::log::init_with_debug(cli.debug || config.debug);
    aide::log::capture_panics();
    if cli.debug {
        alog!("Aide starting (debug mode enabled)");
    } else {
        alog!("Aide starting");
    }

    let mut assistant = Assistant::from_config(&config)?;
    let reply = assistant.dispatch(cli.command);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else if reply.success {
        println!("{}", reply.text);
    } else {
        match reply.error_kind {
            Some(kind) => eprintln!("{}: {}", kind, reply.text),
            None => eprintln!("{}", reply.text),
        }
    }

    if !reply.success {
        std::process::exit(1);
    }
    Ok(())
}
