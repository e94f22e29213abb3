//! Load a JSON document into a parameter table and report every value
//!
//! Usage:
//!   initbl-check app_ini.json --param Port:int --param Name:str
//!   initbl-check app_ini.json --prefix cfg. --param Port:int --dump out.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use initbl::{IniTable, IniTableSettings, ParamList, ParamSpec};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "initbl-check")]
#[command(about = "Validate a JSON initialization file against a parameter list")]
#[command(version)]
struct Args {
    /// JSON document to load
    file: PathBuf,

    /// Parameter as NAME:TYPE, where TYPE is int or str (repeatable)
    #[arg(short, long = "param", required = true)]
    params: Vec<ParamSpec>,

    /// Key namespace prefix (overrides settings)
    #[arg(long)]
    prefix: Option<String>,

    /// TOML settings file
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Write bound values to this file after loading
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args)?;

    let mut settings = IniTableSettings::load(args.settings.as_deref())?;
    if let Some(prefix) = &args.prefix {
        settings.namespace_prefix = prefix.clone();
    }

    let params: ParamList = args.params.iter().cloned().collect();
    let mut table = IniTable::new(&params, settings).context("Failed to build parameter table")?;

    let result = table.load_file(&args.file);

    for entry in table.entries() {
        match entry.value {
            Some(value) => println!(
                "{:>3} {:<32} {:<3} = {}",
                entry.id, entry.key, entry.param_type, value
            ),
            None => println!(
                "{:>3} {:<32} {:<3} ! {}",
                entry.id,
                entry.key,
                entry.param_type,
                entry.state.name()
            ),
        }
    }

    if let Some(path) = &args.dump {
        table.dump(path).context("Failed to dump table")?;
    }

    match result {
        Ok(loaded) => {
            info!(loaded, file = %args.file.display(), "all parameters loaded");
            Ok(())
        }
        Err(e) => {
            error!("Failed to load {}: {}", args.file.display(), e);
            Err(e.into())
        }
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = if args.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))
}
