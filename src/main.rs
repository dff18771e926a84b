//! Tunnel Settings Command Line Tool
//!
//! Resolves the gateway settings from the process environment and secret
//! files, then prints the redacted summary.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::{error, info};

use tunnel_settings::common::{init_logger, Result};
use tunnel_settings::config::{EnvSource, SettingsBuilder};
use tunnel_settings::{dns, splash, APP_NAME, VERSION};

/// Summary output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented tree
    Text,
    /// Pretty printed JSON
    Json,
}

/// Tunnel Settings: resolve and print the VPN gateway settings
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Log level
    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Summary output format
    #[clap(long, value_enum, default_value = "text")]
    format: Format,

    /// Directory secret files are read from
    #[clap(long, env = "SECRETS_DIR", default_value = tunnel_settings::config::defaults::SECRETS_DIR)]
    secrets_dir: PathBuf,
}

fn main() -> ExitCode {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logger
    init_logger(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    for line in splash::banner(chrono::Local::now().date_naive()) {
        info!("{}", line);
    }

    info!("Starting {} v{}", APP_NAME, VERSION);

    let env = EnvSource::from_process();
    let settings = SettingsBuilder::new()
        .with_env(env.clone())
        .with_secrets(env, &args.secrets_dir)
        .build()?;

    let dns_settings = settings.dns();
    if !dns_settings.dot_enabled() {
        dns::plaintext_target(&dns_settings, false);
    }

    let mut stdout = io::stdout().lock();
    match args.format {
        Format::Text => writeln!(stdout, "{}", settings)?,
        Format::Json => writeln!(stdout, "{}", settings.to_redacted_json()?)?,
    }

    Ok(())
}
