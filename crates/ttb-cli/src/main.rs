use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ttb_cli::commands::{fetch, generate, subjects};
use ttb_cli::{Cli, Commands, Config};
use ttb_core::RawRow;

/// Loads config and builds the timetable endpoint client.
fn endpoint_client(config_path: Option<&Path>) -> Result<(ttb_fetch::Client, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let client = ttb_fetch::Client::new(config.timetable_url.as_str())?;
    Ok((client, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    match &cli.command {
        Some(Commands::Generate {
            input,
            max_days,
            exact,
            days,
            start,
            finish,
            limit,
            json,
        }) => {
            let rows = read_rows(input.as_deref())?;
            let prefs = generate::preferences_from_flags(
                *max_days,
                *exact,
                days.as_deref(),
                start.as_deref(),
                finish.as_deref(),
            )?;
            generate::run(&rows, &prefs, *limit, *json)?;
        }
        Some(Commands::Fetch { enrolments, output }) => {
            let (client, _config) = endpoint_client(cli.config.as_deref())?;
            fetch::run(&client, enrolments, output.as_deref())?;
        }
        Some(Commands::Subjects { output }) => {
            let (client, config) = endpoint_client(cli.config.as_deref())?;
            let path = output.clone().unwrap_or(config.subjects_path);
            subjects::run(&client, &path)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

/// Reads the scraped rows from a file, or stdin when no path is given.
fn read_rows(input: Option<&Path>) -> Result<Vec<RawRow>> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read rows from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&text).context("input is not a JSON array of timetable rows")
}
