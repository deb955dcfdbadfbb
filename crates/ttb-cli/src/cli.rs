//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// University timetable builder.
///
/// Turns scraped timetable rows into every clash-free timetable for a set of
/// subjects, filtered and sorted by your preferences.
#[derive(Debug, Parser)]
#[command(name = "ttb", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate clash-free timetables from scraped rows.
    Generate {
        /// Path to a JSON array of scraped rows (defaults to stdin).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Keep timetables spanning at most this many days.
        #[arg(long, value_name = "N")]
        max_days: Option<usize>,

        /// Require exactly --max-days days on campus, not at most.
        #[arg(long, requires = "max_days")]
        exact: bool,

        /// Allowed days, comma-separated (e.g. Mon,Tue,Wed).
        #[arg(long, value_delimiter = ',', value_name = "DAYS")]
        days: Option<Vec<String>>,

        /// Earliest acceptable activity start (HH:MM).
        #[arg(long, value_name = "HH:MM")]
        start: Option<String>,

        /// Latest acceptable activity finish (HH:MM).
        #[arg(long, value_name = "HH:MM")]
        finish: Option<String>,

        /// Show at most this many timetables.
        #[arg(short, long, value_name = "N")]
        limit: Option<usize>,

        /// Output JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Download timetable rows for the given enrolments.
    Fetch {
        /// Enrolment values as posted to the timetable form
        /// (e.g. 31251_AUT_U).
        #[arg(required = true, value_name = "ENROLMENT")]
        enrolments: Vec<String>,

        /// Write the JSON rows here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download the full subject catalogue.
    Subjects {
        /// Write the catalogue here (defaults to the configured path).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
