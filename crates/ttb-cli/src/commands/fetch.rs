//! Fetch command: download timetable rows for a set of enrolments.

use std::path::Path;

use anyhow::{Context, Result};
use ttb_fetch::Client;

use super::util::write_json;

/// Downloads the flat timetable for the given enrolments and emits the
/// extracted rows as JSON, ready for `ttb generate --input`.
pub fn run(client: &Client, enrolments: &[String], output: Option<&Path>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let rows = runtime
        .block_on(client.fetch_rows(enrolments))
        .context("failed to fetch timetable rows")?;

    write_json(output, &rows)
}
