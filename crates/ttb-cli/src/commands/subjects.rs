//! Subjects command: download the full subject catalogue.

use std::path::Path;

use anyhow::{Context, Result};
use ttb_fetch::Client;

use super::util::write_json;

/// Downloads the subject catalogue and writes it as a JSON array sorted by
/// enrolment value.
pub fn run(client: &Client, output: &Path) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let subjects = runtime
        .block_on(client.fetch_subject_list())
        .context("failed to fetch subject catalogue")?;

    write_json(Some(output), &subjects)?;
    println!("Saved {} subjects to {}", subjects.len(), output.display());
    Ok(())
}
