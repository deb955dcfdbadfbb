//! Shared output helpers.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Pretty-prints a value as JSON to the given path, or stdout when no path
/// is given.
pub fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), "wrote output file");
        }
        None => println!("{json}"),
    }
    Ok(())
}
