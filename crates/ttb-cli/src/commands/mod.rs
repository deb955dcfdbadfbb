//! CLI subcommand implementations.

pub mod fetch;
pub mod generate;
pub mod subjects;
pub mod util;
