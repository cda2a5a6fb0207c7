//! dsmap Application
//!
//! Native shell that drives a headless map session: imports scene files,
//! places geotagged images and exports the result as `backup.json`.

mod cli;

pub use cli::{AppError, Cli, RunReport, run};
