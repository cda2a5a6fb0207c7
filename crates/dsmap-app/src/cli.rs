//! Command-line arguments and the batch run they describe.

use clap::Parser;
use dsmap_core::scene::EXPORT_FILE_NAME;
use dsmap_core::storage::DirectorySink;
use dsmap_core::{
    HeadlessView, MapEvent, MapSession, NotificationLevel, SaveError, SessionConfig, SessionError,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("output error: {0}")]
    Save(#[from] SaveError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[derive(Parser, Debug)]
#[command(
    name = "dsmap",
    version,
    about = "Build a dsmap scene from GeoJSON files and geotagged images"
)]
pub struct Cli {
    /// Session config (JSON). Missing fields take defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Map title
    #[arg(long)]
    pub title: Option<String>,

    /// GeoJSON or dsmap export to import (repeatable)
    #[arg(long = "import", value_name = "FILE")]
    pub imports: Vec<PathBuf>,

    /// Geotagged image to place as a marker (repeatable)
    #[arg(long = "image", value_name = "FILE")]
    pub images: Vec<PathBuf>,

    /// Put the images in a new layer group instead of the default one
    #[arg(long)]
    pub images_group: Option<String>,

    /// Output directory (default: the user's download directory)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Print the export to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,
}

/// Summary of a finished run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub groups: usize,
    pub features: usize,
    /// Inputs that were skipped, with the reason.
    pub skipped: Vec<String>,
    /// Where the export was written, unless it went to stdout.
    pub output: Option<PathBuf>,
    /// The exported document.
    pub json: String,
}

fn read(path: &Path) -> Result<Vec<u8>, AppError> {
    fs::read(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read one batch input. An unreadable file is logged and skipped.
fn read_input(path: &Path, report: &mut RunReport) -> Option<Vec<u8>> {
    match read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::error!("{}", e);
            report.skipped.push(path.display().to_string());
            None
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig, AppError> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let text = fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    SessionConfig::from_json(&text).map_err(|source| AppError::Config {
        path: path.to_path_buf(),
        source,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run a batch session. Unreadable or invalid inputs are skipped and reported.
pub fn run(cli: &Cli) -> Result<RunReport, AppError> {
    let config = load_config(cli.config.as_deref())?;
    let view = HeadlessView::new(config.initial_center, config.initial_zoom);
    let mut session = MapSession::new(config, view);
    if let Some(title) = &cli.title {
        session.title = title.clone();
    }

    let mut report = RunReport::default();

    for path in &cli.imports {
        let Some(bytes) = read_input(path, &mut report) else {
            continue;
        };
        log::info!("Importing {}", path.display());
        if !session.dispatch(MapEvent::SceneFileRead { bytes }) {
            report.skipped.push(path.display().to_string());
        }
    }

    if !cli.images.is_empty() {
        if let Some(label) = &cli.images_group {
            let id = session.create_layer_group();
            session.rename_layer_group(id, label.clone())?;
        }
        for path in &cli.images {
            let Some(bytes) = read_input(path, &mut report) else {
                continue;
            };
            let name = file_name(path);
            if !session.dispatch(MapEvent::ImageRead { name, bytes }) {
                report.skipped.push(path.display().to_string());
            }
        }
    }

    for note in session.drain_notifications() {
        match note.level {
            NotificationLevel::Info => log::info!("{}", note.message),
            NotificationLevel::Warning => log::warn!("{}", note.message),
            NotificationLevel::Error => log::error!("{}", note.message),
        }
    }

    report.groups = session.layer_groups().len();
    report.features = session.feature_count();
    report.json = session.export_scene()?;

    if !cli.stdout {
        let mut sink = match &cli.out {
            Some(dir) => DirectorySink::new(dir.clone())?,
            None => DirectorySink::default_location()?,
        };
        session.save_scene(&mut sink)?;
        report.output = Some(sink.file_path(EXPORT_FILE_NAME));
    }

    log::info!(
        "'{}': {} groups, {} features",
        session.title,
        report.groups,
        report.features
    );
    Ok(report)
}
