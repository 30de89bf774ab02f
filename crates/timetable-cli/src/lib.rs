//! # timetable-cli: CLI Tool for the Timetable Pipeline
//!
//! Provides the `timetable` command-line interface over a data directory
//! laid out as `stage_1/` … `stage_6/`.
//!
//! ## Subcommands
//!
//! - `timetable status`: Which stage files are present.
//! - `timetable validate`: Model rules and cross-stage checks per stage.
//! - `timetable info`: Summaries of config, faculty, subjects, scheduling.
//! - `timetable load`: Load one entity and print it, optionally as JSON.
//! - `timetable schema`: List schemas or validate a file against one.
//! - `timetable export`: Write entities as JSON, CSV, or Markdown.
//! - `timetable build`: Run a stage's build scripts after checking its
//!   prerequisites.
//!
//! ```bash
//! timetable status
//! timetable validate --all --strict
//! timetable export faculty --format csv --output ./exports
//! timetable build stage3
//! ```
//!
//! Every handler returns an exit code: 0 on success, 1 on any validation or
//! load failure.

pub mod build;
pub mod export;
pub mod info;
pub mod load;
pub mod logging;
pub mod schema;
pub mod status;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use timetable_core::Settings;
use timetable_loader::DataLoader;

/// Resolve a path that may be relative to the data directory.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `data_dir` resolves there; otherwise it is taken relative to the
/// current directory.
pub fn resolve_path(path: &Path, data_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let data_relative = data_dir.join(path);
    if data_relative.exists() {
        data_relative
    } else {
        path.to_path_buf()
    }
}

/// A loader over `settings.data_dir` honoring `settings.strict_mode`.
pub fn open_loader(settings: &Settings) -> Result<DataLoader> {
    DataLoader::from_settings(settings)
        .with_context(|| format!("cannot open data directory {}", settings.data_dir.display()))
}
