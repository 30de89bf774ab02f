//! Process-wide tracing setup for the `timetable` binary.
//!
//! The level starts from `Settings::log_level`; `-v` flags raise it and
//! `-q` drops it to errors only. Output goes to stderr, or to
//! `Settings::log_file` when set, as text or JSON lines.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use timetable_core::{LogFormat, LogLevel, Settings};

/// Filter directive for the given settings level and CLI flags.
pub fn filter_directive(level: LogLevel, verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => level.as_filter_directive(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. Call once, at startup.
pub fn init(settings: &Settings, verbose: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::new(filter_directive(settings.log_level, verbose, quiet));

    let (writer, ansi) = match &settings.log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("cannot create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .with_ansi(ansi);

    let installed = match settings.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("cannot install log subscriber: {e}"))
}
