//! # Export Subcommand
//!
//! Writes loaded entities to timestamped files as JSON, CSV, or Markdown.
//!
//! ```bash
//! timetable export faculty --stage 2 --format csv
//! timetable export assignments --semester 3 --format md --output ./out
//! timetable export all
//! ```
//!
//! CSV columns are the union of record keys in order of first appearance.
//! Nested values are written as compact JSON in a single cell.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use serde::Serialize;
use serde_json::{json, Map, Value};

use timetable_core::Settings;
use timetable_loader::DataLoader;

/// Exportable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportEntity {
    Faculty,
    Subjects,
    Assignments,
    Statistics,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Csv,
    Md,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Md => "md",
        }
    }
}

/// Arguments for the `timetable export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Entity to export.
    #[arg(value_enum)]
    pub entity: ExportEntity,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,

    /// Output directory (defaults to the configured output directory).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stage to read faculty or subjects from (1 or 2).
    #[arg(short, long, default_value_t = 2)]
    pub stage: u8,

    /// Semester filter for subjects; selects the assignments file (default 1).
    #[arg(long)]
    pub semester: Option<u8>,
}

/// One exportable table.
#[derive(Debug, Clone)]
pub struct ExportTable {
    pub title: String,
    /// Document written for JSON output.
    pub json: Value,
    /// Records written for CSV output.
    pub rows: Vec<Value>,
    /// Records written for Markdown output.
    pub markdown_rows: Vec<Value>,
}

impl ExportTable {
    fn listing(title: String, key: &str, rows: Vec<Value>) -> Self {
        let mut json = Map::new();
        json.insert(key.to_string(), Value::Array(rows.clone()));
        json.insert("count".into(), Value::from(rows.len()));
        Self {
            title,
            json: Value::Object(json),
            markdown_rows: rows.clone(),
            rows,
        }
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render in `format`.
    pub fn render(&self, format: ExportFormat) -> Result<String> {
        Ok(match format {
            ExportFormat::Json => {
                let mut out = serde_json::to_string_pretty(&self.json)?;
                out.push('\n');
                out
            }
            ExportFormat::Csv => to_csv(&self.rows),
            ExportFormat::Md => to_markdown(&self.markdown_rows, &self.title),
        })
    }
}

fn to_rows<'a, T: Serialize + 'a>(records: impl IntoIterator<Item = &'a T>) -> Result<Vec<Value>> {
    records
        .into_iter()
        .map(|r| serde_json::to_value(r).context("cannot serialize record"))
        .collect()
}

pub fn faculty_table(loader: &DataLoader, stage: u8) -> Result<ExportTable> {
    let rows = match stage {
        1 => to_rows(&loader.load_faculty()?.faculty)?,
        2 => to_rows(&loader.load_faculty_full()?.faculty)?,
        other => bail!("faculty can be exported from stage 1 or 2, not {other}"),
    };
    Ok(ExportTable::listing(format!("Faculty Data (Stage {stage})"), "faculty", rows))
}

pub fn subjects_table(
    loader: &DataLoader,
    stage: u8,
    semester: Option<u8>,
) -> Result<ExportTable> {
    let rows = match stage {
        1 => to_rows(&loader.load_subjects(semester)?.subjects)?,
        2 => {
            let file = loader.load_subjects_full()?;
            to_rows(
                file.subjects
                    .iter()
                    .filter(|s| semester.map_or(true, |n| s.semester == n)),
            )?
        }
        other => bail!("subjects can be exported from stage 1 or 2, not {other}"),
    };
    let mut title = format!("Subjects (Stage {stage})");
    if let Some(n) = semester {
        let _ = write!(title, " - Semester {n}");
    }
    Ok(ExportTable::listing(title, "subjects", rows))
}

pub fn assignments_table(loader: &DataLoader, semester: u8) -> Result<ExportTable> {
    let file = loader.load_teaching_assignments(semester)?;
    let rows = to_rows(&file.assignments)?;
    let json = json!({
        "assignments": rows,
        "count": rows.len(),
        "semester": semester,
        "metadata": serde_json::to_value(&file.metadata)?,
    });
    Ok(ExportTable {
        title: format!("Teaching Assignments - Semester {semester}"),
        json,
        markdown_rows: rows.clone(),
        rows,
    })
}

/// Statistics: the full document as JSON, one flattened row per semester
/// plus a combined row as CSV, and a metric summary as Markdown.
pub fn statistics_table(loader: &DataLoader) -> Result<ExportTable> {
    let stats = loader.load_statistics()?;

    let mut rows = Vec::with_capacity(3);
    for (kind, value) in [
        ("semester1", serde_json::to_value(&stats.semester1)?),
        ("semester3", serde_json::to_value(&stats.semester3)?),
        ("combined", serde_json::to_value(&stats.combined)?),
    ] {
        let mut row = Map::new();
        row.insert("type".into(), Value::from(kind));
        if let Value::Object(fields) = value {
            row.extend(fields);
        }
        rows.push(Value::Object(row));
    }

    let metric = |name: &str, value: Value| json!({ "Metric": name, "Value": value });
    let markdown_rows = vec![
        metric("Semester 1 Assignments", stats.semester1.total_assignments.into()),
        metric("Semester 1 Sessions/Week", stats.semester1.total_sessions.into()),
        metric("Semester 3 Assignments", stats.semester3.total_assignments.into()),
        metric("Semester 3 Sessions/Week", stats.semester3.total_sessions.into()),
        metric("Total Assignments", stats.combined.total_assignments.into()),
        metric("Total Sessions/Week", stats.combined.total_sessions.into()),
        metric("Total Hours", stats.combined.total_hours.into()),
    ];

    Ok(ExportTable {
        title: "Stage 3 Statistics".into(),
        json: serde_json::to_value(&*stats)?,
        rows,
        markdown_rows,
    })
}

fn csv_cell(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    };
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw
    }
}

fn columns(records: &[Value]) -> Vec<String> {
    let mut cols: Vec<String> = Vec::new();
    for record in records {
        match record {
            Value::Object(fields) => {
                for key in fields.keys() {
                    if !cols.iter().any(|c| c == key) {
                        cols.push(key.clone());
                    }
                }
            }
            _ => {
                if !cols.iter().any(|c| c == "value") {
                    cols.push("value".into());
                }
            }
        }
    }
    cols
}

fn field<'a>(record: &'a Value, column: &str) -> Option<&'a Value> {
    match record {
        Value::Object(fields) => fields.get(column),
        other if column == "value" => Some(other),
        _ => None,
    }
}

/// Render records as CSV with a header row. Empty input gives an empty
/// string.
pub fn to_csv(records: &[Value]) -> String {
    let cols = columns(records);
    if cols.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let header: Vec<String> = cols.iter().map(|c| csv_cell(Some(&Value::from(c.as_str())))).collect();
    out.push_str(&header.join(","));
    out.push('\n');
    for record in records {
        let cells: Vec<String> = cols.iter().map(|c| csv_cell(field(record, c))).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

fn md_cell(value: Option<&Value>) -> String {
    let raw = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    raw.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render records as a Markdown table under a `#` heading.
pub fn to_markdown(records: &[Value], title: &str) -> String {
    let mut out = format!("# {title}\n\n");
    let cols = columns(records);
    if cols.is_empty() {
        out.push_str("_No records._\n");
        return out;
    }
    let header: Vec<String> = cols.iter().map(|c| md_cell(Some(&Value::from(c.as_str())))).collect();
    let _ = writeln!(out, "| {} |", header.join(" | "));
    let _ = writeln!(out, "|{}", " --- |".repeat(cols.len()));
    for record in records {
        let cells: Vec<String> = cols.iter().map(|c| md_cell(field(record, c))).collect();
        let _ = writeln!(out, "| {} |", cells.join(" | "));
    }
    out
}

fn write_table(table: &ExportTable, format: ExportFormat, path: &Path) -> Result<()> {
    let body = table.render(format)?;
    std::fs::write(path, body).with_context(|| format!("failed to write {}", path.display()))
}

/// Export timestamp, e.g. `20261016_142501`.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Execute the export subcommand.
pub fn run_export(args: &ExportArgs, settings: &Settings) -> Result<u8> {
    export_at(args, settings, &timestamp())
}

/// Export with a fixed timestamp; file names embed `ts`.
pub fn export_at(args: &ExportArgs, settings: &Settings, ts: &str) -> Result<u8> {
    let loader = crate::open_loader(settings)?;
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| settings.output_dir());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;
    let ext = args.format.extension();

    let (table, file_name) = match args.entity {
        ExportEntity::Faculty => (
            faculty_table(&loader, args.stage)?,
            format!("faculty_stage{}_{ts}.{ext}", args.stage),
        ),
        ExportEntity::Subjects => {
            let sem = args.semester.map(|n| format!("_sem{n}")).unwrap_or_default();
            (
                subjects_table(&loader, args.stage, args.semester)?,
                format!("subjects_stage{}{sem}_{ts}.{ext}", args.stage),
            )
        }
        ExportEntity::Assignments => {
            let semester = args.semester.unwrap_or(1);
            (
                assignments_table(&loader, semester)?,
                format!("assignments_sem{semester}_{ts}.{ext}"),
            )
        }
        ExportEntity::Statistics => (statistics_table(&loader)?, format!("statistics_{ts}.{ext}")),
        ExportEntity::All => return export_all(&loader, args.format, &output_dir, ts),
    };

    let path = output_dir.join(file_name);
    write_table(&table, args.format, &path)?;
    tracing::info!(path = %path.display(), records = table.len(), "exported");
    println!("OK: Exported {} record(s) to {}", table.len(), path.display());
    Ok(0)
}

fn export_all(loader: &DataLoader, format: ExportFormat, output_dir: &Path, ts: &str) -> Result<u8> {
    let export_dir = output_dir.join(format!("export_{ts}"));
    std::fs::create_dir_all(&export_dir)
        .with_context(|| format!("failed to create {}", export_dir.display()))?;

    let items: [(&str, &str, Result<ExportTable>); 5] = [
        ("Faculty", "faculty", faculty_table(loader, 2)),
        ("Subjects", "subjects", subjects_table(loader, 2, None)),
        ("Assignments Sem 1", "assignments_sem1", assignments_table(loader, 1)),
        ("Assignments Sem 3", "assignments_sem3", assignments_table(loader, 3)),
        ("Statistics", "statistics", statistics_table(loader)),
    ];

    let mut exported = Vec::new();
    for (label, stem, table) in items {
        let outcome = table.and_then(|t| {
            let path = export_dir.join(format!("{stem}.{}", format.extension()));
            write_table(&t, format, &path)?;
            Ok(t.len())
        });
        match outcome {
            Ok(count) => exported.push((label, count)),
            Err(e) => println!("WARN: Could not export {}: {e:#}", label.to_lowercase()),
        }
    }

    if format == ExportFormat::Json {
        match loader.load_config() {
            Ok(config) => {
                let path = export_dir.join("config.json");
                let body = serde_json::to_string_pretty(&*config)?;
                std::fs::write(&path, body + "\n")
                    .with_context(|| format!("failed to write {}", path.display()))?;
                exported.push(("Config", 1));
            }
            Err(e) => println!("WARN: Could not export config: {e}"),
        }
    }

    if exported.is_empty() {
        println!("FAIL: Nothing exported to {}", export_dir.display());
        return Ok(1);
    }
    println!("OK: Export complete, files saved to {}", export_dir.display());
    for (label, count) in &exported {
        println!("  {label:<20} {count:>6}");
    }
    Ok(0)
}
