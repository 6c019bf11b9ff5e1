use crate::{
    brief::BriefReport,
    error::{Error, Result},
    financial::FinancialReport,
    reply::DraftedReply,
    study::StudyAnswer,
};
use serde::Serialize;
use std::{
    fmt::Write as _,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Presentation format for workflow results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text
    #[default]
    Text,
    /// Markdown with headings and tables
    Markdown,
    /// Pretty-printed JSON with a generation timestamp
    Json,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Markdown => "md",
            Self::Json => "json",
        }
    }
}

/// A workflow result that can be presented to the user.
pub trait Report: Serialize {
    /// Renders the result as plain text.
    fn to_text(&self) -> String;

    /// Renders the result as Markdown.
    fn to_markdown(&self) -> String;
}

/// Returns `path`, adding the format's extension when it has none.
#[must_use]
pub fn output_path(path: &Path, format: OutputFormat) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(format.extension())
    }
}

#[derive(Serialize)]
struct JsonEnvelope<'a, R> {
    generated_at: String,
    #[serde(flatten)]
    report: &'a R,
}

/// Renders `report` in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render<R: Report>(report: &R, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_text()),
        OutputFormat::Markdown => Ok(report.to_markdown()),
        OutputFormat::Json => {
            let envelope = JsonEnvelope {
                generated_at: chrono::Local::now()
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                report,
            };
            Ok(serde_json::to_string_pretty(&envelope)?)
        }
    }
}

impl Report for FinancialReport {
    fn to_text(&self) -> String {
        let width = self
            .rows
            .iter()
            .map(|row| row.measure.chars().count())
            .max()
            .unwrap_or(0)
            .max("Measure".len());

        let mut out = format!("{:<width$}  Value\n", "Measure");
        for row in &self.rows {
            let _ = writeln!(out, "{:<width$}  {}", row.measure, row.value);
        }
        out
    }

    fn to_markdown(&self) -> String {
        let mut out = String::from("| Measure | Value |\n|---|---|\n");
        for row in &self.rows {
            let _ = writeln!(
                out,
                "| {} | {} |",
                escape_cell(&row.measure),
                escape_cell(&row.value)
            );
        }
        out
    }
}

impl Report for BriefReport {
    fn to_text(&self) -> String {
        let mut out = String::new();
        for summary in &self.summaries {
            let _ = writeln!(
                out,
                "--- {} Summary ---\n{}\n",
                summary.style.label(),
                summary.text
            );
        }
        for summary in &self.summaries {
            let _ = writeln!(
                out,
                "Keyword overlap score for {}: {:.4}",
                summary.style.label(),
                summary.score
            );
        }
        out.push('\n');
        out.push_str(&self.best_summary_text());
        out.push('\n');
        out
    }

    fn to_markdown(&self) -> String {
        let mut out = String::from("# News Brief\n\n");
        for summary in &self.summaries {
            let _ = writeln!(
                out,
                "## {}\n\n_Keyword score: {:.4}_\n\n{}\n",
                summary.style.label(),
                summary.score,
                summary.text
            );
        }
        let _ = writeln!(
            out,
            "## Best Summary\n\nSelected by keywords: **{}**\n\n{}",
            self.best.label, self.best.text
        );
        out
    }
}

impl Report for StudyAnswer {
    fn to_text(&self) -> String {
        format!("{}\n", self.answer)
    }

    fn to_markdown(&self) -> String {
        format!(
            "## Answer\n\n{}\n\n## Context ({}, score {:.4})\n\n> {}\n",
            self.answer, self.context.label, self.context.score, self.context.text
        )
    }
}

impl Report for DraftedReply {
    fn to_text(&self) -> String {
        format!("{}\n", self.reply)
    }

    fn to_markdown(&self) -> String {
        format!("## Reply ({} tone)\n\n{}\n", self.tone, self.reply)
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Persists rendered output files.
#[derive(Debug, Clone, Copy)]
pub struct Writer {
    backup_existing: bool,
}

impl Default for Writer {
    fn default() -> Self {
        Self {
            backup_existing: true,
        }
    }
}

impl Writer {
    /// Creates a writer; `backup_existing` keeps a copy of overwritten files.
    #[must_use]
    pub const fn new(backup_existing: bool) -> Self {
        Self { backup_existing }
    }

    /// Writes `content` to `path`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory, backup, or file cannot be written.
    pub fn write(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        self.write_file_atomic(path, content)?;
        info!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }

    /// Writes a file atomically with optional backup.
    ///
    /// # Process
    ///
    /// 1. Creates backup if file exists and backup is enabled
    /// 2. Writes content to temporary file
    /// 3. Syncs temporary file to disk
    /// 4. Renames temporary file to target path
    fn write_file_atomic(&self, path: &Path, content: &str) -> Result<()> {
        if path.exists() && self.backup_existing {
            Self::backup_file(path)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut temp_file = fs::File::create(&temp_path).map_err(|e| Error::io(&temp_path, e))?;

        let written = temp_file
            .write_all(content.as_bytes())
            .and_then(|()| temp_file.sync_all());
        drop(temp_file);

        if let Err(e) = written {
            Self::remove_temp(&temp_path);
            return Err(Error::io(&temp_path, e));
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            Self::remove_temp(&temp_path);
            return Err(Error::io(path, e));
        }
        Ok(())
    }

    /// Removes a leftover temporary file after a failed write.
    fn remove_temp(temp_path: &Path) {
        if let Err(e) = fs::remove_file(temp_path) {
            debug!("Could not remove {}: {}", temp_path.display(), e);
        }
    }

    /// Creates a timestamped backup of an existing file.
    fn backup_file(path: &Path) -> Result<()> {
        let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S%f");

        let filename = path
            .file_name()
            .ok_or_else(|| Error::config("Invalid file path"))?
            .to_string_lossy();

        let backup_path = path.with_file_name(format!("{filename}.backup.{timestamp}"));
        fs::copy(path, &backup_path).map_err(|e| Error::io(&backup_path, e))?;

        debug!("Created backup: {}", backup_path.display());
        Ok(())
    }
}
