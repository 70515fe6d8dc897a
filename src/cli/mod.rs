//! CLI definitions and entry point.

use crate::attachment::{AttachmentFetcher, HttpFetcher, NoopFetcher};
use crate::config::{self, CliOverrides, ConvertConfig};
use crate::convert::{self, ConvertSummary};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

/// Convert a Nozbe account export to Org mode (see https://orgmode.org)
#[derive(Parser, Debug)]
#[command(name = "nozbe2org", author, version, about, long_about = None)]
pub struct Cli {
    /// Nozbe's data.json
    #[arg(value_name = "data.json")]
    pub input: PathBuf,

    /// Output file (combined layout, default Nozbe.org) or directory
    /// (per-project layout, default .)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Output layout: combined | per-project
    #[arg(long)]
    pub layout: Option<String>,

    /// When to add TODO/DONE to task headings: contexts | always
    #[arg(long)]
    pub state_markers: Option<String>,

    /// Handling of deleted comments: stop (drop the rest of the task's
    /// comments) | skip (drop only the deleted one)
    #[arg(long)]
    pub deleted_comments: Option<String>,

    /// Link attachments without downloading them
    #[arg(long)]
    pub no_download: bool,

    /// Directory attachments are downloaded into
    #[arg(long)]
    pub attachments_dir: Option<PathBuf>,

    /// Per-attachment download timeout in seconds (default: none)
    #[arg(long, value_name = "SECS")]
    pub download_timeout: Option<u64>,

    /// Convert only this project (repeatable, exact name)
    #[arg(long = "project", value_name = "NAME")]
    pub projects: Vec<String>,

    /// Config file (default: ./nozbe2org.yaml when present)
    #[arg(long, env = "NOZBE2ORG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output: self.output.clone(),
            layout: self.layout.clone(),
            state_markers: self.state_markers.clone(),
            deleted_comments: self.deleted_comments.clone(),
            no_download: self.no_download,
            attachments_dir: self.attachments_dir.clone(),
            download_timeout: self.download_timeout,
            projects: self.projects.clone(),
        }
    }

    /// Resolve the effective configuration for this invocation.
    ///
    /// # Errors
    ///
    /// Returns an error if a config source is unreadable or holds invalid values.
    pub fn resolve_config(&self) -> Result<ConvertConfig> {
        let layer = config::load_config(self.config.as_deref(), &self.overrides())?;
        let resolved = ConvertConfig::from_layer(&layer)?;
        debug!(?resolved, "Resolved configuration");
        Ok(resolved)
    }
}

/// Run a conversion for parsed arguments.
///
/// # Errors
///
/// Returns the first fatal error of the run.
pub fn execute(cli: &Cli) -> Result<ConvertSummary> {
    let config = cli.resolve_config()?;
    let fetcher: Box<dyn AttachmentFetcher> = if config.download {
        Box::new(HttpFetcher::new(
            config.attachments_dir.clone(),
            config.download_timeout,
        )?)
    } else {
        Box::new(NoopFetcher)
    };

    let summary = convert::convert(&cli.input, &config, fetcher.as_ref())?;
    if !cli.quiet {
        println!("{}", format_summary(&summary));
    }
    Ok(summary)
}

/// One-line human summary of a run.
#[must_use]
pub fn format_summary(summary: &ConvertSummary) -> String {
    let written = summary
        .written
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let mut line = format!(
        "Converted {} projects, {} tasks, {} comments",
        summary.render.projects, summary.render.tasks, summary.render.comments
    );
    if summary.render.skipped_comments > 0 {
        line.push_str(&format!(" ({} skipped)", summary.render.skipped_comments));
    }
    if summary.render.attachments > 0 {
        line.push_str(&format!(", {} attachments", summary.render.attachments));
    }
    if !written.is_empty() {
        line.push_str(&format!(" -> {written}"));
    }
    line
}
