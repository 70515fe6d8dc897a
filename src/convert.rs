//! End-to-end conversion: read the export, load it, render, write `.org` files.

use crate::attachment::AttachmentFetcher;
use crate::config::{ConvertConfig, OutputLayout};
use crate::error::{ConvertError, Result};
use crate::loader::{Dataset, LoadStats};
use crate::model::{Export, ProjectKey};
use crate::org::OrgDocument;
use crate::render::{RenderStats, Renderer, TASKS_HEADING, project_heading};
use crate::util::progress::ProgressTracker;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File extension of generated outline documents.
pub const ORG_EXTENSION: &str = "org";

/// What a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertSummary {
    pub load: LoadStats,
    pub render: RenderStats,
    pub written: Vec<PathBuf>,
}

/// Read and decode a Nozbe `data.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid export.
pub fn read_export(path: &Path) -> Result<Export> {
    info!("Opening file {}", path.display());
    let content = fs::read_to_string(path).map_err(|source| {
        ConvertError::with_context(format!("Failed to read '{}'", path.display()), source)
    })?;
    info!("JSON-decoding {} bytes of data", content.len());
    Ok(serde_json::from_str(&content)?)
}

/// Projects to convert, in load order, restricted to `names` when given.
///
/// # Errors
///
/// Returns [`ConvertError::ProjectNotFound`] for a name not in the export.
pub fn select_projects(dataset: &Dataset, names: &[String]) -> Result<Vec<ProjectKey>> {
    if names.is_empty() {
        return Ok(dataset.projects().map(|(key, _)| key).collect());
    }

    let mut wanted = Vec::with_capacity(names.len());
    for name in names {
        let key = dataset
            .project_by_name(name)
            .ok_or_else(|| ConvertError::ProjectNotFound { name: name.clone() })?;
        wanted.push(key);
    }
    Ok(dataset
        .projects()
        .map(|(key, _)| key)
        .filter(|key| wanted.contains(key))
        .collect())
}

/// File name for a project in the per-project layout.
#[must_use]
pub fn project_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') || c.is_control() { '_' } else { c })
        .collect();
    format!("{safe}.{ORG_EXTENSION}")
}

/// Render every selected project as a top-level heading of one document.
///
/// # Errors
///
/// Fails on any render error.
pub fn render_combined(
    dataset: &Dataset,
    projects: &[ProjectKey],
    renderer: &mut Renderer<'_>,
) -> Result<OrgDocument> {
    let progress = ProgressTracker::new(projects.len() as u64, "Converting projects");
    let mut document = OrgDocument::new();
    for &key in projects {
        let name = &dataset.project(key).name;
        progress.set_message(name.clone());
        document.push(renderer.render_section(key, project_heading(name), true)?);
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(document)
}

/// Render one project as a standalone document.
///
/// # Errors
///
/// Fails on any render error.
pub fn render_project_document(key: ProjectKey, renderer: &mut Renderer<'_>) -> Result<OrgDocument> {
    let mut document = OrgDocument::new();
    if let Some(description) = renderer.description_block(key) {
        document.push_preamble(&description);
    }
    document.push(renderer.render_section(key, TASKS_HEADING, false)?);
    Ok(document)
}

/// Convert a loaded dataset and write the documents the layout asks for.
///
/// In the per-project layout every file is written as soon as its project
/// renders, so a later failure leaves earlier files complete on disk.
///
/// # Errors
///
/// Fails on unknown project names, render errors, or write errors.
pub fn convert_dataset(
    dataset: &Dataset,
    config: &ConvertConfig,
    fetcher: &dyn AttachmentFetcher,
) -> Result<ConvertSummary> {
    let projects = select_projects(dataset, &config.projects)?;
    let mut renderer = Renderer::new(dataset, fetcher, config.render_options());
    let mut written = Vec::new();

    match config.layout {
        OutputLayout::Combined => {
            let document = render_combined(dataset, &projects, &mut renderer)?;
            write_document(&config.output, &document)?;
            written.push(config.output.clone());
        }
        OutputLayout::PerProject => {
            fs::create_dir_all(&config.output).map_err(|source| ConvertError::Write {
                path: config.output.clone(),
                source,
            })?;
            let progress = ProgressTracker::new(projects.len() as u64, "Converting projects");
            for &key in &projects {
                let name = &dataset.project(key).name;
                progress.set_message(name.clone());
                let document = render_project_document(key, &mut renderer)?;
                let path = config.output.join(project_file_name(name));
                write_document(&path, &document)?;
                written.push(path);
                progress.inc(1);
            }
            progress.finish_and_clear();
        }
    }

    Ok(ConvertSummary {
        load: dataset.stats(),
        render: renderer.stats(),
        written,
    })
}

/// Full pipeline from `data.json` to `.org` output.
///
/// # Errors
///
/// Any load, render, download or write failure aborts the run.
pub fn convert(
    input: &Path,
    config: &ConvertConfig,
    fetcher: &dyn AttachmentFetcher,
) -> Result<ConvertSummary> {
    let export = read_export(input)?;
    let dataset = Dataset::load(&export, config.load_options())?;
    convert_dataset(&dataset, config, fetcher)
}

fn write_document(path: &Path, document: &OrgDocument) -> Result<()> {
    info!("Writing {}", path.display());
    fs::write(path, document.to_org_string()).map_err(|source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    })
}
