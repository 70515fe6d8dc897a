//! Renders a loaded [`Dataset`] into Org outline nodes.
//!
//! One project becomes one section heading holding a level-2 heading per task.
//! Comments render oldest first (the export lists them newest first) as body
//! blocks under the task heading. File comments download their first upload
//! as a side effect.

use crate::attachment::{AttachmentFetcher, local_file_name};
use crate::error::{ConvertError, Result};
use crate::loader::Dataset;
use crate::model::{Comment, CommentKind, ProjectKey, Task};
use crate::org::OrgNode;
use crate::util::time::org_date_from_nozbe;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Heading of the per-project task section, and the display name of Nozbe's
/// `Inbox` project.
pub const TASKS_HEADING: &str = "Tasks";

const INBOX_PROJECT: &str = "Inbox";

const SECTION_LEVEL: usize = 1;
const TASK_LEVEL: usize = 2;

const DESCRIPTION_INDENT_LEVEL: usize = 1;
const COMMENT_INDENT_LEVEL: usize = 2;
const SCHEDULE_INDENT: &str = "   ";

/// When a task heading gets a `TODO`/`DONE` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateMarkers {
    /// Only tasks carrying at least one context.
    #[default]
    Contexts,
    /// Every task.
    Always,
}

impl StateMarkers {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contexts => "contexts",
            Self::Always => "always",
        }
    }
}

impl fmt::Display for StateMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateMarkers {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "contexts" | "context" => Ok(Self::Contexts),
            "always" => Ok(Self::Always),
            other => Err(ConvertError::config(format!(
                "state-markers must be 'contexts' or 'always', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub state_markers: StateMarkers,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub projects: usize,
    pub tasks: usize,
    pub comments: usize,
    pub skipped_comments: usize,
    pub attachments: usize,
}

/// Indentation for body text at `level`.
#[must_use]
pub fn indent(level: usize) -> String {
    " ".repeat(level + 1)
}

/// Indent every line of a markdown body.
#[must_use]
pub fn markdown_block(level: usize, body: &str) -> String {
    let pad = indent(level);
    format!("{pad}{}\n", body.replace('\n', &format!("\n{pad}")))
}

/// Turn Nozbe `(-)`/`(+)` markers into Org checkbox items.
#[must_use]
pub fn checklist_block(level: usize, body: &str) -> String {
    let pad = indent(level);
    let unchecked = format!("{pad}- [ ]");
    let checked = format!("{pad}- [X]");
    format!(
        "{}\n",
        body.replace("(-)", &unchecked).replace("(+)", &checked)
    )
}

/// Org link line to a local attachment copy.
#[must_use]
pub fn file_link_block(level: usize, local_name: &str) -> String {
    format!("{}[[{local_name}]]\n", indent(level))
}

/// Context labels as Org tags: `@` removed, lowercased. Labels left empty
/// are dropped.
#[must_use]
pub fn context_tags(contexts: &[String]) -> Vec<String> {
    contexts
        .iter()
        .map(|context| context.replace('@', "").to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Heading shown for a project in the combined layout.
#[must_use]
pub fn project_heading(name: &str) -> &str {
    if name == INBOX_PROJECT {
        TASKS_HEADING
    } else {
        name
    }
}

pub struct Renderer<'a> {
    dataset: &'a Dataset,
    fetcher: &'a dyn AttachmentFetcher,
    options: RenderOptions,
    stats: RenderStats,
}

impl<'a> Renderer<'a> {
    #[must_use]
    pub fn new(
        dataset: &'a Dataset,
        fetcher: &'a dyn AttachmentFetcher,
        options: RenderOptions,
    ) -> Self {
        Self {
            dataset,
            fetcher,
            options,
            stats: RenderStats::default(),
        }
    }

    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Description block, or `None` when the project has none.
    #[must_use]
    pub fn description_block(&self, project: ProjectKey) -> Option<String> {
        self.dataset
            .project(project)
            .description
            .as_deref()
            .filter(|description| !description.is_empty())
            .map(|description| markdown_block(DESCRIPTION_INDENT_LEVEL, description) + "\n")
    }

    /// Render a project as a section heading with its task headings.
    ///
    /// `heading` is the section title; the description goes under it unless
    /// `with_description` is false.
    ///
    /// # Errors
    ///
    /// Fails on an unparseable task datetime or a failed attachment download.
    pub fn render_section(
        &mut self,
        project: ProjectKey,
        heading: &str,
        with_description: bool,
    ) -> Result<OrgNode> {
        let dataset = self.dataset;
        let source = dataset.project(project);
        info!("Converting Nozbe project {} ({}) to Org", source.name, source.id);

        let mut section = OrgNode::new(SECTION_LEVEL, heading);
        if with_description {
            if let Some(block) = self.description_block(project) {
                section.push_text(block);
            }
        }

        for &task in &source.tasks {
            let node = self.render_task(dataset.task(task))?;
            section.push_child(node);
        }

        self.stats.projects += 1;
        Ok(section)
    }

    /// Render one task heading with its schedule and comments.
    ///
    /// # Errors
    ///
    /// Fails on an unparseable datetime or a failed attachment download.
    pub fn render_task(&mut self, task: &Task) -> Result<OrgNode> {
        let dataset = self.dataset;
        let project = dataset.project(task.project);
        debug!("Adding task {} of project {}", task.name, project.name);

        let mut node = OrgNode::new(TASK_LEVEL, task.name.as_str());
        if task.has_contexts() {
            node.tags = context_tags(&task.contexts);
        }
        if task.has_contexts() || self.options.state_markers == StateMarkers::Always {
            node.todo = Some(if task.completed { "DONE" } else { "TODO" }.to_string());
        }

        if let Some(datetime) = task.scheduled() {
            let stamp =
                org_date_from_nozbe(datetime).ok_or_else(|| ConvertError::InvalidDatetime {
                    task_id: task.id.clone(),
                    value: datetime.to_string(),
                })?;
            node.push_scheduled(SCHEDULE_INDENT, stamp);
        }

        for &key in task.comments.iter().rev() {
            let comment = dataset.comment(key);
            if let Some(block) = self.render_comment(task, comment)? {
                node.push_text(block);
                self.stats.comments += 1;
            } else {
                self.stats.skipped_comments += 1;
            }
        }

        self.stats.tasks += 1;
        Ok(node)
    }

    /// Render one comment body, or `None` when it is skipped.
    ///
    /// # Errors
    ///
    /// Fails only when an attachment download fails.
    pub fn render_comment(&mut self, task: &Task, comment: &Comment) -> Result<Option<String>> {
        debug!(
            "Converting comment {} of task {} ({})",
            comment.id, task.name, task.id
        );
        match &comment.kind {
            CommentKind::Markdown => Ok(Some(markdown_block(COMMENT_INDENT_LEVEL, &comment.body))),
            CommentKind::Checklist => {
                Ok(Some(checklist_block(COMMENT_INDENT_LEVEL, &comment.body)))
            }
            CommentKind::File => {
                let Some(&first) = comment.uploads.first() else {
                    warn!(
                        "No uploads found for comment {} of type {}",
                        comment.id, comment.kind
                    );
                    return Ok(None);
                };
                let upload = self.dataset.upload(first);
                let local_name = local_file_name(&upload.name, &comment.id);
                self.fetcher.fetch(upload, &local_name)?;
                self.stats.attachments += 1;
                Ok(Some(file_link_block(COMMENT_INDENT_LEVEL, &local_name)))
            }
            CommentKind::Detached | CommentKind::Other(_) => {
                warn!("Skipping comment of unsupported type {}", comment.kind);
                Ok(None)
            }
        }
    }
}
