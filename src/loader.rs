//! Rebuilds the project → task → comment → upload graph from a flat export.
//!
//! Loading runs in three mandatory phases: projects, then tasks (each task
//! loading its embedded comments), then uploads. Uploads resolve against the
//! comment index, which is only complete once every task has loaded.
//!
//! All lookup tables are fields of one [`Dataset`]; nothing is global.

use crate::error::{ConvertError, Result};
use crate::model::{
    Comment, CommentKey, CommentKind, CommentRecord, Export, Project, ProjectKey, ProjectRecord,
    Task, TaskKey, TaskRecord, Upload, UploadKey, UploadRecord,
};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// What to do with a task's comment list when a deleted comment shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletedComments {
    /// Stop loading the task's comments at the first deleted one.
    #[default]
    Stop,
    /// Drop only the deleted comment and keep going.
    Skip,
}

impl DeletedComments {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for DeletedComments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeletedComments {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "stop" => Ok(Self::Stop),
            "skip" => Ok(Self::Skip),
            other => Err(ConvertError::config(format!(
                "deleted-comments must be 'stop' or 'skip', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    pub deleted_comments: DeletedComments,
}

/// Counters collected while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub projects: usize,
    pub tasks: usize,
    pub comments: usize,
    pub uploads: usize,
    pub dropped_comments: usize,
    pub detached_uploads: usize,
}

/// The loaded relational graph plus its id indices.
#[derive(Debug, Clone)]
pub struct Dataset {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    /// Slot 0 always holds the detached sentinel.
    comments: Vec<Comment>,
    uploads: Vec<Upload>,
    projects_by_id: HashMap<String, ProjectKey>,
    projects_by_name: HashMap<String, ProjectKey>,
    tasks_by_id: HashMap<String, TaskKey>,
    comments_by_id: HashMap<String, CommentKey>,
    uploads_by_id: HashMap<String, UploadKey>,
    options: LoadOptions,
    stats: LoadStats,
}

const DETACHED: CommentKey = CommentKey::new(0);

impl Default for Dataset {
    fn default() -> Self {
        Self::new(LoadOptions::default())
    }
}

impl Dataset {
    /// Create an empty dataset holding only the detached sentinel.
    #[must_use]
    pub fn new(options: LoadOptions) -> Self {
        Self {
            projects: Vec::new(),
            tasks: Vec::new(),
            comments: vec![Comment::detached()],
            uploads: Vec::new(),
            projects_by_id: HashMap::new(),
            projects_by_name: HashMap::new(),
            tasks_by_id: HashMap::new(),
            comments_by_id: HashMap::new(),
            uploads_by_id: HashMap::new(),
            options,
            stats: LoadStats::default(),
        }
    }

    /// Load a whole export in the fixed project → task → upload order.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnknownProject`] if a task references a project
    /// id that is not part of the export.
    pub fn load(export: &Export, options: LoadOptions) -> Result<Self> {
        let mut dataset = Self::new(options);
        dataset.load_projects(&export.project);
        dataset.load_tasks(&export.task)?;
        dataset.load_uploads(&export.upload);

        let stats = dataset.stats;
        info!(
            projects = stats.projects,
            tasks = stats.tasks,
            comments = stats.comments,
            uploads = stats.uploads,
            dropped_comments = stats.dropped_comments,
            detached_uploads = stats.detached_uploads,
            "Loaded Nozbe export"
        );
        Ok(dataset)
    }

    /// Index projects by id and by name.
    ///
    /// A repeated id replaces the earlier project in place. Name collisions
    /// resolve to the last project loaded.
    pub fn load_projects(&mut self, records: &[ProjectRecord]) {
        info!("Loading {} Nozbe projects", records.len());
        for record in records {
            debug!(id = %record.id, name = %record.name, "Loading project");
            let project = Project {
                id: record.id.clone(),
                name: record.name.clone(),
                description: record.description.clone(),
                tasks: Vec::new(),
            };

            let key = if let Some(&existing) = self.projects_by_id.get(&record.id) {
                warn!(id = %record.id, "Duplicate project id, keeping the later record");
                self.projects[existing.index()] = project;
                existing
            } else {
                let key = ProjectKey::new(self.projects.len());
                self.projects.push(project);
                self.stats.projects += 1;
                key
            };

            self.projects_by_id.insert(record.id.clone(), key);
            self.projects_by_name.insert(record.name.clone(), key);
        }
    }

    /// Attach tasks to their projects and load each task's comments.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::UnknownProject`] on the first task whose
    /// `project_id` is not indexed.
    pub fn load_tasks(&mut self, records: &[TaskRecord]) -> Result<()> {
        info!("Loading {} Nozbe tasks", records.len());
        for record in records {
            debug!(
                id = %record.id,
                name = %record.name,
                project_id = %record.project_id,
                project_name = record.project_name.as_deref().unwrap_or(""),
                "Loading task"
            );
            let project_key = *self.projects_by_id.get(&record.project_id).ok_or_else(|| {
                ConvertError::UnknownProject {
                    task_id: record.id.clone(),
                    project_id: record.project_id.clone(),
                }
            })?;

            let key = TaskKey::new(self.tasks.len());
            self.tasks.push(Task {
                id: record.id.clone(),
                project: project_key,
                name: record.name.clone(),
                completed: record.completed,
                datetime: record.datetime.clone(),
                contexts: record.contexts.clone(),
                comments: Vec::new(),
            });
            self.projects[project_key.index()].tasks.push(key);
            self.tasks_by_id.insert(record.id.clone(), key);
            self.stats.tasks += 1;

            self.load_comments(key, &record.comments);
        }
        Ok(())
    }

    /// Load a task's embedded comments in source order.
    ///
    /// With [`DeletedComments::Stop`] the first deleted comment ends the list:
    /// it and everything after it are dropped.
    pub fn load_comments(&mut self, task: TaskKey, records: &[CommentRecord]) {
        debug!("Loading task's {} comments", records.len());
        for (position, record) in records.iter().enumerate() {
            if record.deleted {
                match self.options.deleted_comments {
                    DeletedComments::Stop => {
                        let dropped = records.len() - position;
                        info!(
                            id = %record.id,
                            dropped,
                            "Deleted comment ends the task's comment list"
                        );
                        self.stats.dropped_comments += dropped;
                        return;
                    }
                    DeletedComments::Skip => {
                        info!(id = %record.id, "Skipping deleted comment");
                        self.stats.dropped_comments += 1;
                        continue;
                    }
                }
            }

            let key = CommentKey::new(self.comments.len());
            self.comments.push(Comment {
                id: record.id.clone(),
                kind: CommentKind::parse(&record.comment_type),
                created_at: record.created_at.clone(),
                task: Some(task),
                body: record.body.clone(),
                uploads: Vec::new(),
            });
            self.tasks[task.index()].comments.push(key);
            self.comments_by_id.insert(record.id.clone(), key);
            self.stats.comments += 1;
        }
    }

    /// Attach uploads to their comments.
    ///
    /// Unknown comment ids fall back to the detached sentinel, which is then
    /// registered under that id for later uploads.
    pub fn load_uploads(&mut self, records: &[UploadRecord]) {
        info!("Loading {} Nozbe uploads", records.len());
        for record in records {
            let comment = *self
                .comments_by_id
                .entry(record.comment_id.clone())
                .or_insert_with(|| {
                    debug!(
                        upload = %record.id,
                        comment_id = %record.comment_id,
                        "Upload references unknown comment, attaching to detached"
                    );
                    DETACHED
                });
            if comment == DETACHED {
                self.stats.detached_uploads += 1;
            }

            let key = UploadKey::new(self.uploads.len());
            self.uploads.push(Upload {
                id: record.id.clone(),
                comment,
                name: record.name.clone(),
                url: record.url.clone(),
            });
            self.comments[comment.index()].uploads.push(key);
            self.uploads_by_id.insert(record.id.clone(), key);
            self.stats.uploads += 1;
        }
    }

    #[must_use]
    pub const fn stats(&self) -> LoadStats {
        self.stats
    }

    /// Projects in load order.
    pub fn projects(&self) -> impl ExactSizeIterator<Item = (ProjectKey, &Project)> {
        self.projects
            .iter()
            .enumerate()
            .map(|(index, project)| (ProjectKey::new(index), project))
    }

    #[must_use]
    pub fn project(&self, key: ProjectKey) -> &Project {
        &self.projects[key.index()]
    }

    #[must_use]
    pub fn task(&self, key: TaskKey) -> &Task {
        &self.tasks[key.index()]
    }

    #[must_use]
    pub fn comment(&self, key: CommentKey) -> &Comment {
        &self.comments[key.index()]
    }

    #[must_use]
    pub fn upload(&self, key: UploadKey) -> &Upload {
        &self.uploads[key.index()]
    }

    #[must_use]
    pub fn detached(&self) -> &Comment {
        &self.comments[DETACHED.index()]
    }

    #[must_use]
    pub fn project_by_id(&self, id: &str) -> Option<ProjectKey> {
        self.projects_by_id.get(id).copied()
    }

    #[must_use]
    pub fn project_by_name(&self, name: &str) -> Option<ProjectKey> {
        self.projects_by_name.get(name).copied()
    }

    #[must_use]
    pub fn task_by_id(&self, id: &str) -> Option<TaskKey> {
        self.tasks_by_id.get(id).copied()
    }

    #[must_use]
    pub fn comment_by_id(&self, id: &str) -> Option<CommentKey> {
        self.comments_by_id.get(id).copied()
    }

    #[must_use]
    pub fn upload_by_id(&self, id: &str) -> Option<UploadKey> {
        self.uploads_by_id.get(id).copied()
    }
}
