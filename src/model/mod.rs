//! Core data types for `nozbe_org`.
//!
//! Two families of types live here:
//! - Export records (`Export`, `ProjectRecord`, `TaskRecord`, `CommentRecord`,
//!   `UploadRecord`) deserialized straight from a Nozbe `data.json`
//! - The relational graph (`Project`, `Task`, `Comment`, `Upload`) rebuilt from
//!   those records and linked by typed arena keys

use serde::{Deserialize, Deserializer};
use std::fmt;

mod keys;

pub use keys::{CommentKey, ProjectKey, TaskKey, UploadKey};

/// Id and type of the sentinel comment that owns orphaned uploads.
pub const DETACHED_COMMENT_ID: &str = "detached";

/// Top-level Nozbe export document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Export {
    pub project: Vec<ProjectRecord>,
    pub task: Vec<TaskRecord>,
    pub upload: Vec<UploadRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub project_id: String,
    /// Denormalized project name; only used in log lines.
    #[serde(rename = "_project_name", default)]
    pub project_name: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "de_flag")]
    pub completed: bool,
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub comments: Vec<CommentRecord>,
    #[serde(rename = "_con_names", default, deserialize_with = "de_null_as_default")]
    pub contexts: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(default, deserialize_with = "de_flag")]
    pub deleted: bool,
    #[serde(rename = "type")]
    pub comment_type: String,
    #[serde(rename = "_created_at", default)]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "de_null_as_default")]
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub comment_id: String,
    pub name: String,
    #[serde(rename = "_url")]
    pub url: String,
}

/// Nozbe ids show up both as strings and as bare integers.
fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Str(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    })
}

fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        Some(RawFlag::Bool(b)) => b,
        Some(RawFlag::Int(n)) => n != 0,
        None => false,
    })
}

fn de_null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Comment payload type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentKind {
    Markdown,
    Checklist,
    File,
    /// Only ever carried by the sentinel comment.
    Detached,
    Other(String),
}

impl CommentKind {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "markdown" => Self::Markdown,
            "checklist" => Self::Checklist,
            "file" => Self::File,
            DETACHED_COMMENT_ID => Self::Detached,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Markdown => "markdown",
            Self::Checklist => "checklist",
            Self::File => "file",
            Self::Detached => DETACHED_COMMENT_ID,
            Self::Other(value) => value,
        }
    }
}

impl fmt::Display for CommentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub tasks: Vec<TaskKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub project: ProjectKey,
    pub name: String,
    pub completed: bool,
    /// Raw `YYYY-MM-DD HH:MM:SS` value from the export.
    pub datetime: Option<String>,
    pub contexts: Vec<String>,
    /// Source order (newest first).
    pub comments: Vec<CommentKey>,
}

impl Task {
    #[must_use]
    pub fn has_contexts(&self) -> bool {
        !self.contexts.is_empty()
    }

    /// Scheduled datetime, treating an empty string as unscheduled.
    #[must_use]
    pub fn scheduled(&self) -> Option<&str> {
        self.datetime.as_deref().filter(|dt| !dt.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub kind: CommentKind,
    pub created_at: Option<String>,
    /// `None` only for the detached sentinel.
    pub task: Option<TaskKey>,
    pub body: String,
    pub uploads: Vec<UploadKey>,
}

impl Comment {
    /// The shared owner for uploads whose comment cannot be found.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            id: DETACHED_COMMENT_ID.to_string(),
            kind: CommentKind::Detached,
            created_at: None,
            task: None,
            body: String::new(),
            uploads: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.kind == CommentKind::Detached
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub id: String,
    pub comment: CommentKey,
    /// Original file name, extension included.
    pub name: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_kind_parse() {
        assert_eq!(CommentKind::parse("markdown"), CommentKind::Markdown);
        assert_eq!(CommentKind::parse("checklist"), CommentKind::Checklist);
        assert_eq!(CommentKind::parse("file"), CommentKind::File);
        assert_eq!(
            CommentKind::parse("poll"),
            CommentKind::Other("poll".to_string())
        );
        assert_eq!(CommentKind::parse("poll").to_string(), "poll");
    }

    #[test]
    fn test_ids_accept_strings_and_integers() {
        let json = r#"{"id": 42, "comment_id": "c1", "name": "a.png", "_url": "http://x/a"}"#;
        let upload: UploadRecord = serde_json::from_str(json).unwrap();
        assert_eq!(upload.id, "42");
        assert_eq!(upload.comment_id, "c1");
    }

    #[test]
    fn test_task_record_defaults() {
        let json = r#"{
            "id": "t1",
            "project_id": "p1",
            "name": "Buy milk",
            "datetime": null,
            "_con_names": null
        }"#;
        let task: TaskRecord = serde_json::from_str(json).unwrap();
        assert!(!task.completed);
        assert!(task.contexts.is_empty());
        assert!(task.comments.is_empty());
        assert_eq!(task.datetime, None);
    }

    #[test]
    fn test_flags_accept_integers() {
        let json = r#"{"id": "c1", "deleted": 1, "type": "markdown", "body": null}"#;
        let comment: CommentRecord = serde_json::from_str(json).unwrap();
        assert!(comment.deleted);
        assert_eq!(comment.body, "");
    }

    #[test]
    fn test_export_requires_all_sections() {
        let err = serde_json::from_str::<Export>(r#"{"project": [], "task": []}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_scheduled_ignores_empty_string() {
        let task = Task {
            id: "t".into(),
            project: ProjectKey::new(0),
            name: "n".into(),
            completed: false,
            datetime: Some(String::new()),
            contexts: Vec::new(),
            comments: Vec::new(),
        };
        assert_eq!(task.scheduled(), None);
    }
}
