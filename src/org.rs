//! Minimal Org mode writer.
//!
//! Builds a tree of [`OrgNode`]s and serialises it deterministically:
//!
//! ```text
//! * Heading
//! ** TODO Child heading :tag:other:
//!    SCHEDULED: <2020-03-05 Thu>
//!    body text
//! ```

use std::fmt::Write as _;

/// A body entry under a heading, emitted in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgEntry {
    /// Verbatim text; the caller owns indentation and trailing newlines.
    Text(String),
    /// `SCHEDULED:` line with its own indent.
    Scheduled { indent: String, timestamp: String },
    Node(OrgNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgNode {
    pub level: usize,
    pub heading: String,
    /// `TODO`/`DONE` keyword.
    pub todo: Option<String>,
    pub tags: Vec<String>,
    pub entries: Vec<OrgEntry>,
}

impl OrgNode {
    #[must_use]
    pub fn new(level: usize, heading: impl Into<String>) -> Self {
        Self {
            level: level.max(1),
            heading: heading.into(),
            todo: None,
            tags: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.entries.push(OrgEntry::Text(text.into()));
    }

    pub fn push_scheduled(&mut self, indent: impl Into<String>, timestamp: impl Into<String>) {
        self.entries.push(OrgEntry::Scheduled {
            indent: indent.into(),
            timestamp: timestamp.into(),
        });
    }

    pub fn push_child(&mut self, child: Self) {
        self.entries.push(OrgEntry::Node(child));
    }

    /// The heading line without its trailing newline.
    #[must_use]
    pub fn heading_line(&self) -> String {
        let mut line = "*".repeat(self.level);
        line.push(' ');
        if let Some(todo) = &self.todo {
            line.push_str(todo);
            line.push(' ');
        }
        line.push_str(&self.heading);
        if !self.tags.is_empty() {
            let _ = write!(line, " :{}:", self.tags.join(":"));
        }
        line
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.heading_line());
        out.push('\n');
        for entry in &self.entries {
            match entry {
                OrgEntry::Text(text) => out.push_str(text),
                OrgEntry::Scheduled { indent, timestamp } => {
                    let _ = writeln!(out, "{indent}SCHEDULED: {timestamp}");
                }
                OrgEntry::Node(node) => node.write_to(out),
            }
        }
    }
}

/// A whole `.org` file: free text before the first heading, then headings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgDocument {
    pub preamble: String,
    pub nodes: Vec<OrgNode>,
}

impl OrgDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_preamble(&mut self, text: &str) {
        self.preamble.push_str(text);
    }

    pub fn push(&mut self, node: OrgNode) {
        self.nodes.push(node);
    }

    #[must_use]
    pub fn to_org_string(&self) -> String {
        let mut out = self.preamble.clone();
        for node in &self.nodes {
            node.write_to(&mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_line_plain() {
        let node = OrgNode::new(1, "Inbox");
        assert_eq!(node.heading_line(), "* Inbox");
    }

    #[test]
    fn test_heading_line_with_todo_and_tags() {
        let mut node = OrgNode::new(2, "Call Bob");
        node.todo = Some("TODO".to_string());
        node.tags = vec!["phone".to_string(), "work".to_string()];
        assert_eq!(node.heading_line(), "** TODO Call Bob :phone:work:");
    }

    #[test]
    fn test_level_is_at_least_one() {
        assert_eq!(OrgNode::new(0, "x").heading_line(), "* x");
    }

    #[test]
    fn test_document_serialization_order() {
        let mut task = OrgNode::new(2, "Task");
        task.push_scheduled("   ", "<2020-03-05 Thu>");
        task.push_text("   note\n");

        let mut section = OrgNode::new(1, "Tasks");
        section.push_text("  about\n\n");
        section.push_child(task);

        let mut doc = OrgDocument::new();
        doc.push_preamble("intro\n");
        doc.push(section);

        assert_eq!(
            doc.to_org_string(),
            "intro\n* Tasks\n  about\n\n** Task\n   SCHEDULED: <2020-03-05 Thu>\n   note\n"
        );
    }
}
