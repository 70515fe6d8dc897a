//! Export documents used across integration tests.

use serde_json::{Value, json};

/// Two projects, contexts, a schedule, every comment type, and a deleted
/// comment in the middle of a list.
pub fn sample_export(attachment_base: &str) -> Value {
    json!({
        "project": [
            {"id": "p-inbox", "name": "Inbox", "description": null},
            {"id": "p-home", "name": "Home", "description": "Things around the house\nand garden"}
        ],
        "task": [
            {
                "id": "t1",
                "project_id": "p-home",
                "_project_name": "Home",
                "name": "Fix fence",
                "completed": false,
                "datetime": "2020-03-05 10:00:00",
                "_con_names": ["@Garden"],
                "comments": [
                    {"id": "c3", "deleted": false, "type": "file", "_created_at": "2020-03-03", "body": ""},
                    {"id": "c2", "deleted": false, "type": "checklist", "_created_at": "2020-03-02", "body": "(-) buy nails\n(+) find hammer"},
                    {"id": "c1", "deleted": false, "type": "markdown", "_created_at": "2020-03-01", "body": "Posts are rotten\nReplace two"}
                ]
            },
            {
                "id": "t2",
                "project_id": "p-inbox",
                "_project_name": "Inbox",
                "name": "Plan trip",
                "completed": true,
                "datetime": null,
                "_con_names": null,
                "comments": [
                    {"id": "c6", "deleted": false, "type": "markdown", "body": "kept"},
                    {"id": "c5", "deleted": true, "type": "markdown", "body": "gone"},
                    {"id": "c4", "deleted": false, "type": "markdown", "body": "never shown"}
                ]
            },
            {
                "id": "t3",
                "project_id": "p-home",
                "_project_name": "Home",
                "name": "Vote",
                "completed": true,
                "datetime": null,
                "_con_names": ["@Town"],
                "comments": [
                    {"id": "c7", "deleted": false, "type": "poll", "body": "Which day?"},
                    {"id": "c8", "deleted": false, "type": "file", "body": ""}
                ]
            }
        ],
        "upload": [
            {"id": "u1", "comment_id": "c3", "name": "fence.jpg", "_url": format!("{attachment_base}/fence")},
            {"id": "u2", "comment_id": "c-missing", "name": "lost.txt", "_url": format!("{attachment_base}/lost")}
        ]
    })
}

/// Expected combined output for [`sample_export`].
pub const SAMPLE_COMBINED: &str = "\
* Tasks
** Plan trip
   kept
* Home
  Things around the house
  and garden

** TODO Fix fence :garden:
   SCHEDULED: <2020-03-05 Thu>
   Posts are rotten
   Replace two
   - [ ] buy nails
   - [X] find hammer
   [[./fence-c3.jpg]]
** DONE Vote :town:
";
