use chrono::{Datelike, NaiveDate};
use nozbe_org::attachment::local_file_name;
use nozbe_org::render::{checklist_block, markdown_block};
use nozbe_org::util::time::org_date_from_nozbe;
use proptest::prelude::*;

proptest! {
    #[test]
    fn org_date_keeps_the_calendar_day(days in 0i64..40_000, h in 0u32..24, m in 0u32..60, s in 0u32..60) {
        let date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap() + chrono::Duration::days(days);
        let input = format!("{} {h:02}:{m:02}:{s:02}", date.format("%Y-%m-%d"));
        let rendered = org_date_from_nozbe(&input).unwrap();

        let prefix = format!("<{}", date.format("%Y-%m-%d"));
        let suffix = format!("{}>", date.weekday());
        prop_assert!(rendered.starts_with(&prefix), "{} lacks {}", rendered, prefix);
        prop_assert!(rendered.ends_with(&suffix), "{} lacks {}", rendered, suffix);
        prop_assert_eq!(rendered.len(), "<2020-03-05 Thu>".len());
    }

    #[test]
    fn local_names_embed_comment_id(base in "[a-z]{1,8}", ext in "[a-z]{1,4}", id in "[a-z0-9]{1,12}") {
        let name = format!("{base}.{ext}");
        prop_assert_eq!(local_file_name(&name, &id), format!("./{base}-{id}.{ext}"));
    }

    #[test]
    fn markdown_lines_are_all_indented(lines in prop::collection::vec("[a-z ]{0,12}", 1..6)) {
        let body = lines.join("\n");
        let block = markdown_block(2, &body);
        prop_assert!(block.ends_with('\n'), "unterminated block {:?}", block);
        let rendered: Vec<&str> = block.trim_end_matches('\n').split('\n').collect();
        prop_assert_eq!(rendered.len(), lines.len());
        for (out, original) in rendered.iter().zip(&lines) {
            prop_assert_eq!(*out, format!("   {original}"));
        }
    }

    #[test]
    fn checklist_items_keep_their_state(items in prop::collection::vec(("[a-z]{1,10}", any::<bool>()), 1..6)) {
        let body = items
            .iter()
            .map(|(text, done)| format!("{} {text}", if *done { "(+)" } else { "(-)" }))
            .collect::<Vec<_>>()
            .join("\n");
        let block = checklist_block(2, &body);
        let rendered: Vec<&str> = block.trim_end_matches('\n').split('\n').collect();
        prop_assert_eq!(rendered.len(), items.len());
        for (line, (text, done)) in rendered.iter().zip(&items) {
            let mark = if *done { "[X]" } else { "[ ]" };
            prop_assert_eq!(*line, format!("   - {mark} {text}"));
        }
    }
}
