use anyhow::{bail, Context, Result};
use fs_err as fs;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::errors::PlannerError;
use crate::wire::{sorted_by_day, ContentEntry};

pub const CSV_HEADER: &str = "Day,Platform,Content Type,Idea/Hook,Caption,Hashtags";

/// Quote a field holding a comma, quote or line break; inner quotes are doubled.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Header plus one row per entry, in display order.
pub fn to_csv(entries: &[ContentEntry]) -> String {
    let mut rows = vec![CSV_HEADER.to_string()];
    for e in sorted_by_day(entries) {
        rows.push(
            [
                e.day.to_string(),
                escape_field(&e.platform),
                escape_field(&e.content_type),
                escape_field(&e.idea),
                escape_field(&e.caption),
                escape_field(&e.hashtags),
            ]
            .join(","),
        );
    }
    rows.join("\n")
}

/// Write the calendar to `path` atomically. Returns the number of data rows.
pub fn write_csv(path: &Path, entries: &[ContentEntry]) -> Result<usize> {
    if entries.is_empty() {
        return Err(PlannerError::Input("there is no content plan to export".into()).into());
    }
    write_atomic(path, &to_csv(entries))?;
    log::info!("exported {} rows to {}", entries.len(), path.display());
    Ok(entries.len())
}

/// An existing file is only replaced when `confirm` agrees to the prompt.
pub fn ensure_writable(path: &Path, confirm: impl FnOnce(&str) -> bool) -> Result<()> {
    if path.exists() && !confirm(&format!("{} exists. Overwrite?", path.display())) {
        bail!("{} exists and was not overwritten", path.display());
    }
    Ok(())
}

pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let tmp = NamedTempFile::new_in(parent)?;
    fs::write(tmp.path(), contents)?;
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: u32, caption: &str) -> ContentEntry {
        ContentEntry {
            day,
            platform: "Instagram".into(),
            content_type: "Carousel".into(),
            idea: "Idea".into(),
            caption: caption.into(),
            hashtags: "#vegan #bakery".into(),
        }
    }

    /// Minimal reader for the quoting rules above.
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match (c, quoted) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                ('"', true) => quoted = false,
                ('"', false) if field.is_empty() => quoted = true,
                (',', false) => row.push(std::mem::take(&mut field)),
                ('\n', false) => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                (c, _) => field.push(c),
            }
        }
        row.push(field);
        rows.push(row);
        rows
    }

    #[test]
    fn escaping_follows_quote_rules() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a, b"), "\"a, b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn single_entry_gives_header_and_one_row() {
        let e = ContentEntry {
            day: 1,
            platform: "Instagram".into(),
            content_type: "Post".into(),
            idea: "Intro".into(),
            caption: "Hi!".into(),
            hashtags: "#vegan".into(),
        };
        assert_eq!(to_csv(&[e]), format!("{CSV_HEADER}\n1,Instagram,Post,Intro,Hi!,#vegan"));
    }

    #[test]
    fn rows_follow_display_order() {
        let csv = to_csv(&[entry(3, "c"), entry(1, "a"), entry(2, "b")]);
        let days: Vec<String> = parse_csv(&csv).into_iter().skip(1).map(|r| r[0].clone()).collect();
        assert_eq!(days, vec!["1", "2", "3"]);
    }

    #[test]
    fn tricky_captions_survive_a_round_trip() {
        let entries = vec![
            entry(1, "Fresh, warm, vegan."),
            entry(2, "She said \"wow\" twice"),
            entry(3, "line one\nline two\r\nline three"),
        ];
        let rows = parse_csv(&to_csv(&entries));
        assert_eq!(rows[0].join(","), CSV_HEADER);
        for (row, e) in rows[1..].iter().zip(&entries) {
            assert_eq!(row[0], e.day.to_string());
            assert_eq!(row[1], e.platform);
            assert_eq!(row[2], e.content_type);
            assert_eq!(row[3], e.idea);
            assert_eq!(row[4], e.caption);
            assert_eq!(row[5], e.hashtags);
        }
    }

    #[test]
    fn empty_plan_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plan.csv");
        assert!(write_csv(&out, &[]).is_err());
        assert!(!out.exists());

        assert_eq!(write_csv(&out, &[entry(1, "x")]).unwrap(), 1);
        assert!(fs::read_to_string(&out).unwrap().starts_with(CSV_HEADER));
    }

    #[test]
    fn existing_file_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("plan.csv");
        ensure_writable(&out, |_| panic!("absent file should not prompt")).unwrap();

        fs::write(&out, "old").unwrap();
        let err = ensure_writable(&out, |q| {
            assert!(q.contains("plan.csv"));
            false
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("was not overwritten"));
        ensure_writable(&out, |_| true).unwrap();
    }
}
