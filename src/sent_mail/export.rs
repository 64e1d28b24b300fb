use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local};
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};

use crate::sent_mail::message::RecipientEntry;
use log::info;

const HEADER: &str = "=== Emails Found ===\n\n";
const FOOTER: &str = "\n\n=== End of List ===";
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

// Exports always land on the user's desktop
pub fn desktop_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join("Desktop"))
        .ok_or_else(|| anyhow!("cannot determine the home directory"))
}

pub fn file_name(now: &DateTime<Local>) -> String {
    format!("Found_Emails_{}.txt", now.format(FILE_TIMESTAMP_FORMAT))
}

fn format_entry(entry: &RecipientEntry<'_>) -> String {
    format!(
        "Date: {}\nTo: {}\nSubject: {}\n\n",
        entry.date, entry.recipient, entry.subject
    )
}

pub fn render<'a>(entries: impl IntoIterator<Item = RecipientEntry<'a>>) -> String {
    let body = entries.into_iter().map(|entry| format_entry(&entry)).join("");
    format!("{}{}{}", HEADER, body, FOOTER)
}

/// Writes the entries to `Found_Emails_<timestamp>.txt` inside `dir` and
/// returns the path of the new file.
pub fn export<'a>(
    entries: impl IntoIterator<Item = RecipientEntry<'a>>,
    dir: &Path,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let file_path = dir.join(file_name(&now));
    fs::write(&file_path, render(entries))
        .with_context(|| format!("cannot write {}", file_path.display()))?;

    info!("-- exported recipients to {}", file_path.display());
    Ok(file_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone};

    fn entry<'a>(date: &'a str, recipient: &'a str, subject: &'a str) -> RecipientEntry<'a> {
        RecipientEntry { date, recipient, subject }
    }

    #[test]
    fn file_name_timestamp_round_trips() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let name = file_name(&now);
        assert_eq!(name, "Found_Emails_2024-03-09_07-05-01.txt");

        let stamp = name
            .strip_prefix("Found_Emails_")
            .and_then(|rest| rest.strip_suffix(".txt"))
            .unwrap();
        assert!(NaiveDateTime::parse_from_str(stamp, FILE_TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn render_keeps_entry_order_between_header_and_footer() {
        let text = render(vec![
            entry("d1", "bob@x.com", "Invoice"),
            entry("d2", "carol@y.com", "Invoice 2"),
        ]);
        assert_eq!(
            text,
            "=== Emails Found ===\n\n\
             Date: d1\nTo: bob@x.com\nSubject: Invoice\n\n\
             Date: d2\nTo: carol@y.com\nSubject: Invoice 2\n\n\
             \n\n=== End of List ==="
        );
    }

    #[test]
    fn export_writes_file_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local::now();
        let path = export(vec![entry("d", "bob@x.com", "s")], dir.path(), now).unwrap();

        assert_eq!(path.parent(), Some(dir.path()));
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("To: bob@x.com\n"));
    }

    #[test]
    fn export_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-dir");
        assert!(export(vec![entry("d", "bob@x.com", "s")], &missing, Local::now()).is_err());
    }
}
