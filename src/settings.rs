use anyhow::{Context, Result};
use serde::Deserialize;

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use std::time::Duration;
use backtrace::Backtrace;
use log::{error, info};

pub const DEFAULT_SETTINGS_PATH: &str = "src/resources/settings.yaml";

// Connection and behaviour settings; every field falls back to the Gmail defaults
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub imap_server: String,
    pub port: u16,
    pub sent_folder: String,
    #[serde(rename = "delete_pacing_ms")]
    pub delete_pacing_millis: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            imap_server: "imap.gmail.com".to_string(),
            port: 993,
            sent_folder: "[Gmail]/Sent Mail".to_string(),
            delete_pacing_millis: 1000,
        }
    }
}

impl Settings {
    pub fn delete_pacing(&self) -> Duration {
        Duration::from_millis(self.delete_pacing_millis)
    }
}

/// Loads settings from `path`, or from `DEFAULT_SETTINGS_PATH` when no path
/// is given. Only the default file may be missing; an unreadable or
/// malformed file is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let required = path.is_some();
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_SETTINGS_PATH));

    // Open the YAML file
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if !required && err.kind() == ErrorKind::NotFound => {
            info!("no settings at {}, using defaults", path.display());
            return Ok(Settings::default());
        }
        Err(err) => {
            error!("Error: {}", err);
            return Err(err).with_context(|| format!("cannot open settings {}", path.display()));
        }
    };

    let reader = BufReader::new(file);

    // Parse the YAML file into the Settings struct
    match serde_yaml::from_reader(reader) {
        Ok(settings) => Ok(settings),
        Err(err) => {
            error!("Error: {}", err);

            // Capture and print the backtrace
            let backtrace = Backtrace::new();
            error!("Backtrace:\n{:?}", backtrace);
            Err(err).with_context(|| format!("cannot deserialize settings {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let settings: Settings = serde_yaml::from_str("port: 1993\nsent_folder: Sent\n").unwrap();
        assert_eq!(settings.port, 1993);
        assert_eq!(settings.sent_folder, "Sent");
        assert_eq!(settings.imap_server, "imap.gmail.com");
        assert_eq!(settings.delete_pacing(), Duration::from_secs(1));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "imap_server: mail.example.org\ndelete_pacing_ms: 0").unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.imap_server, "mail.example.org");
        assert_eq!(settings.delete_pacing(), Duration::ZERO);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(Some(&dir.path().join("absent.yaml"))).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port: not-a-number").unwrap();
        assert!(load_settings(Some(file.path())).is_err());
    }
}
