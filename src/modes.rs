use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::AppError;

/// A named preset of browser tabs that open together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub name: String,
    pub urls: Vec<String>,
}

/// Ordered collection of modes. Names are unique; adding a mode under an
/// existing name replaces its URL list in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModeSet {
    modes: Vec<Mode>,
}

impl ModeSet {
    /// Presets seeded on first run, before the user edits anything.
    pub fn starter() -> Self {
        ModeSet {
            modes: vec![
                Mode {
                    name: "Deep Work".to_string(),
                    urls: vec![
                        "https://calendar.google.com".to_string(),
                        "https://docs.google.com".to_string(),
                    ],
                },
                Mode {
                    name: "Comms".to_string(),
                    urls: vec![
                        "https://mail.google.com".to_string(),
                        "https://app.slack.com/client".to_string(),
                    ],
                },
                Mode {
                    name: "Research".to_string(),
                    urls: vec!["https://scholar.google.com".to_string()],
                },
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mode> {
        self.modes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.name == name)
    }

    pub fn upsert(&mut self, name: &str, urls: Vec<String>) {
        match self.modes.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.urls = urls,
            None => self.modes.push(Mode {
                name: name.to_string(),
                urls,
            }),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.modes.len();
        self.modes.retain(|m| m.name != name);
        self.modes.len() != before
    }

    pub fn load() -> Result<Self, AppError> {
        Self::load_from(&Self::modes_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            return Ok(Self::starter());
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("invalid modes file {}: {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::modes_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("cannot create {}: {}", parent.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("cannot encode modes: {}", e)))?;
        fs::write(path, json)
            .map_err(|e| AppError::Config(format!("cannot write {}: {}", path.display(), e)))
    }

    pub fn modes_path() -> PathBuf {
        Settings::config_dir().join("modes.json")
    }
}

/// Seam for tests: launching goes through this trait so the order and count
/// of invocations can be checked without spawning real processes.
pub trait Browser {
    fn open(&self, url: &str) -> Result<(), AppError>;
}

/// Spawns the configured browser command once per URL, fire-and-forget.
pub struct CommandBrowser {
    command: String,
}

impl CommandBrowser {
    pub fn new(command: String) -> Self {
        CommandBrowser { command }
    }
}

impl Browser for CommandBrowser {
    fn open(&self, url: &str) -> Result<(), AppError> {
        Command::new(&self.command)
            .arg(url)
            .spawn()
            .map(|_| ())
            .map_err(|e| AppError::Launch(format!("{}: {}", self.command, e)))
    }
}

/// Opens every URL of a mode, one browser invocation per URL, in listed
/// order. The first spawn failure aborts the rest.
pub fn launch(mode: &Mode, browser: &dyn Browser) -> Result<usize, AppError> {
    log::info!("launching mode '{}' ({} tabs)", mode.name, mode.urls.len());
    for url in &mode.urls {
        log::debug!("opening {}", url);
        browser.open(url)?;
    }
    Ok(mode.urls.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct RecordingBrowser {
        opened: RefCell<Vec<String>>,
        fail_on: Option<String>,
    }

    impl RecordingBrowser {
        fn new() -> Self {
            RecordingBrowser {
                opened: RefCell::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    impl Browser for RecordingBrowser {
        fn open(&self, url: &str) -> Result<(), AppError> {
            if self.fail_on.as_deref() == Some(url) {
                return Err(AppError::Launch("boom".to_string()));
            }
            self.opened.borrow_mut().push(url.to_string());
            Ok(())
        }
    }

    fn mode(urls: &[&str]) -> Mode {
        Mode {
            name: "test".to_string(),
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn launch_opens_each_url_once_in_order() {
        let browser = RecordingBrowser::new();
        let m = mode(&["https://a.example", "https://b.example", "https://c.example"]);
        let count = launch(&m, &browser).unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            *browser.opened.borrow(),
            vec!["https://a.example", "https://b.example", "https://c.example"]
        );
    }

    #[test]
    fn launch_stops_at_first_failure() {
        let mut browser = RecordingBrowser::new();
        browser.fail_on = Some("https://b.example".to_string());
        let m = mode(&["https://a.example", "https://b.example", "https://c.example"]);
        let err = launch(&m, &browser).unwrap_err();
        assert!(matches!(err, AppError::Launch(_)));
        assert_eq!(*browser.opened.borrow(), vec!["https://a.example"]);
    }

    #[test]
    fn upsert_replaces_existing_name() {
        let mut set = ModeSet::default();
        set.upsert("Work", vec!["https://a.example".to_string()]);
        set.upsert("Work", vec!["https://b.example".to_string()]);
        assert_eq!(set.iter().count(), 1);
        assert_eq!(set.get("Work").unwrap().urls, vec!["https://b.example"]);
    }

    #[test]
    fn remove_reports_whether_anything_was_deleted() {
        let mut set = ModeSet::starter();
        assert!(set.remove("Comms"));
        assert!(!set.remove("Comms"));
        assert!(set.get("Comms").is_none());
    }

    #[test]
    fn save_then_load_round_trips_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modes.json");
        let mut set = ModeSet::default();
        set.upsert("B", vec!["https://b.example".to_string()]);
        set.upsert("A", vec!["https://a.example".to_string()]);
        set.save_to(&path).unwrap();
        let loaded = ModeSet::load_from(&path).unwrap();
        assert_eq!(loaded, set);
        let names: Vec<_> = loaded.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn missing_file_seeds_starter_modes() {
        let dir = tempfile::tempdir().unwrap();
        let set = ModeSet::load_from(&dir.path().join("modes.json")).unwrap();
        assert!(!set.is_empty());
    }

    #[test]
    fn corrupt_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modes.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ModeSet::load_from(&path),
            Err(AppError::Config(_))
        ));
    }
}
