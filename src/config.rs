use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

const BROWSER_COMMAND_KEY: &str = "BROWSER_COMMAND";
const OLLAMA_ENDPOINT_KEY: &str = "OLLAMA_ENDPOINT";
const OLLAMA_MODEL_KEY: &str = "OLLAMA_MODEL";

/// The three values the settings view edits. Stored as a flat `KEY=value`
/// file so users can edit it by hand; the whole file is rewritten on save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub browser_command: String,
    pub endpoint: String,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            browser_command: "google-chrome".to_string(),
            endpoint: "http://localhost:11434/api/chat".to_string(),
            model: "llama2".to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        let mut settings = Self::load_from(&Self::settings_path());
        settings.apply_env_overrides(|key| std::env::var(key).ok());
        settings
    }

    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => return Self::parse(&contents),
                Err(e) => log::warn!("could not read {}: {}. Using defaults.", path.display(), e),
            }
        }
        Settings::default()
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("cannot create {}: {}", parent.display(), e)))?;
        }
        fs::write(path, self.render())
            .map_err(|e| AppError::Config(format!("cannot write {}: {}", path.display(), e)))
    }

    /// Unknown keys, blank lines, and `#` comments are skipped.
    fn parse(contents: &str) -> Self {
        let mut settings = Settings::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("ignoring malformed settings line: {}", line);
                continue;
            };
            let value = value.trim().to_string();
            match key.trim() {
                BROWSER_COMMAND_KEY => settings.browser_command = value,
                OLLAMA_ENDPOINT_KEY => settings.endpoint = value,
                OLLAMA_MODEL_KEY => settings.model = value,
                other => log::debug!("ignoring unknown settings key: {}", other),
            }
        }
        settings
    }

    fn render(&self) -> String {
        format!(
            "{}={}\n{}={}\n{}={}\n",
            BROWSER_COMMAND_KEY, sanitize(&self.browser_command),
            OLLAMA_ENDPOINT_KEY, sanitize(&self.endpoint),
            OLLAMA_MODEL_KEY, sanitize(&self.model),
        )
    }

    /// Environment variables win over the file, matching how the settings
    /// were configured before the file existed.
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var(BROWSER_COMMAND_KEY) {
            self.browser_command = v;
        }
        if let Some(v) = var(OLLAMA_ENDPOINT_KEY) {
            self.endpoint = v;
        }
        if let Some(v) = var(OLLAMA_MODEL_KEY) {
            self.model = v;
        }
    }

    pub fn settings_path() -> PathBuf {
        Self::config_dir().join("settings.env")
    }

    pub fn config_dir() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/focusdeck")
        } else {
            PathBuf::from(".")
        }
    }
}

/// Control characters would split a value across lines and corrupt the
/// one-key-per-line format, so they are dropped on write.
fn sanitize(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settings {
        Settings {
            browser_command: "firefox".to_string(),
            endpoint: "http://127.0.0.1:11434/api/chat".to_string(),
            model: "mistral".to_string(),
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.env");
        let settings = sample();
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Settings::load_from(&dir.path().join("nope.env"));
        assert_eq!(loaded, Settings::default());
    }

    #[test]
    fn parse_skips_comments_and_unknown_keys() {
        let contents = "# focusdeck settings\n\nBROWSER_COMMAND=chromium\nSOMETHING_ELSE=x\nnot a pair\n";
        let settings = Settings::parse(contents);
        assert_eq!(settings.browser_command, "chromium");
        assert_eq!(settings.endpoint, Settings::default().endpoint);
    }

    #[test]
    fn control_characters_cannot_corrupt_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.env");
        let mut settings = sample();
        settings.browser_command = "firefox\nOLLAMA_MODEL=evil".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path);
        assert_eq!(loaded.browser_command, "firefoxOLLAMA_MODEL=evil");
        assert_eq!(loaded.model, settings.model);
        assert_eq!(loaded.endpoint, settings.endpoint);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut settings = sample();
        settings.apply_env_overrides(|key| (key == "OLLAMA_MODEL").then(|| "phi3".to_string()));
        assert_eq!(settings.model, "phi3");
        assert_eq!(settings.browser_command, "firefox");
    }
}
