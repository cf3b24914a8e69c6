use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::AppError;

pub struct Screen {
    pub title: &'static str,
    pub body: &'static str,
    pub action: &'static str,
}

/// Shown once, on first run. Finishing or skipping writes the marker file so
/// the flow never reappears.
pub const SCREENS: &[Screen] = &[
    Screen {
        title: "Welcome to focusdeck!",
        body: "Your sidebar copilot for getting things done.\n\
               Launch preset browser workspaces, run focus bursts,\n\
               and chat with a local model, all from one window.",
        action: "Show me the tour",
    },
    Screen {
        title: "The tour",
        body: "Modes: one click opens every tab of a workflow.\n\
               Focus burst: a 5-minute tunnel-vision timer.\n\
               Themes: switch the color scheme to match your mode.\n\
               Chat: a local Ollama assistant in the sidebar.\n\
               Settings: change the browser, model, or endpoint any time.",
        action: "Let's go!",
    },
];

#[derive(Debug, Default, Clone, Copy)]
pub struct Onboarding {
    step: usize,
}

impl Onboarding {
    pub fn current(&self) -> &'static Screen {
        &SCREENS[self.step.min(SCREENS.len() - 1)]
    }

    /// Returns true when the last screen has been acknowledged.
    pub fn advance(&mut self) -> bool {
        self.step += 1;
        self.step >= SCREENS.len()
    }
}

pub fn marker_path() -> PathBuf {
    Settings::config_dir().join("onboarded")
}

pub fn is_complete() -> bool {
    is_complete_at(&marker_path())
}

pub fn is_complete_at(path: &Path) -> bool {
    path.exists()
}

pub fn mark_complete() -> Result<(), AppError> {
    mark_complete_at(&marker_path())
}

pub fn mark_complete_at(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::Config(format!("cannot create {}: {}", parent.display(), e)))?;
    }
    fs::write(path, "onboarded\n")
        .map_err(|e| AppError::Config(format!("cannot write {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("onboarded");
        assert!(!is_complete_at(&path));
        mark_complete_at(&path).unwrap();
        assert!(is_complete_at(&path));
    }

    #[test]
    fn flow_walks_every_screen_then_finishes() {
        let mut flow = Onboarding::default();
        assert_eq!(flow.current().title, SCREENS[0].title);
        assert!(!flow.advance());
        assert_eq!(flow.current().title, SCREENS[1].title);
        assert!(flow.advance());
    }
}
