use std::fs::OpenOptions;

use anyhow::Context;
use env_logger::{Builder, Target, WriteStyle};

use crate::config::Settings;

/// Diagnostics go to an append-only file in the config dir. Level comes from
/// `FOCUSDECK_LOG` (default `info`). If the file can't be opened the logger
/// stays on stderr rather than failing startup.
pub fn init() -> anyhow::Result<()> {
    let filter = std::env::var("FOCUSDECK_LOG").unwrap_or_else(|_| "info".to_string());
    let mut builder = Builder::new();
    builder.parse_filters(&filter);

    let path = Settings::config_dir().join("focusdeck.log");
    match std::fs::create_dir_all(Settings::config_dir())
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&path))
    {
        Ok(file) => {
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }
        Err(e) => eprintln!(
            "could not open log file {}: {}. Logging to stderr.",
            path.display(),
            e
        ),
    }

    builder.try_init().context("logger already initialized")
}
