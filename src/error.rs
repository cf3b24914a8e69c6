use thiserror::Error;

/// Everything the app surfaces to the user falls into one of three buckets:
/// bad settings, an unreachable Ollama server, or a browser that won't start.
/// None of them are retried; they get displayed and logged.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot reach Ollama: {0}")]
    Connect(String),

    #[error("failed to launch browser: {0}")]
    Launch(String),
}
