use std::path::PathBuf;

use thiserror::Error;

/// Failures the engine can surface to its embedder. Resolution misses and
/// permission gaps are deliberately not errors; the engine degrades and
/// self-heals on later ticks instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown tracking profile {0:?}")]
    UnknownProfile(String),
}
