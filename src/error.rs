use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostsentryError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Watch error: {0}")]
    Watch(#[from] WatchError),

    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Detector threshold must be at least 1 (got {0})")]
    InvalidThreshold(u64),

    #[error("Detector window must be at least 1 second (got {0})")]
    InvalidWindow(u64),

    #[error("No watch paths configured")]
    NoWatchPaths,

    #[error("Watch path does not exist: {0}")]
    MissingWatchPath(PathBuf),

    #[error("Unknown alert channel: {0}")]
    UnknownAlertChannel(String),

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    IgnorePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize filesystem watcher: {0}")]
    Init(notify::Error),

    #[error("Failed to watch {path}: {source}")]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Desktop notification failed: {0}")]
    DesktopNotification(String),
}

pub type Result<T> = std::result::Result<T, HostsentryError>;
