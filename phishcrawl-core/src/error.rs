use phishcrawl_scanner::ScanError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to read seed file {path}: {source}")]
    SeedFile {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("No seeds found in {0}")]
    EmptySeeds(String),

    #[error("Invalid seed on line {line}: {reason}")]
    InvalidSeed { line: usize, reason: String },

    #[error("Unknown label '{label}' in {context} (expected benign, phishing or malware)")]
    UnknownLabel { label: String, context: String },

    #[error("Invalid depth setting '{0}'")]
    InvalidDepth(String),

    #[error("Failed to load config file {path}: {reason}")]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Crawl error: {0}")]
    ScanError(#[from] ScanError),
}

impl CoreError {
    /// Errors raised while validating input, before any page is fetched
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CoreError::SeedFile { .. }
                | CoreError::EmptySeeds(_)
                | CoreError::InvalidSeed { .. }
                | CoreError::UnknownLabel { .. }
                | CoreError::InvalidDepth(_)
                | CoreError::ConfigFile { .. }
                | CoreError::InvalidConfig(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
