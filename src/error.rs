use std::path::PathBuf;

use thiserror::Error;

/// Failures of the on-disk settings store.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("index {0} out of range to set portname")]
    OutOfRangeIndex(i64),

    #[error("portname '{0}' not found to set portname")]
    PortNameNotFound(String),

    #[error("baudrate '{0}' not a legal value")]
    InvalidBaudRate(String),

    #[error("settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("output: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::OutOfRangeIndex(_) | Self::PortNameNotFound(_) | Self::InvalidBaudRate(_) => 1,
            Self::Settings(_) | Self::Io(_) => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
