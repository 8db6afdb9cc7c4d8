//! Error types for platform sources and settings.

use std::path::PathBuf;

/// A specialized Result type for source construction.
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// A specialized Result type for settings operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;

/// Errors that can occur while setting up a platform source.
///
/// Only construction reports these. Once a source exists, failures are
/// logged and degrade to safe defaults.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// None of the commands needed to query the theme exist.
    #[error("None of the required commands are available: {}", .commands.join(", "))]
    MissingCommand { commands: Vec<String> },

    /// The settings store could not be watched.
    #[error("Failed to watch '{path}': {message}")]
    Watch { path: PathBuf, message: String },

    /// The desktop portal could not be reached or answered with an error.
    #[error("Desktop portal error: {0}")]
    Portal(String),

    /// An I/O error while probing the environment.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The mechanism does not exist on this platform or OS version.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl SourceError {
    /// Create a missing-command error.
    pub fn missing_command<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingCommand {
            commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a watch error.
    pub fn watch(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Watch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a portal error.
    pub fn portal(message: impl Into<String>) -> Self {
        Self::Portal(message.into())
    }

    /// Create an unsupported error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }
}

/// Errors that can occur while loading or saving [`Settings`](crate::Settings).
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the settings file failed.
    #[error("Failed to access settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid TOML for [`Settings`](crate::Settings).
    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The settings could not be serialized.
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl SettingsError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
