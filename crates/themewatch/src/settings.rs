//! Persistent settings.
//!
//! Settings are stored as TOML in the platform configuration directory:
//!
//! - **Linux**: `~/.config/themewatch/settings.toml`
//! - **macOS**: `~/Library/Application Support/themewatch/settings.toml`
//! - **Windows**: `%APPDATA%\themewatch\config\settings.toml`
//!
//! Every field has a default, so a missing file or a partial file is fine.
//!
//! ```toml
//! [gnome]
//! guess_light_and_dark_themes = false
//! dark_theme = "Yaru-dark"
//!
//! [linux]
//! backend = "gnome-polling"
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};
use themewatch_core::logging::targets;

const SETTINGS_FILE: &str = "settings.toml";

/// All user-configurable settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// GNOME theme name handling.
    pub gnome: GnomeSettings,
    /// Linux backend selection.
    pub linux: LinuxSettings,
    /// macOS listener tuning.
    pub macos: MacOsSettings,
}

/// How the GNOME polling source maps a GTK theme name to a [`ThemeState`].
///
/// [`ThemeState`]: themewatch_core::ThemeState
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GnomeSettings {
    /// Guess the dark variant from the current theme name instead of
    /// comparing against the configured names.
    pub guess_light_and_dark_themes: bool,
    /// Theme considered light when not guessing.
    pub light_theme: String,
    /// Theme considered dark when not guessing.
    pub dark_theme: String,
    /// Theme considered high contrast when not guessing.
    pub high_contrast_theme: String,
    /// Debounce window for settings store file events, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for GnomeSettings {
    fn default() -> Self {
        Self {
            guess_light_and_dark_themes: true,
            light_theme: "Adwaita".to_string(),
            dark_theme: "Adwaita-dark".to_string(),
            high_contrast_theme: "HighContrast".to_string(),
            debounce_ms: 50,
        }
    }
}

impl GnomeSettings {
    /// The debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Which mechanism the Linux source should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinuxBackend {
    /// Portal first, then GNOME polling on GNOME desktops.
    #[default]
    Auto,
    /// Only the XDG desktop portal.
    Portal,
    /// Only the GNOME settings store watcher.
    GnomePolling,
    /// Disable monitoring.
    None,
}

impl fmt::Display for LinuxBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinuxBackend::Auto => write!(f, "auto"),
            LinuxBackend::Portal => write!(f, "portal"),
            LinuxBackend::GnomePolling => write!(f, "gnome-polling"),
            LinuxBackend::None => write!(f, "none"),
        }
    }
}

/// Linux backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinuxSettings {
    /// Backend to use.
    pub backend: LinuxBackend,
    /// Treat any desktop as GNOME when picking a backend.
    pub override_desktop_detection: bool,
}

/// macOS listener tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacOsSettings {
    /// How often the listener thread re-reads the appearance, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for MacOsSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
        }
    }
}

impl MacOsSettings {
    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Settings {
    /// The default settings file location, if a home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "themewatch").map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Load from [`default_path`](Self::default_path).
    ///
    /// Falls back to defaults when there is no home directory or no file.
    pub fn load() -> SettingsResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(path),
            None => {
                tracing::debug!(
                    target: targets::SETTINGS,
                    "No configuration directory; using default settings"
                );
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific file. A missing file yields defaults.
    pub fn load_from(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    target: targets::SETTINGS,
                    path = %path.display(),
                    "Settings file not found; using defaults"
                );
                return Ok(Self::default());
            }
            Err(err) => return Err(SettingsError::io(path, err)),
        };

        let settings: Settings =
            toml::from_str(&content).map_err(|err| SettingsError::parse(path, err))?;
        tracing::debug!(target: targets::SETTINGS, path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Write to a specific file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> SettingsResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| SettingsError::io(parent, err))?;
        }
        fs::write(path, content).map_err(|err| SettingsError::io(path, err))?;

        tracing::debug!(target: targets::SETTINGS, path = %path.display(), "Saved settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.gnome.guess_light_and_dark_themes);
        assert_eq!(settings.gnome.light_theme, "Adwaita");
        assert_eq!(settings.gnome.dark_theme, "Adwaita-dark");
        assert_eq!(settings.gnome.high_contrast_theme, "HighContrast");
        assert_eq!(settings.gnome.debounce(), Duration::from_millis(50));
        assert_eq!(settings.linux.backend, LinuxBackend::Auto);
        assert!(!settings.linux.override_desktop_detection);
        assert_eq!(settings.macos.poll_interval(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [gnome]
            dark_theme = "Yaru-dark"

            [linux]
            backend = "gnome-polling"
            "#,
        )
        .unwrap();

        assert_eq!(settings.gnome.dark_theme, "Yaru-dark");
        assert_eq!(settings.gnome.light_theme, "Adwaita");
        assert!(settings.gnome.guess_light_and_dark_themes);
        assert_eq!(settings.linux.backend, LinuxBackend::GnomePolling);
        assert_eq!(settings.macos, MacOsSettings::default());
    }

    #[test]
    fn test_backend_names() {
        for backend in [
            LinuxBackend::Auto,
            LinuxBackend::Portal,
            LinuxBackend::GnomePolling,
            LinuxBackend::None,
        ] {
            let text = format!("backend = \"{backend}\"");
            let parsed: LinuxSettings = toml::from_str(&text).unwrap();
            assert_eq!(parsed.backend, backend);
        }
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result: Result<LinuxSettings, _> = toml::from_str("backend = \"kde\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_poll_interval_clamped() {
        let settings = MacOsSettings { poll_interval_ms: 0 };
        assert_eq!(settings.poll_interval(), Duration::from_millis(1));
    }
}
