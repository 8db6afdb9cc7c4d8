//! Linux theme sources.
//!
//! Linux has no single appearance API, so the Linux source is a
//! [`DelegatingSource`] that picks one mechanism when it is built:
//!
//! - the XDG desktop portal ([`PortalSource`]) when it answers
//! - on GNOME, the dconf watcher ([`GnomePollingSource`])
//! - otherwise a [`NullSource`]
//!
//! [`LinuxSettings::backend`] can force a single mechanism.

pub mod command;
pub mod gnome;
pub mod portal;

use std::fmt;

use themewatch_core::logging::targets;
use themewatch_core::{DelegatingSource, NullSource, SourceCandidate, ThemeSource};

pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use gnome::{GnomePollingSource, ThemeQuery};
pub use portal::PortalSource;

use super::environment::DesktopEnvironment;
use crate::settings::{LinuxBackend, LinuxSettings, Settings};

/// The Linux source: a delegate chosen from the desktop environment.
pub type LinuxSource = DelegatingSource;

/// A mechanism the Linux source may delegate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinuxCandidate {
    Portal,
    GnomePolling,
}

impl fmt::Display for LinuxCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinuxCandidate::Portal => write!(f, "portal"),
            LinuxCandidate::GnomePolling => write!(f, "gnome-polling"),
        }
    }
}

/// The mechanisms to try, in order, for the given settings and desktop.
pub fn candidate_order(
    settings: &LinuxSettings,
    desktop: &DesktopEnvironment,
) -> Vec<LinuxCandidate> {
    match settings.backend {
        LinuxBackend::Auto => {
            let mut order = vec![LinuxCandidate::Portal];
            if desktop.is_gnome() || settings.override_desktop_detection {
                order.push(LinuxCandidate::GnomePolling);
            }
            order
        }
        LinuxBackend::Portal => vec![LinuxCandidate::Portal],
        LinuxBackend::GnomePolling => vec![LinuxCandidate::GnomePolling],
        LinuxBackend::None => Vec::new(),
    }
}

fn build_candidate(candidate: LinuxCandidate, settings: &Settings) -> SourceCandidate {
    match candidate {
        LinuxCandidate::Portal => Box::new(|| match PortalSource::new() {
            Ok(source) => Some(Box::new(source) as Box<dyn ThemeSource>),
            Err(err) => {
                tracing::debug!(target: targets::PORTAL, error = %err, "Desktop portal unavailable");
                None
            }
        }),
        LinuxCandidate::GnomePolling => {
            let gnome = settings.gnome.clone();
            Box::new(move || match GnomePollingSource::new(&gnome) {
                Ok(source) => Some(Box::new(source) as Box<dyn ThemeSource>),
                Err(err) => {
                    tracing::warn!(target: targets::GNOME, error = %err, "GNOME polling source unavailable");
                    None
                }
            })
        }
    }
}

/// Build the Linux source for the current desktop.
pub fn linux_source(settings: &Settings) -> LinuxSource {
    let desktop = DesktopEnvironment::detect();
    let order = candidate_order(&settings.linux, &desktop);
    tracing::debug!(
        target: targets::PLATFORM,
        %desktop,
        backend = %settings.linux.backend,
        candidates = ?order,
        "Selecting Linux theme source"
    );

    let fallback = NullSource::with_reason(format!(
        "No theme source available on {desktop} (backend {})",
        settings.linux.backend
    ));
    DelegatingSource::first_available(
        order
            .into_iter()
            .map(|candidate| build_candidate(candidate, settings)),
        Box::new(fallback),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux(backend: LinuxBackend, override_desktop_detection: bool) -> LinuxSettings {
        LinuxSettings {
            backend,
            override_desktop_detection,
        }
    }

    #[test]
    fn test_auto_on_gnome() {
        assert_eq!(
            candidate_order(&linux(LinuxBackend::Auto, false), &DesktopEnvironment::Gnome),
            vec![LinuxCandidate::Portal, LinuxCandidate::GnomePolling]
        );
    }

    #[test]
    fn test_auto_elsewhere_only_tries_portal() {
        assert_eq!(
            candidate_order(&linux(LinuxBackend::Auto, false), &DesktopEnvironment::Kde),
            vec![LinuxCandidate::Portal]
        );
        assert_eq!(
            candidate_order(&linux(LinuxBackend::Auto, true), &DesktopEnvironment::Kde),
            vec![LinuxCandidate::Portal, LinuxCandidate::GnomePolling]
        );
    }

    #[test]
    fn test_forced_backends() {
        let desktop = DesktopEnvironment::Unknown;
        assert_eq!(
            candidate_order(&linux(LinuxBackend::Portal, false), &desktop),
            vec![LinuxCandidate::Portal]
        );
        assert_eq!(
            candidate_order(&linux(LinuxBackend::GnomePolling, false), &desktop),
            vec![LinuxCandidate::GnomePolling]
        );
        assert!(candidate_order(&linux(LinuxBackend::None, true), &desktop).is_empty());
    }

    #[test]
    fn test_disabled_backend_yields_null() {
        let mut settings = Settings::default();
        settings.linux.backend = LinuxBackend::None;
        let source = linux_source(&settings);
        assert_eq!(source.kind(), themewatch_core::SourceKind::Null);
        assert!(!source.is_available());
        assert!(source.compatibility().reason.contains("backend none"));
    }
}
