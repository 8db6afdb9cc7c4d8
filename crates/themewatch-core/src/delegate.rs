//! A source that forwards to a delegate chosen at construction time.

use crate::source::{Compatibility, HandleId, NotificationCallback, SourceKind, ThemeSource};
use crate::state::ThemeState;

/// A lazily constructed candidate for [`DelegatingSource::first_available`].
///
/// Returning `None` means the candidate could not even be set up.
pub type SourceCandidate = Box<dyn FnOnce() -> Option<Box<dyn ThemeSource>>>;

/// Forwards every operation to a concrete source picked when it is built.
///
/// This is how environment-dependent platforms (Linux desktops) present a
/// single source while choosing between several mechanisms.
pub struct DelegatingSource {
    delegate: Box<dyn ThemeSource>,
}

impl DelegatingSource {
    /// Wrap an already chosen delegate.
    pub fn new(delegate: impl ThemeSource + 'static) -> Self {
        Self {
            delegate: Box::new(delegate),
        }
    }

    /// Wrap an already boxed delegate.
    pub fn from_boxed(delegate: Box<dyn ThemeSource>) -> Self {
        Self { delegate }
    }

    /// Build from the first candidate that is available.
    ///
    /// Candidates are constructed lazily in order. If none is available the
    /// `fallback` is used.
    pub fn first_available<I>(candidates: I, fallback: Box<dyn ThemeSource>) -> Self
    where
        I: IntoIterator<Item = SourceCandidate>,
    {
        for candidate in candidates {
            if let Some(source) = candidate() {
                if source.is_available() {
                    tracing::debug!(
                        target: crate::logging::targets::SOURCE,
                        kind = %source.kind(),
                        "Selected theme source"
                    );
                    return Self { delegate: source };
                }
                tracing::debug!(
                    target: crate::logging::targets::SOURCE,
                    kind = %source.kind(),
                    "Skipping unavailable theme source"
                );
            }
        }
        Self { delegate: fallback }
    }

    /// The chosen delegate.
    pub fn delegate(&self) -> &dyn ThemeSource {
        self.delegate.as_ref()
    }
}

impl ThemeSource for DelegatingSource {
    fn kind(&self) -> SourceKind {
        self.delegate.kind()
    }

    fn is_dark_theme_enabled(&self) -> bool {
        self.delegate.is_dark_theme_enabled()
    }

    fn is_high_contrast_enabled(&self) -> bool {
        self.delegate.is_high_contrast_enabled()
    }

    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId {
        self.delegate.create_event_handler(callback)
    }

    fn delete_event_handler(&self, handle: HandleId) {
        self.delegate.delete_event_handler(handle)
    }

    fn is_available(&self) -> bool {
        self.delegate.is_available()
    }

    fn compatibility(&self) -> Compatibility {
        self.delegate.compatibility()
    }

    fn is_active(&self) -> bool {
        self.delegate.is_active()
    }

    fn install(&self) {
        self.delegate.install()
    }

    fn uninstall(&self) {
        self.delegate.uninstall()
    }

    fn state(&self) -> ThemeState {
        self.delegate.state()
    }
}

impl std::fmt::Debug for DelegatingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegatingSource")
            .field("kind", &self.delegate.kind())
            .finish()
    }
}
