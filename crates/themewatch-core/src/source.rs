//! The theme source capability interface.
//!
//! A [`ThemeSource`] wraps one platform mechanism for reading the system
//! appearance and for being told when it might have changed. Sources only
//! signal "something may have changed"; the receiver re-queries the state and
//! decides whether the change is real.
//!
//! # Handles
//!
//! [`ThemeSource::create_event_handler`] returns an opaque [`HandleId`]. The
//! sentinel [`HandleId::NONE`] means registration failed. Every other value
//! must eventually be passed back to [`ThemeSource::delete_event_handler`].
//!
//! # Failure Semantics
//!
//! Sources never panic and never return errors at runtime. Queries that
//! cannot complete degrade to `false`, registration failures degrade to
//! [`HandleId::NONE`], and deleting an unknown handle is a no-op.

use std::fmt;
use std::sync::Arc;

use static_assertions::{assert_impl_all, assert_obj_safe};

use crate::state::ThemeState;

/// Callback handed to a source, invoked whenever the appearance may have
/// changed. It may run on any thread.
pub type NotificationCallback = Arc<dyn Fn() + Send + Sync>;

/// An opaque identifier for a registered event handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HandleId(u64);

impl HandleId {
    /// The "no handle" sentinel.
    pub const NONE: HandleId = HandleId(0);

    /// Wrap a raw handle value. `0` yields [`HandleId::NONE`].
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Returns true if this is the sentinel.
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "<none>")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// The platform mechanism behind a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Windows registry and system parameters.
    Windows,
    /// macOS user defaults and workspace accessibility settings.
    MacOs,
    /// GNOME settings store watched on disk and queried through a command.
    GnomePolling,
    /// GNOME through the XDG desktop portal.
    GnomeNative,
    /// No mechanism available.
    Null,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Windows => write!(f, "Windows"),
            SourceKind::MacOs => write!(f, "macOS"),
            SourceKind::GnomePolling => write!(f, "GNOME (polling)"),
            SourceKind::GnomeNative => write!(f, "GNOME (portal)"),
            SourceKind::Null => write!(f, "Null"),
        }
    }
}

/// Result of a source's capability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    /// Whether the source can be used.
    pub supported: bool,
    /// Why the source cannot be used. Empty when supported.
    pub reason: String,
}

impl Compatibility {
    /// A supported source.
    pub fn supported() -> Self {
        Self {
            supported: true,
            reason: String::new(),
        }
    }

    /// An unsupported source with an explanation.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self {
            supported: false,
            reason: reason.into(),
        }
    }
}

/// A platform-specific provider of appearance state and change events.
pub trait ThemeSource: Send + Sync {
    /// Which mechanism this source uses.
    fn kind(&self) -> SourceKind;

    /// Whether the dark color scheme is currently enabled.
    fn is_dark_theme_enabled(&self) -> bool;

    /// Whether high contrast mode is currently enabled.
    fn is_high_contrast_enabled(&self) -> bool;

    /// Register `callback` to be invoked on possible appearance changes.
    ///
    /// Returns [`HandleId::NONE`] if registration failed.
    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId;

    /// Release a handle obtained from [`create_event_handler`](Self::create_event_handler).
    ///
    /// Unknown, already deleted and sentinel handles are ignored.
    fn delete_event_handler(&self, handle: HandleId);

    /// Capability probe: true iff the native dependency is usable here.
    fn is_available(&self) -> bool;

    /// Detailed capability probe. Defaults to [`is_available`](Self::is_available).
    fn compatibility(&self) -> Compatibility {
        if self.is_available() {
            Compatibility::supported()
        } else {
            Compatibility::unsupported(format!("{} theme source is not available", self.kind()))
        }
    }

    /// Whether the machinery behind registered handlers is still alive.
    ///
    /// Sources that run their own listener thread report `false` once that
    /// thread has died without being asked to stop.
    fn is_active(&self) -> bool {
        self.is_available()
    }

    /// One-time environment setup.
    fn install(&self) {}

    /// One-time environment teardown.
    fn uninstall(&self) {}

    /// Query both flags at once.
    fn state(&self) -> ThemeState {
        ThemeState::new(self.is_dark_theme_enabled(), self.is_high_contrast_enabled())
    }
}

assert_obj_safe!(ThemeSource);
assert_impl_all!(HandleId: Send, Sync, Copy);

impl<S: ThemeSource + ?Sized> ThemeSource for Box<S> {
    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn is_dark_theme_enabled(&self) -> bool {
        (**self).is_dark_theme_enabled()
    }

    fn is_high_contrast_enabled(&self) -> bool {
        (**self).is_high_contrast_enabled()
    }

    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId {
        (**self).create_event_handler(callback)
    }

    fn delete_event_handler(&self, handle: HandleId) {
        (**self).delete_event_handler(handle)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn compatibility(&self) -> Compatibility {
        (**self).compatibility()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn install(&self) {
        (**self).install()
    }

    fn uninstall(&self) {
        (**self).uninstall()
    }

    fn state(&self) -> ThemeState {
        (**self).state()
    }
}

impl<S: ThemeSource + ?Sized> ThemeSource for Arc<S> {
    fn kind(&self) -> SourceKind {
        (**self).kind()
    }

    fn is_dark_theme_enabled(&self) -> bool {
        (**self).is_dark_theme_enabled()
    }

    fn is_high_contrast_enabled(&self) -> bool {
        (**self).is_high_contrast_enabled()
    }

    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId {
        (**self).create_event_handler(callback)
    }

    fn delete_event_handler(&self, handle: HandleId) {
        (**self).delete_event_handler(handle)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn compatibility(&self) -> Compatibility {
        (**self).compatibility()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    fn install(&self) {
        (**self).install()
    }

    fn uninstall(&self) {
        (**self).uninstall()
    }

    fn state(&self) -> ThemeState {
        (**self).state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_sentinel() {
        assert!(HandleId::NONE.is_none());
        assert!(HandleId::from_raw(0).is_none());
        assert!(!HandleId::from_raw(7).is_none());
        assert_eq!(HandleId::from_raw(7).raw(), 7);
        assert_eq!(HandleId::default(), HandleId::NONE);
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(HandleId::NONE.to_string(), "<none>");
        assert_eq!(HandleId::from_raw(3).to_string(), "#3");
    }

    /// Counts `state()` calls separately from single-flag queries.
    #[derive(Default)]
    struct SnapshotOnly {
        snapshots: std::sync::atomic::AtomicUsize,
    }

    impl ThemeSource for SnapshotOnly {
        fn kind(&self) -> SourceKind {
            SourceKind::GnomePolling
        }
        fn is_dark_theme_enabled(&self) -> bool {
            panic!("flags must be read through state()")
        }
        fn is_high_contrast_enabled(&self) -> bool {
            panic!("flags must be read through state()")
        }
        fn create_event_handler(&self, _callback: NotificationCallback) -> HandleId {
            HandleId::NONE
        }
        fn delete_event_handler(&self, _handle: HandleId) {}
        fn is_available(&self) -> bool {
            true
        }
        fn state(&self) -> ThemeState {
            self.snapshots.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            ThemeState::new(true, true)
        }
    }

    #[test]
    fn test_wrappers_forward_state_snapshot() {
        let source = Arc::new(SnapshotOnly::default());
        let shared: Arc<dyn ThemeSource> = source.clone();
        assert_eq!(shared.state(), ThemeState::new(true, true));

        let boxed: Box<dyn ThemeSource> = Box::new(Arc::clone(&source));
        assert_eq!(boxed.state(), ThemeState::new(true, true));

        assert_eq!(source.snapshots.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_compatibility_constructors() {
        assert!(Compatibility::supported().supported);
        assert!(Compatibility::supported().reason.is_empty());

        let c = Compatibility::unsupported("no portal");
        assert!(!c.supported);
        assert_eq!(c.reason, "no portal");
    }
}
