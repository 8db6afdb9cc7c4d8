//! The source used when no platform mechanism is available.

use crate::source::{Compatibility, HandleId, NotificationCallback, SourceKind, ThemeSource};

/// A source that is never available and never reports anything.
#[derive(Debug, Clone, Default)]
pub struct NullSource {
    reason: Option<String>,
}

impl NullSource {
    /// Create a null source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a null source that explains why nothing better was chosen.
    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
        }
    }
}

impl ThemeSource for NullSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Null
    }

    fn is_dark_theme_enabled(&self) -> bool {
        false
    }

    fn is_high_contrast_enabled(&self) -> bool {
        false
    }

    fn create_event_handler(&self, _callback: NotificationCallback) -> HandleId {
        HandleId::NONE
    }

    fn delete_event_handler(&self, _handle: HandleId) {}

    fn is_available(&self) -> bool {
        false
    }

    fn compatibility(&self) -> Compatibility {
        Compatibility::unsupported(
            self.reason
                .clone()
                .unwrap_or_else(|| "no theme source for this platform".to_string()),
        )
    }
}
