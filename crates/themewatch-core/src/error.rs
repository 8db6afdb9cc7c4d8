//! Error types for themewatch.

use crate::source::SourceKind;

/// A specialized Result type for monitor construction.
pub type MonitorResult<T> = std::result::Result<T, MonitorError>;

/// Errors reported when a [`ThemeMonitor`](crate::ThemeMonitor) cannot be used.
///
/// Runtime operations never produce these; only construction and the
/// terminal `uninstall` transition do.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MonitorError {
    /// The source failed its capability probe.
    #[error("{kind} theme source is unavailable: {reason}")]
    Unavailable {
        /// Which source variant was rejected.
        kind: SourceKind,
        /// Human readable explanation from the source.
        reason: String,
    },

    /// The monitor was uninstalled and released its source.
    #[error("Theme monitor has been uninstalled")]
    Uninstalled,
}

impl MonitorError {
    /// Create an unavailable-source error.
    pub fn unavailable(kind: SourceKind, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            kind,
            reason: reason.into(),
        }
    }

    /// Returns true if this error came from a failed capability probe.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
