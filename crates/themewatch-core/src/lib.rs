//! Core systems for themewatch.
//!
//! This crate provides the platform-agnostic half of themewatch:
//!
//! - **Theme State**: [`ThemeState`] snapshots and the change-detection rule
//! - **Theme Sources**: the [`ThemeSource`] capability trait implemented once
//!   per platform mechanism, plus [`NullSource`] and [`DelegatingSource`]
//! - **Monitor**: the [`ThemeMonitor`] start/stop state machine that turns
//!   native "possible change" signals into deduplicated host callbacks
//! - **Fallback**: [`NullMonitor`] and [`create_monitor`] for platforms where
//!   nothing is available
//!
//! Platform sources live in the `themewatch` crate.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use themewatch_core::{
//!     HandleId, Monitor, NotificationCallback, SourceKind, ThemeMonitor, ThemeSource,
//! };
//!
//! struct AlwaysDark;
//!
//! impl ThemeSource for AlwaysDark {
//!     fn kind(&self) -> SourceKind { SourceKind::Null }
//!     fn is_dark_theme_enabled(&self) -> bool { true }
//!     fn is_high_contrast_enabled(&self) -> bool { false }
//!     fn create_event_handler(&self, _: NotificationCallback) -> HandleId {
//!         HandleId::from_raw(1)
//!     }
//!     fn delete_event_handler(&self, _: HandleId) {}
//!     fn is_available(&self) -> bool { true }
//! }
//!
//! let monitor = ThemeMonitor::new(AlwaysDark, |dark, high_contrast| {
//!     println!("dark={dark} high_contrast={high_contrast}");
//! })?;
//! monitor.start();
//! assert!(monitor.is_running());
//! monitor.stop();
//! # Ok::<(), themewatch_core::MonitorError>(())
//! ```

pub mod delegate;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod fake;
pub mod logging;
pub mod monitor;
pub mod null;
pub mod source;
pub mod state;

pub use delegate::{DelegatingSource, SourceCandidate};
pub use error::{MonitorError, MonitorResult};
#[cfg(any(test, feature = "test-util"))]
pub use fake::FakeSource;
pub use monitor::{Monitor, NullMonitor, ThemeCallback, ThemeMonitor, create_monitor};
pub use null::NullSource;
pub use source::{Compatibility, HandleId, NotificationCallback, SourceKind, ThemeSource};
pub use state::ThemeState;
