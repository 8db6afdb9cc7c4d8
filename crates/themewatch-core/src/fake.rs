//! A scriptable source for tests.
//!
//! [`FakeSource`] is cheap to clone; clones share state, so a test can hand
//! one clone to a monitor and keep another to drive it.
//!
//! ```ignore
//! use std::sync::Arc;
//! use themewatch_core::{FakeSource, Monitor, ThemeMonitor};
//! use parking_lot::Mutex;
//!
//! let source = FakeSource::new(false, false);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = seen.clone();
//! let monitor = ThemeMonitor::new(source.clone(), move |dark, hc| {
//!     seen_clone.lock().push((dark, hc));
//! })
//! .unwrap();
//!
//! monitor.start();
//! source.set_state(true, false);
//! source.fire();
//! assert_eq!(*seen.lock(), vec![(false, false), (true, false)]);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::source::{HandleId, NotificationCallback, SourceKind, ThemeSource};

#[derive(Default)]
struct FakeState {
    kind: Option<SourceKind>,
    dark: bool,
    high_contrast: bool,
    unavailable: bool,
    inactive: bool,
    fail_registration: bool,
    next_handle: u64,
    handlers: BTreeMap<u64, NotificationCallback>,
    created: Vec<HandleId>,
    deleted: Vec<HandleId>,
    installs: usize,
    uninstalls: usize,
}

/// An in-memory [`ThemeSource`] driven by the test.
///
/// Reports [`SourceKind::Null`] unless [`with_kind`](Self::with_kind) picks
/// the mechanism it stands in for.
#[derive(Clone, Default)]
pub struct FakeSource {
    state: Arc<Mutex<FakeState>>,
}

impl FakeSource {
    /// An available source reporting the given state.
    pub fn new(dark: bool, high_contrast: bool) -> Self {
        let source = Self::default();
        source.set_state(dark, high_contrast);
        source
    }

    /// A source that fails its capability probe.
    pub fn unavailable() -> Self {
        let source = Self::default();
        source.state.lock().unavailable = true;
        source
    }

    /// Report `kind` as the mechanism behind this source.
    pub fn with_kind(self, kind: SourceKind) -> Self {
        self.state.lock().kind = Some(kind);
        self
    }

    /// Change what subsequent queries report. Does not notify.
    pub fn set_state(&self, dark: bool, high_contrast: bool) {
        let mut state = self.state.lock();
        state.dark = dark;
        state.high_contrast = high_contrast;
    }

    /// Make registration return [`HandleId::NONE`].
    pub fn fail_registration(&self, fail: bool) {
        self.state.lock().fail_registration = fail;
    }

    /// Simulate the listener machinery dying.
    pub fn set_active(&self, active: bool) {
        self.state.lock().inactive = !active;
    }

    /// Invoke every registered handler on the calling thread.
    pub fn fire(&self) {
        let handlers: Vec<NotificationCallback> =
            self.state.lock().handlers.values().cloned().collect();
        for handler in handlers {
            handler();
        }
    }

    /// Handlers currently registered, in creation order.
    ///
    /// Keeping a clone lets a test model a native notification that was
    /// already in flight when its handler was deleted.
    pub fn handler_snapshot(&self) -> Vec<NotificationCallback> {
        self.state.lock().handlers.values().cloned().collect()
    }

    /// Handles returned by successful registrations, in order.
    pub fn created_handles(&self) -> Vec<HandleId> {
        self.state.lock().created.clone()
    }

    /// Handles passed to `delete_event_handler`, in order.
    pub fn deleted_handles(&self) -> Vec<HandleId> {
        self.state.lock().deleted.clone()
    }

    /// Number of handlers currently registered.
    pub fn active_handlers(&self) -> usize {
        self.state.lock().handlers.len()
    }

    /// How many times `install` was forwarded.
    pub fn install_count(&self) -> usize {
        self.state.lock().installs
    }

    /// How many times `uninstall` was forwarded.
    pub fn uninstall_count(&self) -> usize {
        self.state.lock().uninstalls
    }
}

impl ThemeSource for FakeSource {
    fn kind(&self) -> SourceKind {
        self.state.lock().kind.unwrap_or(SourceKind::Null)
    }

    fn is_dark_theme_enabled(&self) -> bool {
        self.state.lock().dark
    }

    fn is_high_contrast_enabled(&self) -> bool {
        self.state.lock().high_contrast
    }

    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId {
        let mut state = self.state.lock();
        if state.fail_registration {
            return HandleId::NONE;
        }
        state.next_handle += 1;
        let raw = state.next_handle;
        state.handlers.insert(raw, callback);
        let handle = HandleId::from_raw(raw);
        state.created.push(handle);
        handle
    }

    fn delete_event_handler(&self, handle: HandleId) {
        let mut state = self.state.lock();
        state.deleted.push(handle);
        state.handlers.remove(&handle.raw());
    }

    fn is_available(&self) -> bool {
        !self.state.lock().unavailable
    }

    fn is_active(&self) -> bool {
        let state = self.state.lock();
        !state.unavailable && !state.inactive
    }

    fn install(&self) {
        self.state.lock().installs += 1;
    }

    fn uninstall(&self) {
        self.state.lock().uninstalls += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_configurable() {
        assert_eq!(FakeSource::new(false, false).kind(), SourceKind::Null);

        let source = FakeSource::new(true, false).with_kind(SourceKind::Windows);
        assert_eq!(source.clone().kind(), SourceKind::Windows);
        assert!(source.is_available());
    }
}
