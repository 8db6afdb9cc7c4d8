//! The theme monitor state machine.
//!
//! A [`ThemeMonitor`] wraps one [`ThemeSource`], remembers the last state it
//! reported, and turns the source's "something may have changed" signals into
//! real change events for a single host callback.
//!
//! # Lifecycle
//!
//! ```text
//!            start()                     uninstall()
//! Stopped ──────────► Running ─────────────────────► Uninstalled (terminal)
//!    ▲                   │
//!    └───────────────────┘
//!            stop()
//! ```
//!
//! `install()` is orthogonal and forwarded to the source at most once.
//!
//! # Threading
//!
//! The host callback runs synchronously on whichever thread delivered the
//! notification. `start`, `stop` and `uninstall` are expected to be called
//! from one lifecycle thread; callers serialize them. Notifications carry the
//! generation of the session that registered them, so a handler from an old
//! session can never deliver across a stop/start boundary.
//!
//! # Example
//!
//! ```
//! use themewatch_core::{Monitor, NullSource, ThemeMonitor, create_monitor};
//!
//! // An unavailable source is rejected by the constructor...
//! assert!(ThemeMonitor::new(NullSource::new(), |_, _| {}).is_err());
//!
//! // ...and turned into an inert monitor by the fallback helper.
//! let monitor = create_monitor(NullSource::new(), |dark, high_contrast| {
//!     println!("dark={dark} high_contrast={high_contrast}");
//! });
//! monitor.start();
//! assert!(!monitor.is_running());
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use crate::error::{MonitorError, MonitorResult};
use crate::logging::targets;
use crate::source::{HandleId, SourceKind, ThemeSource};
use crate::state::ThemeState;

/// The host sink invoked with `(dark, high_contrast)`.
pub type ThemeCallback = Arc<dyn Fn(bool, bool) + Send + Sync>;

/// Operations shared by real and inert monitors.
pub trait Monitor: Send + Sync {
    /// Begin monitoring. No-op if already running.
    fn start(&self);

    /// Stop monitoring and release the native handle. No-op if stopped.
    fn stop(&self);

    /// Dispatch to [`start`](Self::start) or [`stop`](Self::stop).
    fn set_running(&self, running: bool) {
        if running {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Whether the monitor currently holds a live native handle.
    fn is_running(&self) -> bool;

    /// Re-send the last known state to the host, bypassing change detection.
    fn request_update(&self);

    /// Forward one-time setup to the source.
    fn install(&self);

    /// Stop, tear down the source and release it. Terminal.
    fn uninstall(&self);
}

struct MonitorState {
    source: Option<Arc<dyn ThemeSource>>,
    callback: Option<ThemeCallback>,
    last_known: ThemeState,
    running: bool,
    handle: HandleId,
}

struct MonitorInner {
    state: Mutex<MonitorState>,
    /// Incremented on every start and stop, only while `state` is locked.
    generation: AtomicU64,
    installed: AtomicBool,
    kind: SourceKind,
}

impl MonitorInner {
    fn on_notification(&self, generation: u64) {
        tracing::trace!(target: targets::MONITOR, generation, "Received notification");

        if self.generation.load(Ordering::Acquire) != generation {
            tracing::trace!(target: targets::MONITOR, generation, "Ignoring stale notification");
            return;
        }

        let Some(source) = self.state.lock().source.clone() else {
            return;
        };
        let fresh = source.state();

        let (callback, changed) = {
            let mut state = self.state.lock();
            // Not running yet: `start` has not stored its seed for this generation.
            if self.generation.load(Ordering::Acquire) != generation || !state.running {
                return;
            }
            if !fresh.differs_from(&state.last_known) {
                return;
            }
            state.last_known = fresh;
            (state.callback.clone(), fresh)
        };

        tracing::debug!(target: targets::MONITOR, theme = %changed, "Theme changed");
        if let Some(callback) = callback {
            callback(changed.dark, changed.high_contrast);
        }
    }
}

/// Watches a [`ThemeSource`] and reports real appearance changes.
pub struct ThemeMonitor {
    inner: Arc<MonitorInner>,
}

assert_impl_all!(ThemeMonitor: Send, Sync);

impl ThemeMonitor {
    /// Create a monitor over `source`, reporting to `callback`.
    ///
    /// Fails with [`MonitorError::Unavailable`] if the source does not pass
    /// its capability probe. This is the only validation point.
    pub fn new<S, F>(source: S, callback: F) -> MonitorResult<Self>
    where
        S: ThemeSource + 'static,
        F: Fn(bool, bool) + Send + Sync + 'static,
    {
        Self::with_shared_source(Arc::new(source), Arc::new(callback))
    }

    /// Create a monitor over a source shared with other owners.
    pub fn with_shared_source(
        source: Arc<dyn ThemeSource>,
        callback: ThemeCallback,
    ) -> MonitorResult<Self> {
        let kind = source.kind();
        if !source.is_available() {
            return Err(MonitorError::unavailable(kind, source.compatibility().reason));
        }

        Ok(Self {
            inner: Arc::new(MonitorInner {
                state: Mutex::new(MonitorState {
                    source: Some(source),
                    callback: Some(callback),
                    last_known: ThemeState::default(),
                    running: false,
                    handle: HandleId::NONE,
                }),
                generation: AtomicU64::new(0),
                installed: AtomicBool::new(false),
                kind,
            }),
        })
    }

    /// The state most recently reported to the host.
    pub fn last_known(&self) -> ThemeState {
        self.inner.state.lock().last_known
    }

    /// The native handle currently held, or [`HandleId::NONE`].
    pub fn handle(&self) -> HandleId {
        self.inner.state.lock().handle
    }

    /// The kind of source this monitor was built over.
    pub fn source_kind(&self) -> SourceKind {
        self.inner.kind
    }

    /// Whether [`uninstall`](Monitor::uninstall) has released the source.
    pub fn is_uninstalled(&self) -> bool {
        self.inner.state.lock().source.is_none()
    }

    /// The source this monitor watches.
    ///
    /// Fails with [`MonitorError::Uninstalled`] once the source has been released.
    pub fn source(&self) -> MonitorResult<Arc<dyn ThemeSource>> {
        self.inner
            .state
            .lock()
            .source
            .clone()
            .ok_or(MonitorError::Uninstalled)
    }

    fn bump_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl Monitor for ThemeMonitor {
    fn start(&self) {
        let (source, generation) = {
            let state = self.inner.state.lock();
            if state.running {
                return;
            }
            let Some(source) = state.source.clone() else {
                tracing::warn!(
                    target: targets::MONITOR,
                    "Cannot start an uninstalled theme monitor"
                );
                return;
            };
            (source, self.bump_generation())
        };

        let weak: Weak<MonitorInner> = Arc::downgrade(&self.inner);
        let handle = source.create_event_handler(Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_notification(generation);
            }
        }));

        if handle.is_none() {
            {
                let _state = self.inner.state.lock();
                self.bump_generation();
            }
            tracing::error!(
                target: targets::MONITOR,
                kind = %self.inner.kind,
                "Could not create notification listener. Monitoring will not be started"
            );
            return;
        }

        let (callback, seeded) = {
            let mut state = self.inner.state.lock();
            // Read under the lock: a notification that got here first saw a
            // change this read includes, later ones compare against the seed.
            let fresh = source.state();
            state.running = true;
            state.handle = handle;
            state.last_known = fresh;
            (state.callback.clone(), fresh)
        };

        tracing::info!(
            target: targets::MONITOR,
            kind = %self.inner.kind,
            %handle,
            theme = %seeded,
            "Started theme monitoring"
        );
        if let Some(callback) = callback {
            callback(seeded.dark, seeded.high_contrast);
        }
    }

    fn stop(&self) {
        let (source, handle) = {
            let mut state = self.inner.state.lock();
            if !state.running {
                return;
            }
            state.running = false;
            self.bump_generation();
            (state.source.clone(), std::mem::take(&mut state.handle))
        };

        tracing::info!(target: targets::MONITOR, %handle, "Stopped theme monitoring");
        if let Some(source) = source {
            source.delete_event_handler(handle);
        }
    }

    fn is_running(&self) -> bool {
        let source = {
            let state = self.inner.state.lock();
            if !state.running {
                return false;
            }
            state.source.clone()
        };

        match source {
            Some(source) if !source.is_active() => {
                tracing::error!(
                    target: targets::MONITOR,
                    kind = %self.inner.kind,
                    "Theme source stopped delivering notifications; monitoring halted"
                );
                self.stop();
                false
            }
            _ => true,
        }
    }

    fn request_update(&self) {
        let (callback, last_known) = {
            let state = self.inner.state.lock();
            (state.callback.clone(), state.last_known)
        };
        if let Some(callback) = callback {
            callback(last_known.dark, last_known.high_contrast);
        }
    }

    fn install(&self) {
        if self.inner.installed.swap(true, Ordering::AcqRel) {
            return;
        }
        let source = self.inner.state.lock().source.clone();
        if let Some(source) = source {
            source.install();
        }
    }

    fn uninstall(&self) {
        self.stop();
        let source = {
            let mut state = self.inner.state.lock();
            state.callback = None;
            state.source.take()
        };
        if let Some(source) = source {
            source.uninstall();
            tracing::info!(target: targets::MONITOR, kind = %self.inner.kind, "Uninstalled theme monitor");
        }
    }
}

impl Drop for ThemeMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for ThemeMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ThemeMonitor")
            .field("kind", &self.inner.kind)
            .field("running", &state.running)
            .field("handle", &state.handle)
            .field("last_known", &state.last_known)
            .finish()
    }
}

/// A monitor that does nothing, used when no source is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMonitor;

impl Monitor for NullMonitor {
    fn start(&self) {}

    fn stop(&self) {}

    fn is_running(&self) -> bool {
        false
    }

    fn request_update(&self) {}

    fn install(&self) {}

    fn uninstall(&self) {}
}

/// Build a monitor, falling back to [`NullMonitor`] if the source is unavailable.
pub fn create_monitor<S, F>(source: S, callback: F) -> Box<dyn Monitor>
where
    S: ThemeSource + 'static,
    F: Fn(bool, bool) + Send + Sync + 'static,
{
    match ThemeMonitor::new(source, callback) {
        Ok(monitor) => Box::new(monitor),
        Err(err) => {
            tracing::warn!(target: targets::MONITOR, error = %err, "Theme monitoring disabled");
            Box::new(NullMonitor)
        }
    }
}
