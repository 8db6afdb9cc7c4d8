//! macOS theme source.
//!
//! - **Dark mode**: the `AppleInterfaceStyle` user default is `Dark`
//! - **High contrast**: `NSWorkspace.accessibilityDisplayShouldIncreaseContrast`
//! - **Change events**: a listener thread re-reads both at a fixed interval
//!   and signals when either differs. Observing the appearance directly
//!   requires the main thread and a running application.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use objc2::rc::Retained;
use objc2_app_kit::NSWorkspace;
use objc2_foundation::{NSString, NSUserDefaults};
use parking_lot::Mutex;
use themewatch_core::logging::targets;
use themewatch_core::{
    Compatibility, HandleId, NotificationCallback, SourceKind, ThemeSource, ThemeState,
};

use super::library::NativeLibrary;
use crate::settings::MacOsSettings;

fn read_dark() -> bool {
    let defaults: Retained<NSUserDefaults> = NSUserDefaults::standardUserDefaults();
    let key = NSString::from_str("AppleInterfaceStyle");
    defaults
        .stringForKey(&key)
        .is_some_and(|style| style.to_string().eq_ignore_ascii_case("dark"))
}

fn read_high_contrast() -> bool {
    NSWorkspace::sharedWorkspace().accessibilityDisplayShouldIncreaseContrast()
}

fn read_state() -> ThemeState {
    ThemeState::new(read_dark(), read_high_contrast())
}

struct Listener {
    stop: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl Listener {
    fn is_alive(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    fn shut_down(mut self, handle: HandleId) {
        let _ = self.stop.send(());
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() == std::thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                tracing::error!(target: targets::MACOS, %handle, "Appearance listener thread panicked");
            }
        }
    }
}

/// Reads the appearance from user defaults and the shared workspace.
pub struct MacOsSource {
    poll_interval: Duration,
    listeners: Mutex<HashMap<HandleId, Listener>>,
    next_handle: AtomicU64,
}

impl MacOsSource {
    pub fn new(settings: &MacOsSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            listeners: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(0),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

impl Default for MacOsSource {
    fn default() -> Self {
        Self::new(&MacOsSettings::default())
    }
}

impl ThemeSource for MacOsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::MacOs
    }

    fn is_dark_theme_enabled(&self) -> bool {
        read_dark()
    }

    fn is_high_contrast_enabled(&self) -> bool {
        read_high_contrast()
    }

    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let interval = self.poll_interval;

        let spawned = std::thread::Builder::new()
            .name("themewatch-appearance".to_string())
            .spawn(move || {
                let mut last = read_state();
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let current = read_state();
                            if current != last {
                                tracing::trace!(target: targets::MACOS, theme = %current, "Appearance changed");
                                last = current;
                                callback();
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!(target: targets::MACOS, "Appearance listener stopped");
            });

        match spawned {
            Ok(thread) => {
                let handle =
                    HandleId::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
                self.listeners.lock().insert(
                    handle,
                    Listener {
                        stop: stop_tx,
                        thread: Some(thread),
                    },
                );
                tracing::debug!(target: targets::MACOS, %handle, ?interval, "Listening for appearance changes");
                handle
            }
            Err(err) => {
                tracing::error!(target: targets::MACOS, error = %err, "Could not spawn appearance listener");
                HandleId::NONE
            }
        }
    }

    fn delete_event_handler(&self, handle: HandleId) {
        let listener = self.listeners.lock().remove(&handle);
        match listener {
            Some(listener) => listener.shut_down(handle),
            None => tracing::trace!(target: targets::MACOS, %handle, "Ignoring unknown handle"),
        }
    }

    fn is_available(&self) -> bool {
        NativeLibrary::get().loaded
    }

    fn compatibility(&self) -> Compatibility {
        NativeLibrary::get().compatibility.clone()
    }

    fn is_active(&self) -> bool {
        self.is_available() && self.listeners.lock().values().all(Listener::is_alive)
    }

    fn install(&self) {
        tracing::debug!(
            target: targets::MACOS,
            "Appearance is polled; no application bundle changes are needed"
        );
    }
}

impl Drop for MacOsSource {
    fn drop(&mut self) {
        for (handle, listener) in self.listeners.get_mut().drain() {
            listener.shut_down(handle);
        }
    }
}

impl std::fmt::Debug for MacOsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MacOsSource")
            .field("poll_interval", &self.poll_interval)
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}
