//! GNOME theme source backed by the XDG desktop portal.
//!
//! Reads `org.freedesktop.appearance` through `ashpd`:
//!
//! - `color-scheme`: `1` prefers dark, `2` prefers light, `0` no preference
//! - `contrast`: `1` high contrast, `0` normal
//!
//! Change events come from the portal's `SettingChanged` signal, consumed
//! on a dedicated thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use ashpd::desktop::settings::Settings;
use crossbeam_channel::Sender;
use futures_util::StreamExt;
use futures_util::future::{AbortHandle, Abortable};
use parking_lot::Mutex;
use themewatch_core::logging::targets;
use themewatch_core::{HandleId, NotificationCallback, SourceKind, ThemeSource, ThemeState};

use crate::error::{SourceError, SourceResult};

const APPEARANCE_NAMESPACE: &str = "org.freedesktop.appearance";
const COLOR_SCHEME_KEY: &str = "color-scheme";
const CONTRAST_KEY: &str = "contrast";

const COLOR_SCHEME_PREFER_DARK: u32 = 1;
const CONTRAST_HIGH: u32 = 1;

/// How long registration waits for the portal subscription.
const SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Returns true if a changed setting affects the theme state.
fn is_appearance_setting(namespace: &str, key: &str) -> bool {
    namespace == APPEARANCE_NAMESPACE && (key == COLOR_SCHEME_KEY || key == CONTRAST_KEY)
}

/// Map raw portal values to a theme state. Missing values read as "no".
pub fn state_from_portal(color_scheme: Option<u32>, contrast: Option<u32>) -> ThemeState {
    ThemeState::new(
        color_scheme == Some(COLOR_SCHEME_PREFER_DARK),
        contrast == Some(CONTRAST_HIGH),
    )
}

async fn read_appearance(key: &str) -> SourceResult<u32> {
    let settings = Settings::new()
        .await
        .map_err(|e| SourceError::portal(format!("failed to connect to portal: {e}")))?;
    settings
        .read::<u32>(APPEARANCE_NAMESPACE, key)
        .await
        .map_err(|e| SourceError::portal(format!("failed to read {key}: {e}")))
}

fn read_blocking(key: &str) -> Option<u32> {
    match pollster::block_on(read_appearance(key)) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(target: targets::PORTAL, key, error = %err, "Portal query failed");
            None
        }
    }
}

/// Subscribe and forward appearance changes until the stream ends.
async fn listen(callback: NotificationCallback, ready: Sender<SourceResult<()>>) -> SourceResult<()> {
    let subscribed = async {
        let settings = Settings::new()
            .await
            .map_err(|e| SourceError::portal(format!("failed to connect to portal: {e}")))?;
        let stream = settings
            .receive_setting_changed()
            .await
            .map_err(|e| SourceError::portal(format!("failed to subscribe: {e}")))?;
        Ok::<_, SourceError>((settings, stream))
    }
    .await;

    let (_settings, stream) = match subscribed {
        Ok(subscribed) => {
            let _ = ready.send(Ok(()));
            subscribed
        }
        Err(err) => {
            let message = err.to_string();
            let _ = ready.send(Err(err));
            return Err(SourceError::portal(message));
        }
    };

    let mut stream = std::pin::pin!(stream);
    while let Some(setting) = stream.next().await {
        if is_appearance_setting(setting.namespace(), setting.key()) {
            tracing::trace!(target: targets::PORTAL, key = setting.key(), "Appearance setting changed");
            callback();
        }
    }
    Ok(())
}

struct Listener {
    handle: HandleId,
    stopping: Arc<AtomicBool>,
    abort: AbortHandle,
    thread: Option<JoinHandle<()>>,
}

impl Listener {
    fn is_alive(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    fn shut_down(mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        self.abort.abort();

        if let Some(thread) = self.thread.take() {
            if thread.thread().id() == std::thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                tracing::error!(target: targets::PORTAL, handle = %self.handle, "Portal listener thread panicked");
            }
        }
    }
}

/// Reads the appearance through the XDG desktop portal.
pub struct PortalSource {
    listener: Mutex<Option<Listener>>,
    next_handle: AtomicU64,
}

impl PortalSource {
    /// Connect to the portal and check that it answers appearance queries.
    pub fn new() -> SourceResult<Self> {
        let color_scheme = pollster::block_on(read_appearance(COLOR_SCHEME_KEY))?;
        tracing::debug!(target: targets::PORTAL, color_scheme, "Desktop portal answered");
        Ok(Self {
            listener: Mutex::new(None),
            next_handle: AtomicU64::new(0),
        })
    }

    fn spawn_listener(&self, callback: NotificationCallback) -> SourceResult<Listener> {
        let (abort, registration) = AbortHandle::new_pair();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);
        let stopping = Arc::new(AtomicBool::new(false));

        let thread = std::thread::Builder::new()
            .name("themewatch-portal".to_string())
            .spawn({
                let stopping = Arc::clone(&stopping);
                move || {
                    let result =
                        pollster::block_on(Abortable::new(listen(callback, ready_tx), registration));
                    match result {
                        Err(_aborted) => {
                            tracing::debug!(target: targets::PORTAL, "Portal listener stopped");
                        }
                        Ok(Ok(())) if stopping.load(Ordering::SeqCst) => {
                            tracing::debug!(target: targets::PORTAL, "Portal signal stream closed");
                        }
                        Ok(Ok(())) => {
                            tracing::error!(
                                target: targets::PORTAL,
                                "Portal signal stream closed unexpectedly; theme changes will no longer be detected"
                            );
                        }
                        Ok(Err(err)) => {
                            tracing::error!(target: targets::PORTAL, error = %err, "Portal listener failed");
                        }
                    }
                }
            })?;

        let listener = Listener {
            handle: HandleId::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1),
            stopping,
            abort,
            thread: Some(thread),
        };

        match ready_rx.recv_timeout(SUBSCRIBE_TIMEOUT) {
            Ok(Ok(())) => Ok(listener),
            Ok(Err(err)) => {
                listener.shut_down();
                Err(err)
            }
            Err(_) => {
                listener.shut_down();
                Err(SourceError::portal("timed out subscribing to setting changes"))
            }
        }
    }
}

impl ThemeSource for PortalSource {
    fn kind(&self) -> SourceKind {
        SourceKind::GnomeNative
    }

    fn is_dark_theme_enabled(&self) -> bool {
        state_from_portal(read_blocking(COLOR_SCHEME_KEY), None).dark
    }

    fn is_high_contrast_enabled(&self) -> bool {
        state_from_portal(None, read_blocking(CONTRAST_KEY)).high_contrast
    }

    fn state(&self) -> ThemeState {
        state_from_portal(read_blocking(COLOR_SCHEME_KEY), read_blocking(CONTRAST_KEY))
    }

    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId {
        let mut listener = self.listener.lock();
        if let Some(existing) = listener.as_ref() {
            tracing::error!(
                target: targets::PORTAL,
                handle = %existing.handle,
                "Portal listener is already registered"
            );
            return HandleId::NONE;
        }

        match self.spawn_listener(callback) {
            Ok(spawned) => {
                let handle = spawned.handle;
                tracing::debug!(target: targets::PORTAL, %handle, "Listening for portal setting changes");
                *listener = Some(spawned);
                handle
            }
            Err(err) => {
                tracing::error!(target: targets::PORTAL, error = %err, "Could not subscribe to portal settings");
                HandleId::NONE
            }
        }
    }

    fn delete_event_handler(&self, handle: HandleId) {
        let listener = {
            let mut listener = self.listener.lock();
            match listener.as_ref() {
                Some(current) if current.handle == handle && !handle.is_none() => listener.take(),
                _ => None,
            }
        };

        match listener {
            Some(listener) => listener.shut_down(),
            None => tracing::trace!(target: targets::PORTAL, %handle, "Ignoring unknown handle"),
        }
    }

    fn is_available(&self) -> bool {
        self.is_active()
    }

    fn is_active(&self) -> bool {
        match self.listener.lock().as_ref() {
            Some(listener) => listener.is_alive(),
            None => true,
        }
    }
}

impl Drop for PortalSource {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.shut_down();
        }
    }
}

impl std::fmt::Debug for PortalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalSource")
            .field("listening", &self.listener.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_portal() {
        assert_eq!(state_from_portal(Some(1), Some(0)), ThemeState::new(true, false));
        assert_eq!(state_from_portal(Some(2), Some(1)), ThemeState::new(false, true));
        assert_eq!(state_from_portal(Some(0), None), ThemeState::new(false, false));
        assert_eq!(state_from_portal(None, None), ThemeState::default());
    }

    #[test]
    fn test_appearance_filter() {
        assert!(is_appearance_setting("org.freedesktop.appearance", "color-scheme"));
        assert!(is_appearance_setting("org.freedesktop.appearance", "contrast"));
        assert!(!is_appearance_setting("org.freedesktop.appearance", "accent-color"));
        assert!(!is_appearance_setting("org.gnome.desktop.interface", "color-scheme"));
    }

    #[test]
    #[ignore] // Needs a session bus with a running desktop portal
    fn test_portal_round_trip() {
        let source = PortalSource::new().unwrap();
        let _ = source.state();
        let handle = source.create_event_handler(Arc::new(|| {}));
        assert!(!handle.is_none());
        assert!(source.is_active());
        source.delete_event_handler(handle);
    }
}
