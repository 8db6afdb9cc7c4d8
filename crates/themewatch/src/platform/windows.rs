//! Windows theme source.
//!
//! - **Dark mode**: `AppsUseLightTheme` under
//!   `HKCU\Software\Microsoft\Windows\CurrentVersion\Themes\Personalize`
//!   (`0` means dark)
//! - **High contrast**: the `SPI_GETHIGHCONTRAST` system parameter
//! - **Change events**: `RegNotifyChangeKeyValue` on the personalization and
//!   high contrast keys, waited on by one thread per registered handler

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use themewatch_core::logging::targets;
use themewatch_core::{
    Compatibility, HandleId, NotificationCallback, SourceKind, ThemeSource,
};
use windows::Win32::Foundation::{CloseHandle, ERROR_SUCCESS, HANDLE};
use windows::Win32::System::Registry::{
    HKEY, HKEY_CURRENT_USER, KEY_NOTIFY, KEY_QUERY_VALUE, REG_NOTIFY_CHANGE_LAST_SET,
    RegCloseKey, RegNotifyChangeKeyValue, RegOpenKeyExW,
};
use windows::Win32::System::Threading::{
    CreateEventW, INFINITE, SetEvent, WAIT_OBJECT_0, WaitForMultipleObjects,
};
use windows::core::{PCWSTR, w};

use super::library::NativeLibrary;
use crate::error::{SourceError, SourceResult};

const PERSONALIZE_KEY: PCWSTR = w!("Software\\Microsoft\\Windows\\CurrentVersion\\Themes\\Personalize");
const HIGH_CONTRAST_KEY: PCWSTR = w!("Control Panel\\Accessibility\\HighContrast");
const APPS_USE_LIGHT_THEME: PCWSTR = w!("AppsUseLightTheme");

/// How long registration waits for the listener thread to arm its keys.
const ARM_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) mod registry {
    use super::*;
    use windows::Win32::System::Registry::{RRF_RT_REG_DWORD, RegGetValueW};

    /// Read a `REG_DWORD` value, or `None` if it is missing.
    pub(crate) fn read_dword(root: HKEY, subkey: PCWSTR, value: PCWSTR) -> Option<u32> {
        let mut data: u32 = 0;
        let mut size = std::mem::size_of::<u32>() as u32;

        // SAFETY: `data` and `size` are live stack locals sized for a DWORD,
        // and RRF_RT_REG_DWORD restricts the read to four bytes.
        let status = unsafe {
            RegGetValueW(
                root,
                subkey,
                value,
                RRF_RT_REG_DWORD,
                None,
                Some(&mut data as *mut u32 as *mut c_void),
                Some(&mut size as *mut u32),
            )
        };
        (status == ERROR_SUCCESS).then_some(data)
    }
}

/// A registry key closed on drop.
struct OwnedKey(HKEY);

impl OwnedKey {
    fn open(subkey: PCWSTR) -> SourceResult<Self> {
        let mut key = HKEY::default();
        // SAFETY: `key` is a valid out pointer and `subkey` a static wide string.
        let status = unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                subkey,
                0,
                KEY_NOTIFY | KEY_QUERY_VALUE,
                &mut key,
            )
        };
        if status != ERROR_SUCCESS {
            return Err(SourceError::unsupported(format!(
                "RegOpenKeyExW failed with {}",
                status.0
            )));
        }
        Ok(Self(key))
    }

    fn arm(&self, event: &OwnedEvent) -> bool {
        // SAFETY: both the key and the event are open for the lifetime of `self`.
        let status = unsafe {
            RegNotifyChangeKeyValue(self.0, false, REG_NOTIFY_CHANGE_LAST_SET, event.0, true)
        };
        status == ERROR_SUCCESS
    }
}

impl Drop for OwnedKey {
    fn drop(&mut self) {
        // SAFETY: the key was opened by `OwnedKey::open` and is closed once.
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

/// An auto-reset event handle closed on drop.
struct OwnedEvent(HANDLE);

impl OwnedEvent {
    fn new() -> SourceResult<Self> {
        // SAFETY: no security attributes or name; the returned handle is owned.
        let handle = unsafe { CreateEventW(None, false, false, PCWSTR::null()) }
            .map_err(|e| SourceError::unsupported(format!("CreateEventW failed: {e}")))?;
        Ok(Self(handle))
    }

    fn signal(&self) {
        // SAFETY: the handle stays open until drop.
        if let Err(err) = unsafe { SetEvent(self.0) } {
            tracing::error!(target: targets::WINDOWS, error = %err, "SetEvent failed");
        }
    }
}

impl Drop for OwnedEvent {
    fn drop(&mut self) {
        // SAFETY: the handle was created by `OwnedEvent::new` and is closed once.
        unsafe {
            let _ = CloseHandle(self.0);
        }
    }
}

// SAFETY: event handles are process-wide kernel object references and may
// be signalled and waited on from any thread.
unsafe impl Send for OwnedEvent {}
unsafe impl Sync for OwnedEvent {}

fn notification_loop(
    stop: &OwnedEvent,
    callback: &NotificationCallback,
    ready: Sender<SourceResult<()>>,
) {
    let setup = || -> SourceResult<_> {
        let keys = [
            OwnedKey::open(PERSONALIZE_KEY)?,
            OwnedKey::open(HIGH_CONTRAST_KEY)?,
        ];
        let events = [OwnedEvent::new()?, OwnedEvent::new()?];
        for (key, event) in keys.iter().zip(&events) {
            if !key.arm(event) {
                return Err(SourceError::unsupported("RegNotifyChangeKeyValue failed"));
            }
        }
        Ok((keys, events))
    };

    let (keys, events) = match setup() {
        Ok(armed) => {
            let _ = ready.send(Ok(()));
            armed
        }
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    let handles = [stop.0, events[0].0, events[1].0];
    loop {
        // SAFETY: all three handles stay open for the duration of the wait.
        let result = unsafe { WaitForMultipleObjects(&handles, false, INFINITE) };
        let index = result.0.wrapping_sub(WAIT_OBJECT_0.0) as usize;

        match index {
            0 => {
                tracing::debug!(target: targets::WINDOWS, "Registry listener stopped");
                return;
            }
            1 | 2 => {
                let slot = index - 1;
                if !keys[slot].arm(&events[slot]) {
                    tracing::error!(
                        target: targets::WINDOWS,
                        "Could not re-arm registry notification; theme changes will no longer be detected"
                    );
                    return;
                }
                tracing::trace!(target: targets::WINDOWS, slot, "Registry key changed");
                callback();
            }
            _ => {
                tracing::error!(
                    target: targets::WINDOWS,
                    result = result.0,
                    "Waiting for registry notifications failed"
                );
                return;
            }
        }
    }
}

struct Listener {
    stop: std::sync::Arc<OwnedEvent>,
    thread: Option<JoinHandle<()>>,
}

impl Listener {
    fn is_alive(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    fn shut_down(mut self, handle: HandleId) {
        self.stop.signal();
        if let Some(thread) = self.thread.take() {
            if thread.thread().id() == std::thread::current().id() {
                return;
            }
            if thread.join().is_err() {
                tracing::error!(target: targets::WINDOWS, %handle, "Registry listener thread panicked");
            }
        }
    }
}

/// Reads the appearance from the registry and system parameters.
#[derive(Default)]
pub struct WindowsSource {
    listeners: Mutex<HashMap<HandleId, Listener>>,
    next_handle: AtomicU64,
}

impl WindowsSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_listener(&self, callback: NotificationCallback) -> SourceResult<Listener> {
        let stop = std::sync::Arc::new(OwnedEvent::new()?);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let thread = std::thread::Builder::new()
            .name("themewatch-registry".to_string())
            .spawn({
                let stop = std::sync::Arc::clone(&stop);
                move || notification_loop(&stop, &callback, ready_tx)
            })?;
        let listener = Listener {
            stop,
            thread: Some(thread),
        };

        match ready_rx.recv_timeout(ARM_TIMEOUT) {
            Ok(Ok(())) => Ok(listener),
            Ok(Err(err)) => {
                listener.shut_down(HandleId::NONE);
                Err(err)
            }
            Err(_) => {
                listener.shut_down(HandleId::NONE);
                Err(SourceError::unsupported("Registry listener did not start"))
            }
        }
    }
}

impl ThemeSource for WindowsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Windows
    }

    fn is_dark_theme_enabled(&self) -> bool {
        registry::read_dword(HKEY_CURRENT_USER, PERSONALIZE_KEY, APPS_USE_LIGHT_THEME)
            .is_some_and(|light| light == 0)
    }

    fn is_high_contrast_enabled(&self) -> bool {
        use windows::Win32::UI::Accessibility::HIGHCONTRASTW;
        use windows::Win32::UI::WindowsAndMessaging::{
            SPI_GETHIGHCONTRAST, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS, SystemParametersInfoW,
        };

        let mut hc = HIGHCONTRASTW {
            cbSize: std::mem::size_of::<HIGHCONTRASTW>() as u32,
            ..Default::default()
        };

        // SAFETY: `hc` is a live HIGHCONTRASTW with cbSize set, and the API
        // only writes within the struct.
        let result = unsafe {
            SystemParametersInfoW(
                SPI_GETHIGHCONTRAST,
                hc.cbSize,
                Some(&mut hc as *mut _ as *mut c_void),
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
            )
        };

        // HCF_HIGHCONTRASTON = 0x00000001
        result.is_ok() && (hc.dwFlags.0 & 0x0000_0001) != 0
    }

    fn create_event_handler(&self, callback: NotificationCallback) -> HandleId {
        match self.spawn_listener(callback) {
            Ok(listener) => {
                let handle =
                    HandleId::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed) + 1);
                self.listeners.lock().insert(handle, listener);
                tracing::debug!(target: targets::WINDOWS, %handle, "Listening for registry changes");
                handle
            }
            Err(err) => {
                tracing::error!(target: targets::WINDOWS, error = %err, "Could not register registry listener");
                HandleId::NONE
            }
        }
    }

    fn delete_event_handler(&self, handle: HandleId) {
        let listener = self.listeners.lock().remove(&handle);
        match listener {
            Some(listener) => listener.shut_down(handle),
            None => tracing::trace!(target: targets::WINDOWS, %handle, "Ignoring unknown handle"),
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
}

impl Drop for WindowsSource {
    fn drop(&mut self) {
        for (handle, listener) in self.listeners.get_mut().drain() {
            listener.shut_down(handle);
        }
    }
}

impl std::fmt::Debug for WindowsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowsSource")
            .field("listeners", &self.listeners.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_queries_do_not_panic() {
        let source = WindowsSource::new();
        let _ = source.is_dark_theme_enabled();
        let _ = source.is_high_contrast_enabled();
    }

    #[test]
    fn test_register_and_delete() {
        let source = WindowsSource::new();
        let handle = source.create_event_handler(Arc::new(|| {}));
        assert!(!handle.is_none());
        assert!(source.listeners.lock().contains_key(&handle));

        source.delete_event_handler(handle);
        source.delete_event_handler(handle);
        assert!(source.listeners.lock().is_empty());
    }

    #[test]
    fn test_unknown_handle_is_ignored() {
        let source = WindowsSource::new();
        source.delete_event_handler(HandleId::from_raw(42));
        source.delete_event_handler(HandleId::NONE);
    }
}
