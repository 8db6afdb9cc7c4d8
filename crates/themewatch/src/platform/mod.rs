//! Platform theme sources and system probes.
//!
//! # Sources
//!
//! | Platform | Source | Mechanism |
//! |----------|--------|-----------|
//! | Windows  | [`WindowsSource`] | Registry values and `RegNotifyChangeKeyValue` |
//! | macOS    | [`MacOsSource`] | `NSUserDefaults` and `NSWorkspace`, polled |
//! | Linux    | [`LinuxSource`] | XDG desktop portal or the GNOME dconf watcher |
//! | Other    | [`NullSource`](themewatch_core::NullSource) | None |
//!
//! [`platform_source`] picks the right one for the compile target.
//!
//! # Probes
//!
//! [`Architecture`], [`OsVersion`] and [`DesktopEnvironment`] describe the
//! running system. [`NativeLibrary`] caches whether the native bindings are
//! usable for the whole process.

mod environment;
mod library;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

pub use environment::{Architecture, DesktopEnvironment, OsVersion, TargetOs};
pub use library::{LibraryStatus, NativeLibrary, check_compatibility};

#[cfg(target_os = "linux")]
pub use linux::{
    CommandOutput, CommandRunner, GnomePollingSource, LinuxCandidate, LinuxSource, PortalSource,
    SystemCommandRunner, ThemeQuery, candidate_order, linux_source,
};
#[cfg(target_os = "macos")]
pub use macos::MacOsSource;
#[cfg(target_os = "windows")]
pub use self::windows::WindowsSource;

use themewatch_core::ThemeSource;

use crate::settings::Settings;

/// Build the theme source for the compile target.
///
/// Unsupported targets get a [`NullSource`](themewatch_core::NullSource). The returned source may still
/// be unavailable at runtime; check [`ThemeSource::is_available`] or let
/// [`platform_monitor`](crate::platform_monitor) fall back for you.
pub fn platform_source(settings: &Settings) -> Box<dyn ThemeSource> {
    platform_source_impl(settings)
}

#[cfg(target_os = "windows")]
fn platform_source_impl(_settings: &Settings) -> Box<dyn ThemeSource> {
    Box::new(WindowsSource::new())
}

#[cfg(target_os = "macos")]
fn platform_source_impl(settings: &Settings) -> Box<dyn ThemeSource> {
    Box::new(MacOsSource::new(&settings.macos))
}

#[cfg(target_os = "linux")]
fn platform_source_impl(settings: &Settings) -> Box<dyn ThemeSource> {
    Box::new(linux_source(settings))
}

#[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
fn platform_source_impl(_settings: &Settings) -> Box<dyn ThemeSource> {
    Box::new(themewatch_core::NullSource::with_reason(format!(
        "Theme monitoring is not supported on {}",
        TargetOs::current()
    )))
}
