//! themewatch - dark mode and high contrast monitoring for the host OS.
//!
//! This is the main crate. It re-exports everything from `themewatch-core`
//! and adds the platform sources, settings and the theme-name heuristics
//! used on GNOME.
//!
//! # Example
//!
//! ```no_run
//! use themewatch::{Monitor, Settings, platform_monitor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load()?;
//!     let monitor = platform_monitor(&settings, |dark, high_contrast| {
//!         println!("dark={dark} high_contrast={high_contrast}");
//!     });
//!     monitor.install();
//!     monitor.start();
//!     // ...
//!     monitor.stop();
//!     Ok(())
//! }
//! ```

pub use themewatch_core::*;

pub mod error;
pub mod platform;
pub mod settings;
pub mod variants;

pub use error::{SettingsError, SettingsResult, SourceError, SourceResult};
pub use platform::{
    Architecture, DesktopEnvironment, LibraryStatus, NativeLibrary, OsVersion, TargetOs,
    check_compatibility, platform_source,
};
pub use settings::{GnomeSettings, LinuxBackend, LinuxSettings, MacOsSettings, Settings};
pub use variants::{ThemeVariants, guess_variants};

/// Build a monitor over the platform source.
///
/// If the platform source is unavailable the result is a [`NullMonitor`]
/// that never calls `callback`.
pub fn platform_monitor<F>(settings: &Settings, callback: F) -> Box<dyn Monitor>
where
    F: Fn(bool, bool) + Send + Sync + 'static,
{
    let source = platform_source(settings);
    tracing::info!(
        target: logging::targets::PLATFORM,
        kind = %source.kind(),
        available = source.is_available(),
        "Selected theme source"
    );
    create_monitor(source, callback)
}
