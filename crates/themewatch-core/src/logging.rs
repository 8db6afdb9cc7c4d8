//! Logging facilities for themewatch.
//!
//! themewatch uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("themewatch=debug,themewatch_core=debug")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Monitor state machine target.
    pub const MONITOR: &str = "themewatch_core::monitor";
    /// Generic source plumbing (null and delegating sources).
    pub const SOURCE: &str = "themewatch_core::source";
    /// Windows registry source.
    pub const WINDOWS: &str = "themewatch::windows";
    /// macOS user defaults source.
    pub const MACOS: &str = "themewatch::macos";
    /// GNOME settings-store polling source.
    pub const GNOME: &str = "themewatch::gnome";
    /// XDG desktop portal source.
    pub const PORTAL: &str = "themewatch::portal";
    /// Platform probes and native library status.
    pub const PLATFORM: &str = "themewatch::platform";
    /// Settings file handling.
    pub const SETTINGS: &str = "themewatch::settings";
}
