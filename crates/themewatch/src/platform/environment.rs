//! Probes for the operating system, CPU architecture and desktop.

use std::cmp::Ordering;
use std::fmt;

/// The operating system this crate was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetOs {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl TargetOs {
    /// The compile target's operating system.
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            TargetOs::Windows
        } else if cfg!(target_os = "macos") {
            TargetOs::MacOs
        } else if cfg!(target_os = "linux") {
            TargetOs::Linux
        } else {
            TargetOs::Other
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetOs::Windows => write!(f, "Windows"),
            TargetOs::MacOs => write!(f, "macOS"),
            TargetOs::Linux => write!(f, "Linux"),
            TargetOs::Other => write!(f, "unknown OS"),
        }
    }
}

/// CPU architecture of the compile target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    X86,
    X64,
    Arm64,
    Other,
}

impl Architecture {
    /// The compile target's architecture.
    pub const fn current() -> Self {
        if cfg!(target_arch = "x86") {
            Architecture::X86
        } else if cfg!(target_arch = "x86_64") {
            Architecture::X64
        } else if cfg!(target_arch = "aarch64") {
            Architecture::Arm64
        } else {
            Architecture::Other
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::X86 => write!(f, "x86"),
            Architecture::X64 => write!(f, "x64"),
            Architecture::Arm64 => write!(f, "arm64"),
            Architecture::Other => write!(f, "unknown architecture"),
        }
    }
}

/// An operating system version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OsVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl OsVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns true if this version is `major.minor` or later.
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        match self.major.cmp(&major) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.minor >= minor,
        }
    }

    /// Version of the running operating system, if it can be determined.
    ///
    /// - **Windows**: `CurrentMajorVersionNumber` and friends from the registry
    /// - **macOS**: `NSProcessInfo.operatingSystemVersion`
    /// - **Other**: `None`
    pub fn current() -> Option<Self> {
        Self::current_platform()
    }

    #[cfg(target_os = "windows")]
    fn current_platform() -> Option<Self> {
        use super::windows::registry;
        use windows::Win32::System::Registry::HKEY_LOCAL_MACHINE;
        use windows::core::w;

        const KEY: windows::core::PCWSTR = w!("SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion");
        let major = registry::read_dword(HKEY_LOCAL_MACHINE, KEY, w!("CurrentMajorVersionNumber"))?;
        let minor =
            registry::read_dword(HKEY_LOCAL_MACHINE, KEY, w!("CurrentMinorVersionNumber")).unwrap_or(0);
        Some(Self::new(major, minor, 0))
    }

    #[cfg(target_os = "macos")]
    fn current_platform() -> Option<Self> {
        use objc2_foundation::NSProcessInfo;

        let version = NSProcessInfo::processInfo().operatingSystemVersion();
        Some(Self::new(
            u32::try_from(version.majorVersion).ok()?,
            u32::try_from(version.minorVersion).ok()?,
            u32::try_from(version.patchVersion).unwrap_or(0),
        ))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    fn current_platform() -> Option<Self> {
        None
    }
}

impl fmt::Display for OsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// The Linux desktop environment the process runs under.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DesktopEnvironment {
    Gnome,
    Kde,
    Xfce,
    /// A desktop that was named but is not specially handled.
    Other(String),
    /// No desktop information in the environment.
    Unknown,
}

impl DesktopEnvironment {
    /// Detect from `XDG_CURRENT_DESKTOP`, falling back to `DESKTOP_SESSION`.
    pub fn detect() -> Self {
        let current = std::env::var("XDG_CURRENT_DESKTOP").ok();
        let session = std::env::var("DESKTOP_SESSION").ok();
        Self::from_vars(current.as_deref(), session.as_deref())
    }

    /// Classify from the raw variable values.
    ///
    /// `XDG_CURRENT_DESKTOP` is a colon separated list such as
    /// `ubuntu:GNOME`; any entry is enough to match.
    pub fn from_vars(current_desktop: Option<&str>, desktop_session: Option<&str>) -> Self {
        let names: Vec<&str> = current_desktop
            .into_iter()
            .flat_map(|value| value.split(':'))
            .chain(desktop_session)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();

        let Some(first) = names.first() else {
            return DesktopEnvironment::Unknown;
        };

        let has = |needle: &str| {
            names
                .iter()
                .any(|name| name.to_ascii_lowercase().contains(needle))
        };
        if has("gnome") {
            DesktopEnvironment::Gnome
        } else if has("kde") || has("plasma") {
            DesktopEnvironment::Kde
        } else if has("xfce") {
            DesktopEnvironment::Xfce
        } else {
            DesktopEnvironment::Other((*first).to_string())
        }
    }

    /// Returns true for GNOME and GNOME based desktops.
    pub fn is_gnome(&self) -> bool {
        matches!(self, DesktopEnvironment::Gnome)
    }
}

impl fmt::Display for DesktopEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesktopEnvironment::Gnome => write!(f, "GNOME"),
            DesktopEnvironment::Kde => write!(f, "KDE"),
            DesktopEnvironment::Xfce => write!(f, "Xfce"),
            DesktopEnvironment::Other(name) => write!(f, "{name}"),
            DesktopEnvironment::Unknown => write!(f, "unknown desktop"),
        }
    }
}
