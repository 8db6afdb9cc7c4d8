//! Process-wide native library status.
//!
//! The native theme APIs are process global, so whether they are usable is
//! decided once per process. [`NativeLibrary::get`] computes the status on
//! first use and caches it; [`NativeLibrary::release`] drops the cache so
//! the next call probes again.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use themewatch_core::Compatibility;
use themewatch_core::logging::targets;

use super::environment::{Architecture, OsVersion, TargetOs};

/// Outcome of loading the native theme bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryStatus {
    /// Whether the native bindings can be used.
    pub loaded: bool,
    /// Why the bindings cannot be used, if they cannot.
    pub compatibility: Compatibility,
    pub os: TargetOs,
    pub architecture: Architecture,
    pub os_version: Option<OsVersion>,
}

impl LibraryStatus {
    /// Compute the status for an explicit environment.
    pub fn probe(os: TargetOs, architecture: Architecture, os_version: Option<OsVersion>) -> Self {
        let compatibility = check_compatibility(os, architecture, os_version);
        Self {
            loaded: compatibility.supported,
            compatibility,
            os,
            architecture,
            os_version,
        }
    }

    /// Compute the status for the running process.
    pub fn probe_current() -> Self {
        Self::probe(
            TargetOs::current(),
            Architecture::current(),
            OsVersion::current(),
        )
    }
}

impl fmt::Display for LibraryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.loaded {
            write!(f, "loaded ({} {})", self.os, self.architecture)
        } else {
            write!(f, "not loaded: {}", self.compatibility.reason)
        }
    }
}

/// Architecture and minimum OS version rules for the native bindings.
///
/// - **Windows**: 10 or later on x86, x64 and arm64
/// - **macOS**: 10.14 or later on x64 and arm64
/// - **Everything else**: no native bindings
pub fn check_compatibility(
    os: TargetOs,
    architecture: Architecture,
    os_version: Option<OsVersion>,
) -> Compatibility {
    let (architectures, minimum): (&[Architecture], (u32, u32)) = match os {
        TargetOs::Windows => (
            &[Architecture::X86, Architecture::X64, Architecture::Arm64],
            (10, 0),
        ),
        TargetOs::MacOs => (&[Architecture::X64, Architecture::Arm64], (10, 14)),
        TargetOs::Linux | TargetOs::Other => {
            return Compatibility::unsupported(format!("No native theme library for {os}"));
        }
    };

    if !architectures.contains(&architecture) {
        return Compatibility::unsupported(format!(
            "Unsupported architecture {architecture} on {os}"
        ));
    }

    match os_version {
        Some(version) if version.at_least(minimum.0, minimum.1) => Compatibility::supported(),
        Some(version) => Compatibility::unsupported(format!(
            "{os} {version} is too old, {}.{} or later is required",
            minimum.0, minimum.1
        )),
        None => Compatibility::unsupported(format!("Could not determine the {os} version")),
    }
}

static STATUS: Mutex<Option<Arc<LibraryStatus>>> = parking_lot::const_mutex(None);

/// Lazily initialised, process-wide native library handle.
pub struct NativeLibrary;

impl NativeLibrary {
    /// The cached status, probing on first use.
    pub fn get() -> Arc<LibraryStatus> {
        let mut status = STATUS.lock();
        if let Some(status) = status.as_ref() {
            return Arc::clone(status);
        }

        let probed = Arc::new(LibraryStatus::probe_current());
        if probed.loaded {
            tracing::info!(target: targets::PLATFORM, status = %probed, "Native theme library loaded");
        } else {
            tracing::warn!(target: targets::PLATFORM, status = %probed, "Native theme library unavailable");
        }
        *status = Some(Arc::clone(&probed));
        probed
    }

    /// Shorthand for `NativeLibrary::get().loaded`.
    pub fn is_loaded() -> bool {
        Self::get().loaded
    }

    /// Drop the cached status.
    pub fn release() {
        if STATUS.lock().take().is_some() {
            tracing::debug!(target: targets::PLATFORM, "Released native theme library");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_requirements() {
        let win10 = Some(OsVersion::new(10, 0, 0));
        for arch in [Architecture::X86, Architecture::X64, Architecture::Arm64] {
            assert!(check_compatibility(TargetOs::Windows, arch, win10).supported);
        }
        assert!(!check_compatibility(TargetOs::Windows, Architecture::Other, win10).supported);

        let win8 = Some(OsVersion::new(6, 3, 0));
        let compat = check_compatibility(TargetOs::Windows, Architecture::X64, win8);
        assert!(!compat.supported);
        assert!(compat.reason.contains("too old"));
    }

    #[test]
    fn test_macos_requirements() {
        let mojave = Some(OsVersion::new(10, 14, 0));
        assert!(check_compatibility(TargetOs::MacOs, Architecture::X64, mojave).supported);
        assert!(check_compatibility(TargetOs::MacOs, Architecture::Arm64, mojave).supported);
        assert!(!check_compatibility(TargetOs::MacOs, Architecture::X86, mojave).supported);

        let high_sierra = Some(OsVersion::new(10, 13, 6));
        assert!(!check_compatibility(TargetOs::MacOs, Architecture::X64, high_sierra).supported);
    }

    #[test]
    fn test_unknown_version_is_unsupported() {
        let compat = check_compatibility(TargetOs::MacOs, Architecture::Arm64, None);
        assert!(!compat.supported);
        assert!(compat.reason.contains("version"));
    }

    #[test]
    fn test_linux_has_no_native_library() {
        let status = LibraryStatus::probe(TargetOs::Linux, Architecture::X64, None);
        assert!(!status.loaded);
        assert!(status.to_string().starts_with("not loaded"));
    }

    #[test]
    fn test_get_is_cached_until_release() {
        let first = NativeLibrary::get();
        let second = NativeLibrary::get();
        assert!(Arc::ptr_eq(&first, &second));

        NativeLibrary::release();
        let third = NativeLibrary::get();
        assert_eq!(*first, *third);
    }
}
