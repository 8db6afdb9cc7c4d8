//! Theme state snapshots and change detection.

use std::fmt;

/// A point-in-time snapshot of the system appearance.
///
/// High contrast is treated as a third visual mode, orthogonal to light and
/// dark: while it is on, the `dark` bit does not take part in change
/// detection (see [`ThemeState::differs_from`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ThemeState {
    /// Whether the dark color scheme is enabled.
    pub dark: bool,
    /// Whether high contrast mode is enabled.
    pub high_contrast: bool,
}

impl ThemeState {
    /// Create a new theme state.
    pub const fn new(dark: bool, high_contrast: bool) -> Self {
        Self {
            dark,
            high_contrast,
        }
    }

    /// Returns true if moving from `previous` to `self` is a visible change.
    ///
    /// Entering or leaving high contrast always counts. While high contrast
    /// is on and stays on, flips of the dark bit are ignored.
    pub fn differs_from(&self, previous: &ThemeState) -> bool {
        previous.high_contrast != self.high_contrast
            || (!self.high_contrast && previous.dark != self.dark)
    }
}

impl fmt::Display for ThemeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.dark, self.high_contrast) {
            (_, true) => write!(f, "high-contrast"),
            (true, false) => write!(f, "dark"),
            (false, false) => write!(f, "light"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(from: (bool, bool), to: (bool, bool)) -> bool {
        ThemeState::new(to.0, to.1).differs_from(&ThemeState::new(from.0, from.1))
    }

    #[test]
    fn test_same_state_is_not_a_change() {
        assert!(!changed((false, false), (false, false)));
        assert!(!changed((true, false), (true, false)));
    }

    #[test]
    fn test_dark_flip_is_a_change() {
        assert!(changed((false, false), (true, false)));
        assert!(changed((true, false), (false, false)));
    }

    #[test]
    fn test_dark_flip_ignored_during_high_contrast() {
        assert!(!changed((false, true), (true, true)));
        assert!(!changed((true, true), (false, true)));
    }

    #[test]
    fn test_high_contrast_transitions_always_change() {
        assert!(changed((false, false), (false, true)));
        assert!(changed((true, false), (true, true)));
        assert!(changed((true, true), (false, false)));
        assert!(changed((false, true), (false, false)));
        assert!(changed((true, true), (true, false)));
    }

    #[test]
    fn test_rule_matches_formula_for_all_transitions() {
        let all = [(false, false), (false, true), (true, false), (true, true)];
        for &(dark, hc) in &all {
            for &(new_dark, new_hc) in &all {
                let expected = hc != new_hc || (!new_hc && dark != new_dark);
                assert_eq!(
                    changed((dark, hc), (new_dark, new_hc)),
                    expected,
                    "({dark}, {hc}) -> ({new_dark}, {new_hc})"
                );
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ThemeState::new(false, false).to_string(), "light");
        assert_eq!(ThemeState::new(true, false).to_string(), "dark");
        assert_eq!(ThemeState::new(true, true).to_string(), "high-contrast");
    }
}
