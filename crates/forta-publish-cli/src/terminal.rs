//! Terminal styling and color detection.
//!
//! Command results are printed to stdout and may be piped into scripts, so
//! styling is only applied when stdout is a terminal that accepts ANSI
//! escapes.

use std::io::IsTerminal;

/// ANSI escape codes used by the report renderer.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";
    /// Bold green for success headings.
    pub const GREEN_BOLD: &str = "\x1b[1;32m";
    /// Bold yellow for headings of commands that did nothing.
    pub const YELLOW_BOLD: &str = "\x1b[1;33m";
    /// Gray for field labels.
    pub const GRAY: &str = "\x1b[90m";
    /// Bright bold white for values worth copying (addresses, CIDs, hashes).
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
}

/// Resolved color codes, either ANSI sequences or empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub success: &'static str,
    pub notice: &'static str,
    pub label: &'static str,
    pub value: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            success: colors::GREEN_BOLD,
            notice: colors::YELLOW_BOLD,
            label: colors::GRAY,
            value: colors::WHITE_BOLD,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            success: "",
            notice: "",
            label: "",
            value: "",
        }
    }

    /// Colored only when colors are allowed and the output is a terminal.
    #[must_use]
    pub const fn for_output(color_allowed: bool, is_terminal: bool) -> Self {
        if color_allowed && is_terminal {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Palette for stdout.
    #[must_use]
    pub fn detect() -> Self {
        Self::for_output(supports_color(), std::io::stdout().is_terminal())
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check whether ANSI colors are allowed.
///
/// Respects `NO_COLOR` (https://no-color.org/) and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    /// Environment variables are process-global; serialize the tests that touch them.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn with_env_vars<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let saved: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var_os(k))).collect();

        for (key, value) in vars {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }

        let result = f();

        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
        result
    }

    #[test]
    fn plain_palette_is_empty() {
        let p = ColorPalette::plain();
        assert!(p.reset.is_empty());
        assert!(p.success.is_empty());
        assert!(p.value.is_empty());
    }

    #[test]
    fn colored_palette_has_escapes() {
        let p = ColorPalette::colored();
        assert!(p.reset.starts_with('\x1b'));
        assert!(p.label.starts_with('\x1b'));
    }

    #[test]
    fn colored_palette_distinguishes_notice_from_success() {
        let p = ColorPalette::colored();
        assert_eq!(p.notice, colors::YELLOW_BOLD);
        assert_eq!(p.success, colors::GREEN_BOLD);
        assert_ne!(p.notice, p.success);
    }

    #[test]
    fn piped_output_is_plain() {
        assert_eq!(ColorPalette::for_output(true, false), ColorPalette::plain());
        assert_eq!(ColorPalette::for_output(false, true), ColorPalette::plain());
        assert_eq!(ColorPalette::for_output(false, false), ColorPalette::plain());
        assert_eq!(ColorPalette::for_output(true, true), ColorPalette::colored());
    }

    #[test]
    fn detect_honours_no_color_even_on_a_terminal() {
        with_env_vars(&[("NO_COLOR", Some("1"))], || {
            assert_eq!(ColorPalette::detect(), ColorPalette::plain());
        });
    }

    #[test]
    fn no_color_disables_colors() {
        with_env_vars(&[("NO_COLOR", Some("1")), ("TERM", None)], || {
            assert!(!supports_color(), "NO_COLOR=1 should disable colors");
        });
    }

    #[test]
    fn dumb_terminal_disables_colors() {
        with_env_vars(&[("NO_COLOR", None), ("TERM", Some("dumb"))], || {
            assert!(!supports_color(), "TERM=dumb should disable colors");
        });
    }

    #[test]
    fn regular_terminal_supports_colors() {
        with_env_vars(
            &[("NO_COLOR", None), ("TERM", Some("xterm-256color"))],
            || {
                assert!(supports_color(), "Normal terminal should support colors");
            },
        );
    }
}
