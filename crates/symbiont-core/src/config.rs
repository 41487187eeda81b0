#![forbid(unsafe_code)]

//! Process-wide configuration read from the environment.
//!
//! | Variable                      | Effect                                            |
//! |-------------------------------|---------------------------------------------------|
//! | `SYMBIONT_STRICT_SECTIONS`    | truthy: nested lookups past a section's end are `None` |
//! | `SYMBIONT_WARN_TYPE_MISMATCH` | falsy: erased type mismatches log at debug, not warn |
//! | `SYMBIONT_TRACE_NOTIFY`       | truthy: emit a trace event per outlet notification |
//!
//! Truthy values are `1`, `true`, `yes`, `on`; falsy values are `0`,
//! `false`, `no`, `off` (case-insensitive, surrounding whitespace ignored).
//! Anything else leaves the default in place.

use std::sync::OnceLock;

use crate::address::SectionFallback;

const ENV_STRICT_SECTIONS: &str = "SYMBIONT_STRICT_SECTIONS";
const ENV_WARN_TYPE_MISMATCH: &str = "SYMBIONT_WARN_TYPE_MISMATCH";
const ENV_TRACE_NOTIFY: &str = "SYMBIONT_TRACE_NOTIFY";

/// Runtime configuration shared by outlets, erasers and bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Nested lookup behavior for rows past the end of a section.
    pub section_fallback: SectionFallback,
    /// Log rejected erased sets at warn level (debug otherwise).
    pub warn_on_type_mismatch: bool,
    /// Emit a trace event for every outlet notification.
    pub trace_notifications: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            section_fallback: SectionFallback::FirstOfSection,
            warn_on_type_mismatch: true,
            trace_notifications: false,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read configuration through a custom environment lookup.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(strict) = get_env(ENV_STRICT_SECTIONS).as_deref().and_then(env_flag) {
            config.section_fallback = if strict {
                SectionFallback::Strict
            } else {
                SectionFallback::FirstOfSection
            };
        }
        if let Some(warn) = get_env(ENV_WARN_TYPE_MISMATCH).as_deref().and_then(env_flag) {
            config.warn_on_type_mismatch = warn;
        }
        if let Some(trace) = get_env(ENV_TRACE_NOTIFY).as_deref().and_then(env_flag) {
            config.trace_notifications = trace;
        }
        config
    }

    /// Cached configuration for this process (read once on first use).
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<Config> = OnceLock::new();
        GLOBAL.get_or_init(Self::from_env)
    }

    #[must_use]
    pub fn with_section_fallback(mut self, fallback: SectionFallback) -> Self {
        self.section_fallback = fallback;
        self
    }

    #[must_use]
    pub fn with_warn_on_type_mismatch(mut self, enabled: bool) -> Self {
        self.warn_on_type_mismatch = enabled;
        self
    }

    #[must_use]
    pub fn with_trace_notifications(mut self, enabled: bool) -> Self {
        self.trace_notifications = enabled;
        self
    }
}

#[inline]
fn env_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
