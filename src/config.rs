//! Environment-driven configuration.
//! Every knob has a logged default so a bare `lifeboard` invocation works.

use std::{env, fmt::Display, str::FromStr};

use chrono::{Datelike, Utc};
use tracing::{info, warn};

/// Default idle window before a forced sign-out: five minutes.
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 300_000;

/// Default looseness for restaurant suggestions (0 = exact, 1 = anything).
pub const DEFAULT_MATCH_LOOSENESS: f64 = 0.4;

#[derive(Debug, Clone)]
pub struct Config {
    /// Milliseconds of inactivity before the monitor signs the session out.
    pub idle_timeout_ms: u64,
    /// Email the local identity adapter signs in with. When unset, the
    /// adapter derives one from the OS account at sign-in time.
    pub email: Option<String>,
    /// Emails seeded into the allow-list collection at startup.
    pub allowed: Vec<String>,
    /// Calendar year the dashboard counts visits for.
    pub year: i32,
    /// Match looseness passed to the restaurant suggester.
    pub looseness: f64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            idle_timeout_ms: parse_or("LIFEBOARD_IDLE_TIMEOUT_MS", DEFAULT_IDLE_TIMEOUT_MS),
            email: env::var("LIFEBOARD_EMAIL").ok().filter(|s| !s.is_empty()),
            allowed: env::var("LIFEBOARD_ALLOWED")
                .map(|s| s.split(',').map(|e| e.trim().to_string()).filter(|e| !e.is_empty()).collect())
                .unwrap_or_default(),
            year: parse_or("LIFEBOARD_YEAR", Utc::now().year()),
            looseness: parse_or("LIFEBOARD_MATCH_LOOSENESS", DEFAULT_MATCH_LOOSENESS),
        }
    }
}

fn parse_or<T: FromStr + Display + Copy>(key: &str, default: T) -> T
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(v) => v,
            Err(e) => {
                warn!("Invalid {key} value '{raw}': {e}; using default {default}");
                default
            }
        },
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_garbage() {
        std::env::set_var("LIFEBOARD_TEST_KNOB", "not-a-number");
        assert_eq!(parse_or("LIFEBOARD_TEST_KNOB", 42u64), 42);
        std::env::remove_var("LIFEBOARD_TEST_KNOB");
    }

    #[test]
    fn parse_or_reads_valid_values() {
        std::env::set_var("LIFEBOARD_TEST_KNOB2", "1500");
        assert_eq!(parse_or("LIFEBOARD_TEST_KNOB2", 42u64), 1500);
        std::env::remove_var("LIFEBOARD_TEST_KNOB2");
    }
}
