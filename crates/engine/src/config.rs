use std::path::PathBuf;

use crate::types::{AI_DELAY_MAX_MS, AI_DELAY_MIN_MS, MOVE_COOLDOWN_MS};

/// Session tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Minimum spacing between human moves in remote mode.
    pub move_cooldown_ms: u64,
    /// AI deliberation delay bounds (inclusive).
    pub ai_delay_min_ms: u64,
    pub ai_delay_max_ms: u64,
    /// Where the preferred side is remembered between runs.
    pub prefs_path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            move_cooldown_ms: MOVE_COOLDOWN_MS,
            ai_delay_min_ms: AI_DELAY_MIN_MS,
            ai_delay_max_ms: AI_DELAY_MAX_MS,
            prefs_path: PathBuf::from(".super-ttt-side"),
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let ms = |key: &str, default: u64| {
            env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        };

        let move_cooldown_ms = ms("STTT_MOVE_COOLDOWN_MS", defaults.move_cooldown_ms);
        let ai_delay_min_ms = ms("STTT_AI_DELAY_MIN_MS", defaults.ai_delay_min_ms);
        let ai_delay_max_ms = ms("STTT_AI_DELAY_MAX_MS", defaults.ai_delay_max_ms).max(ai_delay_min_ms);
        let prefs_path = env::var("STTT_PREFS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.prefs_path);

        Self {
            move_cooldown_ms,
            ai_delay_min_ms,
            ai_delay_max_ms,
            prefs_path,
        }
    }

    /// No AI delay and no cooldown; used by tests that drive the clock by hand.
    pub fn instant() -> Self {
        Self {
            move_cooldown_ms: 0,
            ai_delay_min_ms: 0,
            ai_delay_max_ms: 0,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_pacing() {
        let config = SessionConfig::default();
        assert_eq!(config.move_cooldown_ms, 2000);
        assert_eq!(config.ai_delay_min_ms, 500);
        assert_eq!(config.ai_delay_max_ms, 1500);
    }

    #[test]
    fn instant_disables_delays() {
        let config = SessionConfig::instant();
        assert_eq!(config.move_cooldown_ms, 0);
        assert_eq!(config.ai_delay_max_ms, 0);
        assert_eq!(config.prefs_path, SessionConfig::default().prefs_path);
    }
}
