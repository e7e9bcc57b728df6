use crate::components::bracket::CellScale;
use crate::ui::bracket_layout::{LayoutConfig, SpacingKind};
use battlesnake_api::client::DEFAULT_BASE_URL;
use log::{LevelFilter, warn};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    /// Base URL of the tournament service, without a trailing slash.
    pub api_base: String,
    pub poll_interval: Duration,
    pub state_file: PathBuf,
    pub spacing: SpacingKind,
    pub layout: LayoutConfig,
    pub scale: CellScale,
    /// Start with tournament controls unlocked.
    pub admin: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: Some(LevelFilter::Info),
            api_base: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            state_file: default_state_file(),
            spacing: SpacingKind::default(),
            layout: LayoutConfig::default(),
            scale: CellScale::default(),
            admin: false,
        }
    }
}

impl AppSettings {
    /// Defaults overridden by `SNAKEBRACKET_*` environment variables.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Bad values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(base) = get("SNAKEBRACKET_API") {
            settings.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(raw) = get("SNAKEBRACKET_POLL_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs >= 1 => settings.poll_interval = Duration::from_secs(secs),
                _ => warn!("SNAKEBRACKET_POLL_SECS={raw:?} is not a whole number of seconds >= 1, using default"),
            }
        }

        if let Some(path) = get("SNAKEBRACKET_STATE_FILE") {
            settings.state_file = PathBuf::from(path);
        }

        if let Some(raw) = get("SNAKEBRACKET_SPACING") {
            match raw.parse() {
                Ok(kind) => settings.spacing = kind,
                Err(e) => warn!("SNAKEBRACKET_SPACING: {e}, using default"),
            }
        }

        if let Some(raw) = get("SNAKEBRACKET_LOG") {
            match raw.parse::<LevelFilter>() {
                Ok(level) => settings.log_level = Some(level),
                Err(_) => warn!("SNAKEBRACKET_LOG={raw:?} is not a log level, using default"),
            }
        }

        settings
    }
}

fn default_state_file() -> PathBuf {
    if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME")
        && !config_dir.trim().is_empty()
    {
        return PathBuf::from(config_dir).join("snakebracket").join("session.json");
    }
    if let Ok(home) = std::env::var("HOME")
        && !home.trim().is_empty()
    {
        return PathBuf::from(home)
            .join(".config")
            .join("snakebracket")
            .join("session.json");
    }
    PathBuf::from("snakebracket-session.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> AppSettings {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppSettings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let settings = settings_from(&[]);
        assert_eq!(settings.api_base, DEFAULT_BASE_URL);
        assert_eq!(settings.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(settings.spacing, SpacingKind::Uniform);
        assert_eq!(settings.layout, LayoutConfig::default());
        assert!(!settings.admin);
    }

    #[test]
    fn environment_overrides_apply() {
        let settings = settings_from(&[
            ("SNAKEBRACKET_API", "http://localhost:8080/api/"),
            ("SNAKEBRACKET_POLL_SECS", "2"),
            ("SNAKEBRACKET_STATE_FILE", "/tmp/snakes.json"),
            ("SNAKEBRACKET_SPACING", "midpoint"),
            ("SNAKEBRACKET_LOG", "debug"),
        ]);
        assert_eq!(settings.api_base, "http://localhost:8080/api");
        assert_eq!(settings.poll_interval, Duration::from_secs(2));
        assert_eq!(settings.state_file, PathBuf::from("/tmp/snakes.json"));
        assert_eq!(settings.spacing, SpacingKind::Midpoint);
        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let settings = settings_from(&[
            ("SNAKEBRACKET_POLL_SECS", "0"),
            ("SNAKEBRACKET_SPACING", "spiral"),
            ("SNAKEBRACKET_LOG", "loud"),
            ("SNAKEBRACKET_API", "   "),
        ]);
        assert_eq!(settings.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(settings.spacing, SpacingKind::Uniform);
        assert_eq!(settings.log_level, Some(LevelFilter::Info));
        assert_eq!(settings.api_base, DEFAULT_BASE_URL);
    }
}
