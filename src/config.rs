use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://localhost:8080";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SECONDARY_RETRIES: u32 = 2;
const MAX_SECONDARY_RETRIES: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct DashConfig {
    pub api_base: String,
    pub players: Vec<String>,
    pub http_timeout: Option<Duration>,
    pub secondary_retries: u32,
    pub demo: bool,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            players: Vec::new(),
            http_timeout: Some(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)),
            secondary_retries: DEFAULT_SECONDARY_RETRIES,
            demo: false,
        }
    }
}

impl DashConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let api_base = lookup("SCOUT_API_BASE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base);
        let players = lookup("SCOUT_PLAYERS")
            .map(|v| parse_player_list(&v))
            .unwrap_or_default();
        let http_timeout = lookup("SCOUT_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(timeout_from_secs)
            .unwrap_or(defaults.http_timeout);
        let secondary_retries = lookup("SCOUT_SECONDARY_RETRIES")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(defaults.secondary_retries)
            .min(MAX_SECONDARY_RETRIES);
        let demo = lookup("SCOUT_DEMO").map(|v| is_truthy_flag(&v)).unwrap_or(false);

        Self {
            api_base,
            players,
            http_timeout,
            secondary_retries,
            demo,
        }
    }
}

/// Loads `.env.local` then `.env`; values already set win.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn http_timeout_from_env() -> Option<Duration> {
    DashConfig::from_env().http_timeout
}

fn timeout_from_secs(secs: u64) -> Option<Duration> {
    if secs == 0 {
        None
    } else {
        Some(Duration::from_secs(secs))
    }
}

fn parse_player_list(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !out.iter().any(|existing| existing == name) {
            out.push(name.to_string());
        }
    }
    out
}

fn is_truthy_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> DashConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DashConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(config(&[]), DashConfig::default());
    }

    #[test]
    fn reads_players_and_flags() {
        let cfg = config(&[
            ("SCOUT_API_BASE", " http://stats.local:9000 "),
            ("SCOUT_PLAYERS", "Saka, Rice,,Saka , Palmer"),
            ("SCOUT_DEMO", "Yes"),
        ]);
        assert_eq!(cfg.api_base, "http://stats.local:9000");
        assert_eq!(cfg.players, vec!["Saka", "Rice", "Palmer"]);
        assert!(cfg.demo);
    }

    #[test]
    fn zero_timeout_disables_it_and_retries_are_capped() {
        let cfg = config(&[
            ("SCOUT_HTTP_TIMEOUT_SECS", "0"),
            ("SCOUT_SECONDARY_RETRIES", "40"),
        ]);
        assert_eq!(cfg.http_timeout, None);
        assert_eq!(cfg.secondary_retries, MAX_SECONDARY_RETRIES);
    }

    #[test]
    fn garbage_numbers_fall_back() {
        let cfg = config(&[
            ("SCOUT_HTTP_TIMEOUT_SECS", "soon"),
            ("SCOUT_SECONDARY_RETRIES", "-1"),
        ]);
        assert_eq!(cfg.http_timeout, Some(Duration::from_secs(10)));
        assert_eq!(cfg.secondary_retries, DEFAULT_SECONDARY_RETRIES);
    }
}
