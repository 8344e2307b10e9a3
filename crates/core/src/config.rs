use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_parse<T: FromStr>(profile: &str, key: &str, default: T) -> T {
    profiled_env_opt(profile, key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `STELA_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("STELA_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            ranking: RankingConfig::from_env_profiled(p),
            history: HistoryConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  ranking:  congestion_slack={}, default_order={}",
            self.ranking.congestion_slack,
            self.ranking.default_order
        );
        tracing::info!("  history:  window={}", self.history.window);
    }
}

// ── Ranking ───────────────────────────────────────────────────

/// Sort direction of an ETP ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankOrder {
    /// Highest score first.
    #[default]
    Desc,
    /// Lowest score first.
    Asc,
}

impl std::fmt::Display for RankOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankOrder::Desc => write!(f, "desc"),
            RankOrder::Asc => write!(f, "asc"),
        }
    }
}

impl FromStr for RankOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "desc" | "descending" => Ok(RankOrder::Desc),
            "asc" | "ascending" => Ok(RankOrder::Asc),
            other => Err(format!("unknown rank order: {other}")),
        }
    }
}

/// Parameters of the ETP ranking computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// A component is congested when its input rate exceeds
    /// `congestion_slack * execute_rate`.
    #[serde(default = "default_congestion_slack")]
    pub congestion_slack: f64,
    /// Order used when the caller does not pick one.
    #[serde(default)]
    pub default_order: RankOrder,
}

fn default_congestion_slack() -> f64 { 1.2 }

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            congestion_slack: default_congestion_slack(),
            default_order: RankOrder::default(),
        }
    }
}

impl RankingConfig {
    fn from_env_profiled(p: &str) -> Self {
        let slack = profiled_env_parse(p, "STELA_CONGESTION_SLACK", default_congestion_slack());
        Self {
            congestion_slack: slack,
            default_order: profiled_env_parse(p, "STELA_RANK_ORDER", RankOrder::Desc),
        }
        .normalized()
    }

    /// Clamp the slack factor so that a component keeping up with its input
    /// is never reported as congested.
    pub fn normalized(mut self) -> Self {
        if !self.congestion_slack.is_finite() || self.congestion_slack < 1.0 {
            self.congestion_slack = 1.0;
        }
        self
    }
}

// ── Metrics history ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Samples retained per component and series. 0 = unbounded.
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_window() -> usize { 10 }

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { window: default_window() }
    }
}

impl HistoryConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            window: profiled_env_parse(p, "STELA_HISTORY_WINDOW", default_window()),
        }
    }
}
