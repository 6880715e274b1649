use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
    #[serde(default = "default_readings_table")]
    pub readings_table: String,
    #[serde(default = "default_commands_table")]
    pub commands_table: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_readings_table() -> String {
    "energy_log".into()
}

fn default_commands_table() -> String {
    "commands".into()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// When false the dashboard fetches once per request instead of polling.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            fetch_limit: default_fetch_limit(),
        }
    }
}

impl PollerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    15
}

fn default_fetch_limit() -> usize {
    1000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_chart_points")]
    pub chart_points: usize,
    #[serde(default = "default_raw_log_rows")]
    pub raw_log_rows: usize,
    #[serde(default)]
    pub controls_enabled: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            chart_points: default_chart_points(),
            raw_log_rows: default_raw_log_rows(),
            controls_enabled: false,
        }
    }
}

fn default_title() -> String {
    "Fridge Energy Monitor (Cloud)".into()
}

fn default_chart_points() -> usize {
    100
}

fn default_raw_log_rows() -> usize {
    20
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
        }
    }
}

fn default_api_host() -> String {
    "0.0.0.0".into()
}

fn default_api_port() -> u16 {
    8080
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_yaml(&raw)?;

        // The two secrets may come straight from the environment instead of the file
        if let Ok(url) = std::env::var("SUPABASE_URL") {
            cfg.supabase.url = url;
        }
        if let Ok(key) = std::env::var("SUPABASE_KEY") {
            cfg.supabase.key = key;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse an already-read YAML document, expanding env placeholders first.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let expanded = expand_env_placeholders(raw)?;
        let cfg: Self = serde_yaml::from_str(&expanded)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.supabase.url.trim().is_empty() {
            return Err(AppError::Config("supabase.url cannot be empty".into()));
        }
        if !self.supabase.url.starts_with("http://") && !self.supabase.url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "supabase.url must be an http(s) URL, got '{}'",
                self.supabase.url
            )));
        }
        if self.supabase.key.trim().is_empty() {
            return Err(AppError::Config("supabase.key cannot be empty".into()));
        }
        if self.poller.interval_secs == 0 {
            return Err(AppError::Config("poller.interval_secs cannot be 0".into()));
        }
        if self.poller.fetch_limit == 0 {
            return Err(AppError::Config("poller.fetch_limit cannot be 0".into()));
        }
        if self.dashboard.chart_points == 0 {
            return Err(AppError::Config("dashboard.chart_points cannot be 0".into()));
        }
        if self.api.port == 0 {
            return Err(AppError::Config("api.port cannot be 0".into()));
        }
        Ok(())
    }
}

/// Expand $(VAR) and ${VAR} placeholders using environment variables.
fn expand_env_placeholders(input: &str) -> Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut it = input.chars().peekable();

    while let Some(c) = it.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let close = match it.peek().copied() {
            Some('$') => {
                // "$$" -> "$"
                it.next();
                out.push('$');
                continue;
            }
            Some('(') => ')',
            Some('{') => '}',
            _ => {
                out.push('$');
                continue;
            }
        };
        it.next();
        let var = read_until(&mut it, close).ok_or_else(|| {
            AppError::Config(format!("unterminated env placeholder: missing '{}'", close))
        })?;
        let val = std::env::var(&var)
            .map_err(|_| AppError::Config(format!("missing environment variable: {}", var)))?;
        out.push_str(&val);
    }

    Ok(out)
}

fn read_until<I>(it: &mut std::iter::Peekable<I>, end: char) -> Option<String>
where
    I: Iterator<Item = char>,
{
    let mut buf = String::new();
    for ch in it.by_ref() {
        if ch == end {
            return Some(buf);
        }
        buf.push(ch);
    }
    None
}
