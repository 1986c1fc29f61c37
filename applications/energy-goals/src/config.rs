use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::EntityId;
use crate::services::meta_resolver::GoalDefaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DbConfig,
    #[serde(default)]
    pub api: ApiConfig,
    pub remote: RemoteApiConfig,
    #[serde(default)]
    pub goals: GoalDefaults,
    #[serde(default)]
    pub devices: Vec<DeviceInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
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

/// Where device metrics are fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteApiConfig {
    pub base_url: String,
    #[serde(default = "default_include_history")]
    pub include_history: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_include_history() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    15
}

/// A monitored device shown in the dashboard catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl Config {
    /// Load YAML from disk, substitute $(VAR)/${VAR} with env vars, then parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, anyhow::Error> {
        let expanded = expand_env_placeholders(raw)?;
        let mut cfg: Self = serde_yaml::from_str(&expanded)?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            cfg.database.url = url;
        }

        if let Ok(url) = std::env::var("METRICS_API_URL") {
            cfg.remote.base_url = url;
        }

        Ok(cfg)
    }

    pub fn api_bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn device_ids(&self) -> Vec<EntityId> {
        self.devices.iter().map(|d| d.id.clone()).collect()
    }

    pub fn find_device(&self, id: &EntityId) -> Option<&DeviceInfo> {
        self.devices.iter().find(|d| &d.id == id)
    }
}

/// Expand $(VAR) and ${VAR} placeholders using environment variables.
fn expand_env_placeholders(input: &str) -> Result<String, anyhow::Error> {
    use anyhow::Context;

    let mut out = String::with_capacity(input.len());
    let mut it = input.chars().peekable();

    while let Some(c) = it.next() {
        if c == '$' {
            match it.peek().copied() {
                Some('$') => {
                    // Escape "$$" -> "$"
                    it.next();
                    out.push('$');
                }
                Some(open @ ('(' | '{')) => {
                    it.next();
                    let close = if open == '(' { ')' } else { '}' };
                    let var = read_until(&mut it, close).with_context(|| {
                        format!("unterminated env placeholder: missing '{}'", close)
                    })?;
                    let val = std::env::var(&var)
                        .with_context(|| format!("missing environment variable: {}", var))?;
                    out.push_str(&val);
                }
                _ => out.push('$'),
            }
        } else {
            out.push(c);
        }
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
