use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

pub const DEFAULT_SECRETS_PATH: &str = ".streamlit/secrets.toml";

const MODEL_NAME: &str = "MODEL_NAME";
const API_KEY: &str = "OPENROUTER_API_KEY";
const BASE_URL: &str = "OPENROUTER_BASE_URL";
const TEMPERATURE: &str = "TEMPERATURE";
const SYSTEM_MESSAGE: &str = "SYSTEM_MESSAGE";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub model_name: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f64,
    pub system_message: Option<String>,
    pub max_images: usize,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Load settings from a TOML secrets file. Environment variables
    /// with the same key take precedence over the file, so the file can
    /// be omitted entirely when everything is set in the environment.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        let secrets = if secrets_path.exists() {
            let raw = fs::read_to_string(secrets_path).with_context(|| {
                format!("Failed to read secrets file {}", secrets_path.display())
            })?;
            parse_secrets(&raw)
                .with_context(|| format!("Invalid secrets file {}", secrets_path.display()))?
        } else {
            tracing::debug!(
                "No secrets file at {}, reading settings from the environment",
                secrets_path.display()
            );
            HashMap::new()
        };

        Self::from_settings(&secrets)
    }

    fn from_settings(secrets: &HashMap<String, String>) -> Result<Self> {
        let lookup = |key: &str| env::var(key).ok().or_else(|| secrets.get(key).cloned());
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow!("Missing setting {}", key))
        };

        let temperature = match lookup(TEMPERATURE) {
            Some(t) => t
                .parse::<f64>()
                .with_context(|| format!("{} must be a number, got {}", TEMPERATURE, t))?,
            None => 0.4,
        };

        Ok(Self {
            model_name: required(MODEL_NAME)?,
            api_key: required(API_KEY)?,
            base_url: required(BASE_URL)?,
            temperature,
            system_message: lookup(SYSTEM_MESSAGE),
            max_images: 4,
            max_upload_bytes: 20 * 1024 * 1024,
        })
    }
}

// Secrets are flat `KEY = value` pairs. Non-string scalars are kept
// in their TOML text form so numbers like TEMPERATURE still work.
fn parse_secrets(raw: &str) -> Result<HashMap<String, String>> {
    let table: toml::Table = raw.parse()?;
    let secrets = table
        .into_iter()
        .filter_map(|(k, v)| match v {
            toml::Value::String(s) => Some((k, s)),
            toml::Value::Integer(i) => Some((k, i.to_string())),
            toml::Value::Float(f) => Some((k, f.to_string())),
            toml::Value::Boolean(b) => Some((k, b.to_string())),
            _ => None,
        })
        .collect();
    Ok(secrets)
}
