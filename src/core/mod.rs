mod config;
pub use config::{AppConfig, DEFAULT_SECRETS_PATH};
