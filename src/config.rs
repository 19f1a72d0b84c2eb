use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const SETTINGS_FILE: &str = "waterinfo.toml";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://waterinfowebapp.azurewebsites.net";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub bind_addr: String,
    pub remote_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            remote_base_url: DEFAULT_REMOTE_BASE_URL.into(),
        }
    }
}

/// Defaults, then `waterinfo.toml` in the working directory, then `APP__*`
/// environment variables.
pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("bind_addr") {
                    settings.bind_addr = v.clone();
                }
                if let Some(v) = file_cfg.get("remote_base_url") {
                    settings.remote_base_url = v.clone();
                }
            }
            Err(e) => warn!(file = %file.display(), "ignoring malformed settings: {e}"),
        }
    }

    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__REMOTE_BASE_URL") {
        settings.remote_base_url = v;
    }

    settings
}
