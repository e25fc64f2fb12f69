use std::fs;
use std::path::PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::FileStore;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Last server the CLI talked to, kept in `server.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub url: String,
    pub last_login: Option<DateTime<Utc>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            last_login: None,
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FRANCHISE_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("franchise").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_server_config() -> anyhow::Result<ServerConfig> {
    let config_dir = get_config_dir()?;
    let server_file = config_dir.join("server.json");

    if !server_file.exists() {
        return Ok(ServerConfig::default());
    }

    let content = fs::read_to_string(server_file)?;
    let config: ServerConfig = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_server_config(config: &ServerConfig) -> anyhow::Result<()> {
    let config_dir = get_config_dir()?;
    let server_file = config_dir.join("server.json");

    let content = serde_json::to_string_pretty(config)?;
    fs::write(server_file, content)?;
    Ok(())
}

/// `--server`, then `FRANCHISE_SERVER_URL`, then the saved `server.json`
pub fn resolve_server_url(flag: Option<&str>) -> anyhow::Result<String> {
    if let Some(url) = flag {
        return Ok(url.trim_end_matches('/').to_string());
    }
    if let Ok(url) = std::env::var("FRANCHISE_SERVER_URL") {
        return Ok(url.trim_end_matches('/').to_string());
    }
    Ok(load_server_config()?.url)
}

/// The CLI's equivalent of the browser cookie jar
pub fn session_store() -> anyhow::Result<FileStore> {
    Ok(FileStore::new(get_config_dir()?.join("session.json")))
}
