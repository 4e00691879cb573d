//! Client configuration from the environment

use numberplay_networking::ConnectionConfig;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const API_URL_VAR: &str = "NUMBERPLAY_API_URL";
const DATA_DIR_VAR: &str = "NUMBERPLAY_DATA_DIR";
const MEMORY_STORE_VAR: &str = "NUMBERPLAY_MEMORY_STORE";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    /// Holds the credential database
    pub data_dir: PathBuf,
    /// Keep the credential in memory only
    pub memory_store: bool,
    pub connection: ConnectionConfig,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup(API_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let memory_store = lookup(MEMORY_STORE_VAR)
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            api_url,
            data_dir,
            memory_store,
            connection: ConnectionConfig::default(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("numberplay.db")
    }
}

fn default_data_dir() -> PathBuf {
    dirs_next::data_local_dir()
        .map(|p| p.join("NumberPlay"))
        .unwrap_or_else(|| PathBuf::from("."))
}
