use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::FileNaming;
use crate::error::SraError;

pub const DEFAULT_EUTILS_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_MIRROR_ROOT: &str = "ftp://ftp.sra.ebi.ac.uk/vol1/fastq";
pub const DEFAULT_TIMEOUT_SECS: u64 = 2;
pub const DEFAULT_CONFIG_FILE: &str = "sra-locator.json";
pub const API_KEY_ENV: &str = "NCBI_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub eutils_url: String,
    pub mirror_root: String,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
    pub naming: FileNaming,
    pub include_layout: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            eutils_url: DEFAULT_EUTILS_URL.to_string(),
            mirror_root: DEFAULT_MIRROR_ROOT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
            naming: FileNaming::Wildcard,
            include_layout: false,
        }
    }
}

impl ClientConfig {
    /// Request timeout, never below one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Replaces the key when `api_key` is non-blank; blank values leave the
    /// configured or environment key in place.
    pub fn override_api_key(&mut self, api_key: Option<&str>) {
        if let Some(api_key) = api_key.map(str::trim).filter(|key| !key.is_empty()) {
            self.api_key = Some(api_key.to_string());
        }
    }

    /// Configured key, ignoring blank values.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads `path`, or `sra-locator.json` from the working directory when it
    /// exists, then fills the API key from `NCBI_API_KEY`.
    pub fn resolve(path: Option<&str>) -> Result<ClientConfig, SraError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config = if path.is_none() && !config_path.exists() {
            ClientConfig::default()
        } else {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| SraError::ConfigRead(config_path.clone()))?;
            let config: ClientConfig = serde_json::from_str(&content)
                .map_err(|err| SraError::ConfigParse(err.to_string()))?;
            if config.timeout_secs == 0 {
                return Err(SraError::ConfigParse(
                    "timeout_secs must be at least 1".to_string(),
                ));
            }
            config
        };

        Ok(Self::resolve_config(config, std::env::var(API_KEY_ENV).ok()))
    }

    pub fn resolve_config(mut config: ClientConfig, env_api_key: Option<String>) -> ClientConfig {
        if config.api_key().is_none() {
            config.api_key = env_api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty());
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"naming": "explicit"}"#).unwrap();
        assert_eq!(config.naming, FileNaming::Explicit);
        assert_eq!(config.eutils_url, DEFAULT_EUTILS_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(!config.include_layout);
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let config = ClientConfig {
            api_key: Some("  ".to_string()),
            ..ClientConfig::default()
        };
        assert_eq!(config.api_key(), None);
    }
}
