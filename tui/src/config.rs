//! Configuration for the todo TUI

use std::path::PathBuf;

use anyhow::Result;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_LOG_FILE: &str = "todo_tui.log";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Origin of the todo API, without the `/api/todos` path
    pub api_url: String,
    /// Where logs go while the terminal belongs to the UI
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            api_url: std::env::var("TODO_API_URL").unwrap_or(defaults.api_url),
            log_file: std::env::var("TODO_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        })
    }

    /// Apply command-line flags on top of the environment.
    pub fn with_overrides(mut self, api_url: Option<String>, log_file: Option<PathBuf>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(path) = log_file {
            self.log_file = path;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "API URL must start with http:// or https://: {}",
                self.api_url
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_api() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8080");
        config.validate().unwrap();
    }

    #[test]
    fn flags_override_environment() {
        let config = Config::default()
            .with_overrides(Some("http://10.0.0.2:9000".to_string()), None);
        assert_eq!(config.api_url, "http://10.0.0.2:9000");
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn rejects_url_without_scheme() {
        let config = Config::default().with_overrides(Some("localhost:8080".to_string()), None);
        assert!(config.validate().is_err());
    }
}
