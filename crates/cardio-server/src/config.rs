//! Server configuration, read from a TOML file.
//!
//! Every key is optional:
//!
//! ```toml
//! bind = "0.0.0.0:5000"
//! model_dir = "model"
//! uci_model = "model_uci.json"
//! fram_model = "model_fram.json"
//! meta_model = "meta_model.json"
//! tips_file = "model/health_tips.json"
//! top_n = 10
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Prediction service settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: SocketAddr,
    /// Directory holding the model artifacts.
    pub model_dir: PathBuf,
    pub uci_model: String,
    pub fram_model: String,
    pub meta_model: String,
    /// JSON object of feature name to tip. Built-in default tip when unset.
    pub tips_file: Option<PathBuf>,
    /// Number of features returned for the what-if sliders.
    pub top_n: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            model_dir: PathBuf::from("model"),
            uci_model: "model_uci.json".into(),
            fram_model: "model_fram.json".into(),
            meta_model: "meta_model.json".into(),
            tips_file: None,
            top_n: 10,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::TopN);
        }
        Ok(())
    }

    pub fn uci_path(&self) -> PathBuf {
        self.model_dir.join(&self.uci_model)
    }

    pub fn fram_path(&self) -> PathBuf {
        self.model_dir.join(&self.fram_model)
    }

    pub fn meta_path(&self) -> PathBuf {
        self.model_dir.join(&self.meta_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ServerConfig::from_toml("", Path::new("config.toml")).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind.port(), 5000);
        assert_eq!(config.uci_path(), Path::new("model/model_uci.json"));
    }

    #[test]
    fn keys_override_defaults() {
        let config = ServerConfig::from_toml(
            "bind = \"127.0.0.1:8080\"\nmodel_dir = \"/srv/models\"\ntop_n = 5\n",
            Path::new("config.toml"),
        )
        .unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.meta_path(), Path::new("/srv/models/meta_model.json"));
        assert_eq!(config.top_n, 5);
        assert_eq!(config.fram_model, "model_fram.json");
    }

    #[test]
    fn bad_config_is_rejected() {
        let err = ServerConfig::from_toml("top_n = 0", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::TopN));
        let err = ServerConfig::from_toml("bind = 3", Path::new("c.toml")).unwrap_err();
        assert!(err.to_string().contains("c.toml"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = ServerConfig::load(Path::new("/nonexistent/cardio.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cardio.toml"));
    }
}
