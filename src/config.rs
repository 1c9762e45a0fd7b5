use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "dashboard_config.toml";
const APP_DIR: &str = ".presence-dashboard";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub layout: LayoutConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// No timeout when unset; a hanging request blocks only its own widget.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub required_role: String,
    pub redirect_delay_ms: u64,
    pub token_file: Option<PathBuf>,
}

/// Which display targets exist. A disabled chart behaves like a missing canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub weekly_hours_chart: bool,
    pub presence_status_chart: bool,
    pub message_panel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: Option<PathBuf>,
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            request_timeout_secs: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            required_role: "ADMIN".into(),
            redirect_delay_ms: 2000,
            token_file: None,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            weekly_hours_chart: true,
            presence_status_chart: true,
            message_panel: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".into(),
        }
    }
}

impl AuthConfig {
    pub fn token_path(&self) -> PathBuf {
        self.token_file
            .clone()
            .unwrap_or_else(|| app_dir().join("session.json"))
    }
}

impl LoggingConfig {
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| app_dir().join("dashboard.log"))
    }
}

pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

impl AppConfig {
    /// Loads an explicit config file, or the default one in the working
    /// directory (written out with defaults on first run).
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("Não foi possível ler o arquivo de configuração: {:?}", path))?;
                Self::parse(&content)
            }
            None => {
                let path = Path::new(CONFIG_FILE);
                if path.exists() {
                    let content = fs::read_to_string(path)?;
                    Self::parse(&content)
                } else {
                    let config = Self::default();
                    let content = toml::to_string_pretty(&config)?;
                    fs::write(path, content)?;
                    Ok(config)
                }
            }
        }
    }

    fn parse(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).context("Arquivo de configuração inválido")?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.api.base_url = url;
        }
        self
    }
}
