use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Prefix for environment overrides, e.g. `EMPATHIC_SERVICE__HTTP__PORT=9000`
pub const ENV_PREFIX: &str = "EMPATHIC";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub cors: CorsConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub version: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "EmpathicCall API".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed browser origins; a single `"*"` allows any origin
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://empathic-call.vercel.app".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:5174".to_string(),
            ],
        }
    }
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Simulated processing cost per audio chunk
    pub processing_delay_ms: u64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    /// Frames above this size are rejected
    pub max_frame_bytes: usize,
    /// Label name → weight. Uses the built-in table when absent.
    pub weights: Option<HashMap<String, f64>>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: 100,
            min_confidence: 0.70,
            max_confidence: 0.95,
            max_frame_bytes: 1024 * 1024,
            weights: None,
            seed: None,
        }
    }
}

impl Config {
    /// Load from a config file (extension optional, file optional) layered
    /// with `EMPATHIC_*` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .context("Failed to read TOML configuration")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.http.bind, self.service.http.port)
    }
}
