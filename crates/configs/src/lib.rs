use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Records live only for the lifetime of the process
    #[default]
    Memory,
    /// All records persisted in one JSON file
    JsonFile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Memory, path: default_storage_path() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_storage_path() -> String { "data/options.json".to_string() }

pub fn load_default() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        // 归一化 storage（空路径回落到默认文件）
        self.storage.normalize_from_env();
        self.storage.validate()?;
        self.logging.normalize();
        Ok(())
    }
}

impl StorageConfig {
    pub fn normalize_from_env(&mut self) {
        if self.path.trim().is_empty() {
            self.path = std::env::var("OPTIONS_PATH").unwrap_or_else(|_| default_storage_path());
        }
        self.path = self.path.trim().to_string();
    }

    pub fn validate(&self) -> Result<()> {
        if self.backend == StorageBackend::JsonFile {
            if self.path.is_empty() {
                return Err(anyhow!("storage.path is empty; set it in config.toml or OPTIONS_PATH"));
            }
            if !self.path.ends_with(".json") {
                return Err(anyhow!("storage.path must point to a .json file"));
            }
        }
        Ok(())
    }
}

impl LoggingConfig {
    fn normalize(&mut self) {
        if let Some(f) = &self.filter {
            if f.trim().is_empty() { self.filter = None; }
        }
    }
}
