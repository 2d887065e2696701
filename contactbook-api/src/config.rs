use config::{Config, ConfigError, Environment, File};
use interchange::PhotoOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApiConfig {
    pub cors: Option<CorsConfig>,
    pub server: Option<ServerConfig>,
    pub storage: Option<StorageConfig>,
    pub photos: Option<PhotoConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StorageConfig {
    /// SQLite file; defaults to the platform data directory
    pub database_path: Option<PathBuf>,
    /// Directory for stored photos; defaults next to the database
    pub photo_dir: Option<PathBuf>,
    /// Base of public photo URLs; defaults to `http://<host>:<port>`
    pub public_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PhotoConfig {
    #[serde(default = "default_photo_size")]
    pub size: u32,
    #[serde(default = "default_photo_quality")]
    pub quality: u8,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Remote origins photo URLs may point at; empty means stored photos only
    #[serde(default)]
    pub trusted_origins: Vec<String>,
}

fn default_photo_size() -> u32 {
    300
}

fn default_photo_quality() -> u8 {
    85
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            size: default_photo_size(),
            quality: default_photo_quality(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            trusted_origins: Vec::new(),
        }
    }
}

impl PhotoConfig {
    pub fn options(&self) -> PhotoOptions {
        PhotoOptions {
            size: self.size,
            quality: self.quality,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

const DEFAULT_CONFIG: &str = r#"
[cors]
allowed_origins = ["http://localhost:3000"]

[server]
host = "127.0.0.1"
port = 8080

[storage]
# database_path = "/var/lib/contactbook/contacts.db"
# photo_dir = "/var/lib/contactbook/photos"
# public_base_url = "https://contacts.example.com"

[photos]
size = 300
quality = 85
fetch_timeout_secs = 10
# trusted_origins = ["https://cdn.example.com/avatars"]
"#;

impl ApiConfig {
    /// Loads the config file (writing the defaults on first run), then applies
    /// `CONTACTBOOK__SECTION__KEY` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .add_source(Environment::with_prefix("CONTACTBOOK").separator("__"))
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn photos(&self) -> PhotoConfig {
        self.photos.clone().unwrap_or_default()
    }

    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("contactbook").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
