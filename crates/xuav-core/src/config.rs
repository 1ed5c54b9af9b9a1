use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config as cfg;
use schemars::JsonSchema;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 7676,
        }
    }
}

/// Route prefixes and the identity reported by the root and health endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_prefix")]
    pub prefix: String,
    #[serde(default = "ApiConfig::default_v1_prefix")]
    pub v1_prefix: String,
    #[serde(default = "ApiConfig::default_project_name")]
    pub project_name: String,
    #[serde(default = "ApiConfig::default_version")]
    pub version: String,
}

impl ApiConfig {
    fn default_prefix() -> String {
        "/api".to_string()
    }

    fn default_v1_prefix() -> String {
        "/api/v1".to_string()
    }

    fn default_project_name() -> String {
        "X-UAV API".to_string()
    }

    fn default_version() -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            prefix: Self::default_prefix(),
            v1_prefix: Self::default_v1_prefix(),
            project_name: Self::default_project_name(),
            version: Self::default_version(),
        }
    }
}

/// Relational catalog (flat `uavs` / `armaments` tables).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogConfig {
    /// Path of the SQLite database file
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: "./data_db/uavs.db".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GraphConfig {
    /// Connection string for SurrealDB (e.g., "mem://", "rocksdb://data/graph" or "ws://localhost:8000")
    pub connection: String,
    #[serde(default = "GraphConfig::default_namespace")]
    pub namespace: String,
    #[serde(default = "GraphConfig::default_database")]
    pub database: String,
    /// Optional username for authentication
    #[serde(default)]
    pub username: Option<String>,
    /// Optional password for authentication
    #[serde(default, skip_serializing)]
    #[schemars(skip)]
    pub password: Option<SecretString>,
    /// Name reported for the platform graph
    #[serde(default = "GraphConfig::default_graph_name")]
    pub graph_name: String,
}

impl GraphConfig {
    fn default_namespace() -> String {
        "xuav".to_string()
    }

    fn default_database() -> String {
        "xuav".to_string()
    }

    fn default_graph_name() -> String {
        "uav_graph".to_string()
    }

    /// In-memory graph, used by tests and by `xuav serve --ephemeral`.
    pub fn in_memory() -> Self {
        Self {
            connection: "mem://".into(),
            ..Self::default()
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            connection: "ws://localhost:8000".into(),
            namespace: Self::default_namespace(),
            database: Self::default_database(),
            username: None,
            password: None,
            graph_name: Self::default_graph_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub graph: GraphConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SecurityConfig {
    /// CORS origins; accepts a list or a comma-separated string
    #[serde(
        default = "SecurityConfig::default_allowed_origins",
        deserialize_with = "deserialize_origins"
    )]
    pub allowed_origins: Vec<String>,
}

impl SecurityConfig {
    fn default_allowed_origins() -> Vec<String> {
        vec![
            "http://localhost:7676".to_string(),
            "http://127.0.0.1:7676".to_string(),
        ]
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Self::default_allowed_origins(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OriginsInput {
    List(Vec<String>),
    Csv(String),
}

fn deserialize_origins<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match OriginsInput::deserialize(deserializer)? {
        OriginsInput::List(list) => list,
        OriginsInput::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };
    Ok(raw
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect())
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            server: ServerConfig::default(),
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Settings {
    pub fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        let prefixes = [
            ("api.prefix", &self.api.prefix),
            ("api.v1_prefix", &self.api.v1_prefix),
        ];
        for (name, prefix) in prefixes {
            anyhow::ensure!(prefix.starts_with('/'), "{} must start with '/'", name);
            anyhow::ensure!(
                prefix.len() > 1 && !prefix.ends_with('/'),
                "{} must name a path below the root without a trailing '/'",
                name
            );
        }
        anyhow::ensure!(
            !self.database.catalog.path.trim().is_empty(),
            "database.catalog.path cannot be empty"
        );
        anyhow::ensure!(
            !self.database.graph.connection.is_empty(),
            "database.graph.connection cannot be empty"
        );
        anyhow::ensure!(
            !self.database.graph.namespace.is_empty(),
            "database.graph.namespace cannot be empty"
        );
        anyhow::ensure!(
            !self.database.graph.database.is_empty(),
            "database.graph.database cannot be empty"
        );
        Ok(())
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings: Settings,
    config_dir: PathBuf,
    env: String,
}

impl ConfigManager {
    /// Load settings from the default config directory and environment.
    pub fn new() -> Result<Self> {
        Self::with_options(None, None)
    }

    pub fn with_options(config_dir: Option<PathBuf>, env_override: Option<String>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {:?}", path);
        }
        let env_name = env_override.unwrap_or_else(Settings::default_env);
        let config_dir = config_dir.unwrap_or_else(Self::default_config_dir);
        let settings = Self::load_from_sources(&config_dir, &env_name)?;
        settings.validate()?;
        Ok(Self {
            settings,
            config_dir,
            env: env_name,
        })
    }

    /// Wrap already-built settings, e.g. in tests.
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            env: settings.env.clone(),
            settings,
            config_dir: PathBuf::from("."),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn env(&self) -> &str {
        &self.env
    }

    /// Get the default configuration directory.
    ///
    /// Priority order:
    /// 1. ~/.xuav/ (user-level config)
    /// 2. ./config/ (project-level config)
    /// 3. Current directory (fallback)
    pub fn default_config_dir() -> PathBuf {
        if let Some(home_dir) = dirs::home_dir() {
            let user_dir = home_dir.join(".xuav");
            if user_dir.exists() {
                info!("Using config directory: {:?}", user_dir);
                return user_dir;
            }
        }

        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            info!("Using config directory: {:?}", project_config);
            return project_config;
        }

        info!("Using config directory: {:?}", cwd);
        cwd
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Settings> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix("XUAV").separator("__"))
            .set_override("env", env_name)
            .context("setting env override")?
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        Ok(settings)
    }
}
