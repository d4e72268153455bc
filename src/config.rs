use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::services::catalog::{DEFAULT_CHECK_TIMEOUT, HealthCheckSpec, ServiceIdentity};

/// 配置文件路径的环境变量
pub const CONFIG_PATH_ENV: &str = "SERVICE_CATALOG_CONFIG";
/// 覆盖配置的环境变量前缀
pub const ENV_PREFIX: &str = "CATALOG_";

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid environment override: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Consul,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub service: ServiceConfig,
}

// 服务目录配置，启动时加载一次
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// 目录地址
    pub address: String,
    /// ACL token
    pub token: Option<String>,
    pub backend: BackendKind,
    /// 健康检查间隔（秒）
    pub check_interval: u64,
    /// 健康检查超时（秒）
    pub check_timeout: u64,
    /// 检查持续 critical 多少分钟后自动注销，0 表示关闭
    pub deregister_critical_after_minutes: u64,
    /// 启动/停止钩子的截止时间（秒）
    pub lifecycle_timeout: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            address: "http://localhost:8500".to_string(),
            token: None,
            backend: BackendKind::Consul,
            check_interval: 10,
            check_timeout: DEFAULT_CHECK_TIMEOUT.as_secs(),
            deregister_critical_after_minutes: 1,
            lifecycle_timeout: 10,
        }
    }
}

// 本实例的服务身份配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    /// 为空时在加载时生成 `{name}-{uuid}`
    pub id: String,
    pub address: String,
    pub port: u16,
    pub tags: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "my-service".to_string(),
            id: String::new(),
            address: "localhost".to_string(),
            port: 5000,
            tags: vec!["api".to_string()],
        }
    }
}

// 环境变量覆盖项，均为可选
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    address: Option<String>,
    token: Option<String>,
    backend: Option<BackendKind>,
    service_name: Option<String>,
    service_id: Option<String>,
    service_address: Option<String>,
    service_port: Option<u16>,
    service_tags: Option<Vec<String>>,
    check_interval: Option<u64>,
    deregister_after_minutes: Option<u64>,
}

impl Config {
    /// 加载 .env、配置文件和环境变量覆盖
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::read_file_or_default(Path::new(&path))?.with_env_vars_os(std::env::vars_os())
    }

    /// 文件不存在时使用默认值
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::read_file_or_default(path.as_ref())?.finalize()
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(config_str)?;
        config.finalize()
    }

    fn read_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)?;
        Ok(toml::from_str(&config_str)?)
    }

    /// 同 [`Config::with_env_vars`]，跳过不是 UTF-8 的变量
    pub fn with_env_vars_os<I>(self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let vars = vars.into_iter().filter_map(|(key, value)| {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => Some((key, value)),
                (key, _) => {
                    tracing::debug!(key = ?key, "Skipping non UTF-8 environment variable");
                    None
                }
            }
        });
        self.with_env_vars(vars)
    }

    /// 应用带 `CATALOG_` 前缀的变量，其余变量忽略。ID 已生成时不会随服务名变化
    pub fn with_env_vars<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let overrides: EnvOverrides = envy::prefixed(ENV_PREFIX).from_iter(vars)?;

        if let Some(address) = overrides.address {
            self.catalog.address = address;
        }
        if let Some(token) = overrides.token {
            self.catalog.token = Some(token);
        }
        if let Some(backend) = overrides.backend {
            self.catalog.backend = backend;
        }
        if let Some(interval) = overrides.check_interval {
            self.catalog.check_interval = interval;
        }
        if let Some(minutes) = overrides.deregister_after_minutes {
            self.catalog.deregister_critical_after_minutes = minutes;
        }

        if let Some(name) = overrides.service_name {
            self.service.name = name;
        }
        if let Some(id) = overrides.service_id {
            self.service.id = id;
        }
        if let Some(address) = overrides.service_address {
            self.service.address = address;
        }
        if let Some(port) = overrides.service_port {
            self.service.port = port;
        }
        if let Some(tags) = overrides.service_tags {
            self.service.tags = tags;
        }

        self.finalize()
    }

    // 补全生成的 ID 并校验
    fn finalize(mut self) -> Result<Self, ConfigError> {
        if self.service.id.trim().is_empty() {
            self.service.id = format!("{}-{}", self.service.name, uuid::Uuid::new_v4());
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog.backend == BackendKind::Consul && self.catalog.address.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "catalog.address must not be empty".to_string(),
            ));
        }
        if self.catalog.check_interval == 0 {
            return Err(ConfigError::Invalid(
                "catalog.check_interval must be greater than zero".to_string(),
            ));
        }
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::Invalid("service.name must not be empty".to_string()));
        }
        if self.service.port == 0 {
            return Err(ConfigError::Invalid(
                "service.port must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn service_identity(&self) -> ServiceIdentity {
        ServiceIdentity {
            id: self.service.id.clone(),
            service_name: self.service.name.clone(),
            address: self.service.address.clone(),
            port: self.service.port,
            tags: self.service.tags.clone(),
        }
    }

    pub fn health_check(&self) -> HealthCheckSpec {
        HealthCheckSpec::http(
            Duration::from_secs(self.catalog.check_interval),
            Duration::from_secs(self.catalog.check_timeout),
            Duration::from_secs(
                self.catalog
                    .deregister_critical_after_minutes
                    .saturating_mul(60),
            ),
        )
    }

    pub fn lifecycle_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.lifecycle_timeout)
    }
}
