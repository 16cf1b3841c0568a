//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// 环境变量前缀（GEOMAP_CACHE__CAPACITY -> cache.capacity）
pub const ENV_PREFIX: &str = "GEOMAP";

/// 配置来源
///
/// 加载顺序（后加载的会覆盖先加载的同名配置项）：
/// 1. {config_dir}/default.toml（默认配置）
/// 2. {config_dir}/{environment}.toml（环境特定配置）
/// 3. {config_dir}/{service_name}.toml（服务特定配置）
/// 4. 环境变量（GEOMAP_ 前缀，嵌套字段使用双下划线分隔）
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub config_dir: PathBuf,
    pub environment: String,
    pub service_name: String,
    pub read_env: bool,
}

impl ConfigSource {
    /// 从环境变量确定配置目录与运行环境
    pub fn from_env(service_name: &str) -> Self {
        let environment =
            std::env::var("GEOMAP_ENV").unwrap_or_else(|_| "development".to_string());
        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

        Self {
            config_dir: PathBuf::from(config_dir),
            environment,
            service_name: service_name.to_string(),
            read_env: true,
        }
    }

    /// 指定配置目录，不读取环境变量覆盖（主要用于测试）
    pub fn with_dir(dir: impl AsRef<Path>, environment: &str, service_name: &str) -> Self {
        Self {
            config_dir: dir.as_ref().to_path_buf(),
            environment: environment.to_string(),
            service_name: service_name.to_string(),
            read_env: false,
        }
    }

    /// 加载并反序列化配置
    ///
    /// 目标类型需要为缺失字段提供默认值（`#[serde(default)]`），
    /// 所有配置文件均为可选。
    pub fn load<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let dir = &self.config_dir;

        let mut builder = Config::builder()
            .set_default("service_name", self.service_name.as_str())?
            .set_default("environment", self.environment.as_str())?
            .add_source(File::from(dir.join("default.toml")).required(false))
            .add_source(File::from(dir.join(format!("{}.toml", self.environment))).required(false))
            .add_source(
                File::from(dir.join(format!("{}.toml", self.service_name))).required(false),
            );

        if self.read_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        builder.build()?.try_deserialize()
    }
}

/// 按服务名加载配置（目录与环境取自 CONFIG_DIR / GEOMAP_ENV）
pub fn load<T: DeserializeOwned>(service_name: &str) -> Result<T, ConfigError> {
    ConfigSource::from_env(service_name).load()
}
