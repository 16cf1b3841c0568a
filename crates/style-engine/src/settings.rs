//! 样式引擎配置
//!
//! 通过 geomap-shared 的分层配置加载（config/default.toml → 环境 → 服务 → GEOMAP_ 环境变量）。

use crate::layer::LayerOptions;
use crate::store::LayerStore;
use config::ConfigError;
use geomap_shared::config::ConfigSource;
use geomap_shared::observability::ObservabilityConfig;
use serde::Deserialize;

/// 服务名，对应 config/style-engine.toml
pub const SERVICE_NAME: &str = "style-engine";

/// 样式缓存配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: 4096,
        }
    }
}

/// 样式引擎配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub service_name: String,
    pub environment: String,
    pub observability: ObservabilityConfig,
    pub cache: CacheSettings,
    /// 启动时加载的图层
    pub layers: Vec<LayerOptions>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            service_name: SERVICE_NAME.to_string(),
            environment: "development".to_string(),
            observability: ObservabilityConfig::default(),
            cache: CacheSettings::default(),
            layers: Vec::new(),
        }
    }
}

impl EngineSettings {
    /// 从 CONFIG_DIR / GEOMAP_ENV 指定的位置加载配置
    pub fn load() -> Result<Self, ConfigError> {
        geomap_shared::config::load(SERVICE_NAME)
    }

    /// 从指定来源加载配置
    pub fn load_from(source: &ConfigSource) -> Result<Self, ConfigError> {
        source.load()
    }

    /// 新建图层使用的缓存容量
    pub fn cache_capacity(&self) -> Option<usize> {
        self.cache.enabled.then_some(self.cache.capacity)
    }

    /// 按配置构建图层存储，返回成功加载的图层名
    pub fn build_store(&self) -> (LayerStore, Vec<String>) {
        let store = LayerStore::with_cache(self.cache_capacity());
        let loaded = store.load_batch(self.layers.clone());
        (store, loaded)
    }
}
