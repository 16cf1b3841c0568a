//! GeoJSON 取值映射图层
//!
//! 图层持有编译后的样式列表并提供逐要素的样式回调。用户编辑配置时
//! 整体替换样式列表（不做增量修改），下一次渲染全部重新解析。

use crate::cache::{StyleCache, StyleCacheKey};
use crate::compiler::{CompiledStyleSet, StyleCompiler};
use crate::error::{Result, StyleError};
use crate::models::{FeatureLike, FeatureStyleConfig};
use crate::resolver::{Resolution, StyleResolver};
use crate::style::Style;
use arc_swap::ArcSwap;
use geomap_shared::observability::metrics::record_style_resolution;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// 默认 GeoJSON 数据源
pub const DEFAULT_GEOJSON_SRC: &str = "public/maps/countries.geojson";

/// 插件成熟度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginState {
    Alpha,
    Beta,
    Stable,
}

/// 图层注册信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRegistryItem {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub is_base_map: bool,
    pub state: PluginState,
}

/// geojson 取值映射图层的注册信息
pub const GEOJSON_MAPPER: LayerRegistryItem = LayerRegistryItem {
    id: "geojson-value-mapper",
    name: "Map values to GeoJSON file",
    description: "color features based on query results",
    is_base_map: false,
    state: PluginState::Alpha,
};

/// 数据源下拉选项（允许自定义值）
pub const GEOJSON_SOURCE_OPTIONS: &[&str] = &[
    "public/maps/countries.geojson",
    "public/maps/usa-states.geojson",
    "public/gazetteer/airports.geojson",
];

/// 图层配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoJsonMapperConfig {
    /// GeoJSON 文件地址
    pub src: String,
    /// 可应用的样式（按顺序评估）
    pub styles: Vec<FeatureStyleConfig>,
}

impl Default for GeoJsonMapperConfig {
    fn default() -> Self {
        Self {
            src: DEFAULT_GEOJSON_SRC.to_string(),
            styles: Vec::new(),
        }
    }
}

fn default_layer_type() -> String {
    GEOJSON_MAPPER.id.to_string()
}

/// 图层选项（面板配置中的一项图层）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerOptions {
    #[serde(rename = "type", default = "default_layer_type")]
    pub layer_type: String,
    pub name: String,
    #[serde(default)]
    pub config: GeoJsonMapperConfig,
}

impl LayerOptions {
    pub fn new(name: impl Into<String>, config: GeoJsonMapperConfig) -> Self {
        Self {
            layer_type: default_layer_type(),
            name: name.into(),
            config,
        }
    }
}

/// GeoJSON 取值映射图层
pub struct GeoJsonLayer {
    name: String,
    src: String,
    styles: ArcSwap<CompiledStyleSet>,
    compiler: Mutex<StyleCompiler>,
    default_style: Style,
    cache: Option<StyleCache>,
}

impl GeoJsonLayer {
    /// 创建图层
    ///
    /// `cache_capacity` 为 None 时不缓存解析结果。
    pub fn create(options: LayerOptions, cache_capacity: Option<usize>) -> Result<Self> {
        if options.layer_type != GEOJSON_MAPPER.id {
            return Err(StyleError::InvalidConfig(format!(
                "图层 '{}' 的类型 '{}' 不是 {}",
                options.name, options.layer_type, GEOJSON_MAPPER.id
            )));
        }

        if options.name.is_empty() {
            return Err(StyleError::InvalidConfig("图层名称不能为空".to_string()));
        }

        let mut compiler = StyleCompiler::new();
        let compiled = compiler.compile(options.config.styles);

        info!(
            layer = %options.name,
            src = %options.config.src,
            styles = compiled.len(),
            cached = cache_capacity.is_some(),
            "图层已创建"
        );

        Ok(Self {
            name: options.name,
            src: options.config.src,
            styles: ArcSwap::from_pointee(compiled),
            compiler: Mutex::new(compiler),
            default_style: Style::layer_default(),
            cache: cache_capacity.map(StyleCache::new),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    /// 当前样式列表快照
    pub fn styles(&self) -> Arc<CompiledStyleSet> {
        self.styles.load_full()
    }

    /// 当前图层配置
    pub fn config(&self) -> GeoJsonMapperConfig {
        GeoJsonMapperConfig {
            src: self.src.clone(),
            styles: self.styles.load().configs(),
        }
    }

    pub fn cache(&self) -> Option<&StyleCache> {
        self.cache.as_ref()
    }

    /// 要素样式回调
    pub fn style<F>(&self, feature: &F) -> Style
    where
        F: FeatureLike + ?Sized,
    {
        let start = Instant::now();
        let set = self.styles.load();

        let (style, outcome) = match &self.cache {
            Some(cache) => cache.get_or_insert_with(StyleCacheKey::new(&set, feature), || {
                set.resolve_outcome(feature, &self.default_style)
            }),
            None => set.resolve_outcome(feature, &self.default_style),
        };

        record_style_resolution(&self.name, outcome.as_str(), start.elapsed().as_secs_f64());
        style
    }

    /// 解析要素样式并返回评估追踪
    pub fn resolve_with_trace<F>(&self, feature: &F) -> Resolution
    where
        F: FeatureLike + ?Sized,
    {
        let configs = self.styles.load().configs();
        StyleResolver::resolve_with_trace(&configs, feature, &self.default_style)
    }

    /// 整体替换样式列表，返回新的编译版本号
    pub fn replace_styles(&self, configs: Vec<FeatureStyleConfig>) -> u64 {
        let compiled = {
            let mut compiler = self.compiler.lock();
            compiler.compile(configs)
        };
        let version = compiled.compile_version;

        self.styles.store(Arc::new(compiled));
        if let Some(cache) = &self.cache {
            cache.clear();
        }

        info!(layer = %self.name, compile_version = version, "图层样式已替换");
        version
    }
}
