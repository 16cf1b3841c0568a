//! 图层存储管理
//!
//! 使用 DashMap 提供线程安全的图层注册表，支持图层的加载、样式替换、删除和批量操作。

use crate::error::{Result, StyleError};
use crate::layer::{GeoJsonLayer, LayerOptions};
use crate::models::FeatureStyleConfig;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 图层存储
#[derive(Clone)]
pub struct LayerStore {
    layers: Arc<DashMap<String, Arc<GeoJsonLayer>>>,
    /// 新建图层的缓存容量，None 表示不缓存
    cache_capacity: Option<usize>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::with_cache(None)
    }

    pub fn with_cache(cache_capacity: Option<usize>) -> Self {
        Self {
            layers: Arc::new(DashMap::new()),
            cache_capacity,
        }
    }

    /// 获取当前存储的图层数量
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// 检查存储是否为空
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// 加载图层（同名图层被整体替换）
    #[instrument(skip(self, options), fields(layer = %options.name))]
    pub fn load(&self, options: LayerOptions) -> Result<()> {
        let layer = GeoJsonLayer::create(options, self.cache_capacity)?;
        let name = layer.name().to_string();

        if self.layers.insert(name.clone(), Arc::new(layer)).is_some() {
            info!("图层已重新加载: {}", name);
        } else {
            info!("图层已加载: {}", name);
        }
        Ok(())
    }

    /// 加载图层（从 JSON 字符串）
    #[instrument(skip(self, json))]
    pub fn load_from_json(&self, json: &str) -> Result<String> {
        let options: LayerOptions = serde_json::from_str(json)?;
        let name = options.name.clone();
        self.load(options)?;
        Ok(name)
    }

    /// 批量加载图层，返回成功加载的图层名
    #[instrument(skip(self, options))]
    pub fn load_batch(&self, options: Vec<LayerOptions>) -> Vec<String> {
        let mut loaded = Vec::with_capacity(options.len());
        let mut errors = Vec::new();

        for option in options {
            let name = option.name.clone();
            match self.load(option) {
                Ok(()) => loaded.push(name),
                Err(e) => errors.push((name, e)),
            }
        }

        if !errors.is_empty() {
            warn!("批量加载部分失败: {:?}", errors);
        }

        info!("批量加载完成: {} 成功, {} 失败", loaded.len(), errors.len());
        loaded
    }

    /// 替换图层的样式列表
    #[instrument(skip(self, styles))]
    pub fn replace_styles(&self, name: &str, styles: Vec<FeatureStyleConfig>) -> Result<u64> {
        let layer = self.get(name).ok_or_else(|| {
            warn!("替换不存在图层的样式: {}", name);
            StyleError::LayerNotFound(name.to_string())
        })?;

        Ok(layer.replace_styles(styles))
    }

    /// 删除图层
    #[instrument(skip(self))]
    pub fn remove(&self, name: &str) -> Result<()> {
        if self.layers.remove(name).is_some() {
            info!("图层已删除: {}", name);
            Ok(())
        } else {
            warn!("删除不存在的图层: {}", name);
            Err(StyleError::LayerNotFound(name.to_string()))
        }
    }

    /// 获取图层
    pub fn get(&self, name: &str) -> Option<Arc<GeoJsonLayer>> {
        self.layers.get(name).map(|l| Arc::clone(l.value()))
    }

    /// 检查图层是否存在
    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    /// 获取所有图层名（已排序）
    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.layers.iter().map(|l| l.key().clone()).collect();
        ids.sort();
        ids
    }

    /// 清空所有图层
    #[instrument(skip(self))]
    pub fn clear(&self) {
        let count = self.layers.len();
        self.layers.clear();
        info!("已清空 {} 个图层", count);
    }

    /// 获取存储统计信息
    pub fn stats(&self) -> LayerStoreStats {
        let layers_count = self.layers.len();
        let total_styles: usize = self.layers.iter().map(|l| l.styles().len()).sum();

        LayerStoreStats {
            layers_count,
            total_styles,
        }
    }
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 图层存储统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerStoreStats {
    /// 图层总数
    pub layers_count: usize,
    /// 所有图层的样式配置总数
    pub total_styles: usize,
}
