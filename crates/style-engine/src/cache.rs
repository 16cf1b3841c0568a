//! 样式缓存
//!
//! 解析器本身不做缓存；需要缓存的调用方在外层使用 `StyleCache`，
//! 以 (编译版本, 几何类型, 规则引用属性的快照) 为键。
//! 解析结果只依赖这些输入，因此同键必然得到等值样式。

use crate::compiler::CompiledStyleSet;
use crate::models::{FeatureLike, GeometryKind, PropertyValue};
use crate::resolver::ResolutionOutcome;
use crate::style::Style;
use dashmap::DashMap;
use geomap_shared::observability::metrics::record_style_cache_lookup;

/// 属性快照中的单个值
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SnapshotValue {
    Missing,
    Bool(bool),
    Number(u64),
    String(String),
}

impl SnapshotValue {
    fn of(value: Option<&PropertyValue>) -> Self {
        match value {
            None => Self::Missing,
            Some(PropertyValue::Bool(b)) => Self::Bool(*b),
            Some(PropertyValue::Number(n)) => Self::Number(Self::number_bits(*n)),
            Some(PropertyValue::String(s)) => Self::String(s.clone()),
        }
    }

    /// 统一 -0/0 与所有 NaN 的位表示
    fn number_bits(n: f64) -> u64 {
        if n.is_nan() {
            f64::NAN.to_bits()
        } else if n == 0.0 {
            0.0f64.to_bits()
        } else {
            n.to_bits()
        }
    }
}

/// 缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleCacheKey {
    compile_version: u64,
    geometry: Option<GeometryKind>,
    values: Vec<SnapshotValue>,
}

impl StyleCacheKey {
    pub fn new<F>(set: &CompiledStyleSet, feature: &F) -> Self
    where
        F: FeatureLike + ?Sized,
    {
        Self {
            compile_version: set.compile_version,
            geometry: feature.geometry(),
            values: set
                .required_properties
                .iter()
                .map(|p| SnapshotValue::of(feature.property(p)))
                .collect(),
        }
    }
}

/// 缓存条目：样式及其解析结果类型
pub type CachedResolution = (Style, ResolutionOutcome);

/// 样式缓存（容量满时整体清空）
pub struct StyleCache {
    entries: DashMap<StyleCacheKey, CachedResolution>,
    capacity: usize,
}

impl StyleCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// 查询缓存，未命中时计算并写入
    pub fn get_or_insert_with<C>(&self, key: StyleCacheKey, compute: C) -> CachedResolution
    where
        C: FnOnce() -> CachedResolution,
    {
        if let Some(cached) = self.entries.get(&key).map(|e| e.value().clone()) {
            record_style_cache_lookup(true);
            return cached;
        }

        record_style_cache_lookup(false);
        let resolved = compute();

        if self.entries.len() >= self.capacity {
            self.entries.clear();
        }
        self.entries.insert(key, resolved.clone());

        resolved
    }
}
