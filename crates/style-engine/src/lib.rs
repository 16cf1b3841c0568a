//! geomap 要素样式引擎
//!
//! 为地图图层的矢量要素解析样式，支持：
//! - 样式规则（属性 / 比较操作符 / 字面值）评估
//! - 按顺序首条匹配的样式解析与默认样式回退
//! - 样式列表编译、外层缓存与图层管理

pub mod cache;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod layer;
pub mod models;
pub mod operators;
pub mod resolver;
pub mod settings;
pub mod store;
pub mod style;

pub use cache::{StyleCache, StyleCacheKey};
pub use compiler::{CompiledStyle, CompiledStyleSet, StyleCompiler};
pub use error::{Result, StyleError};
pub use evaluator::RuleEvaluator;
pub use layer::{
    GEOJSON_MAPPER, GeoJsonLayer, GeoJsonMapperConfig, LayerOptions, LayerRegistryItem,
    PluginState,
};
pub use models::{
    Feature, FeatureLike, FeatureStyleConfig, GeometryKind, PropertyMap, PropertyValue, StyleRule,
};
pub use operators::ComparisonOperation;
pub use resolver::{Resolution, ResolutionOutcome, StyleResolver};
pub use settings::EngineSettings;
pub use store::{LayerStore, LayerStoreStats};
pub use style::{CircleMarker, Fill, Stroke, Style};
