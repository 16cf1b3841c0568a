//! 样式引擎领域模型

use crate::operators::ComparisonOperation;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// 图层默认填充色
pub const DEFAULT_FILL_COLOR: &str = "#1F60C4";

/// 图层默认描边宽度
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

/// 要素属性值（标量）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl PropertyValue {
    /// 从 JSON 值转换，非标量（null、数组、对象）视为不存在
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Number),
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// 规范字符串形式：数字不带多余小数位（5 而非 5.0），布尔为 true/false
    pub fn to_canonical_string(&self) -> Cow<'_, str> {
        match self {
            Self::String(s) => Cow::Borrowed(s.as_str()),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    /// 数值视图：字符串去除首尾空白后解析，布尔与无法解析的字符串返回 None
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if !n.is_nan() => Some(*n),
            Self::Number(_) | Self::Bool(_) => None,
            Self::String(s) => parse_number(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// 将字符串解析为数值，空串、NaN 与非 Infinity 拼写的无穷视为无法解析
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // 无穷只接受 Infinity 拼写（inf、INFINITY 等视为非数值）
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned.starts_with(['i', 'I']) && unsigned != "Infinity" {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| !n.is_nan())
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if n == 0.0 {
        // -0 与 0 同形
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// 要素属性表
pub type PropertyMap = BTreeMap<String, PropertyValue>;

fn deserialize_properties<'de, D>(deserializer: D) -> Result<PropertyMap, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<serde_json::Map<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|(k, v)| PropertyValue::from_json(v).map(|pv| (k.clone(), pv)))
        .collect())
}

fn deserialize_rule_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(PropertyValue::from_json(&raw)
        .map(|v| v.to_canonical_string().into_owned())
        .unwrap_or_default())
}

/// 几何类型（GeoJSON 类型名）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
}

impl GeometryKind {
    /// 是否以圆形标记渲染
    pub fn is_point(self) -> bool {
        matches!(self, Self::Point | Self::MultiPoint)
    }
}

/// 渲染端要素的最小抽象
///
/// 样式引擎只需要知道要素是否有几何以及按名读取属性，
/// 任何渲染后端的要素类型实现该 trait 即可接入。
pub trait FeatureLike {
    /// 几何类型，无几何时返回 None
    fn geometry(&self) -> Option<GeometryKind>;

    /// 按名读取属性，不存在时返回 None
    fn property(&self, key: &str) -> Option<&PropertyValue>;
}

/// 要素
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub geometry: Option<GeometryKind>,
    #[serde(default, deserialize_with = "deserialize_properties")]
    pub properties: PropertyMap,
}

impl Feature {
    pub fn new(geometry: GeometryKind) -> Self {
        Self {
            geometry: Some(geometry),
            properties: PropertyMap::new(),
        }
    }

    /// 创建无几何的要素
    pub fn without_geometry() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

impl FeatureLike for Feature {
    fn geometry(&self) -> Option<GeometryKind> {
        self.geometry
    }

    fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

/// 样式规则：feature.properties[property] `operation` value
///
/// `property` 为空字符串表示无条件匹配（兜底规则）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyleRule {
    #[serde(default)]
    pub property: String,
    #[serde(default)]
    pub operation: ComparisonOperation,
    #[serde(default, deserialize_with = "deserialize_rule_value")]
    pub value: String,
}

impl StyleRule {
    pub fn new(
        property: impl Into<String>,
        operation: ComparisonOperation,
        value: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            operation,
            value: value.into(),
        }
    }

    /// 无条件匹配的兜底规则
    pub fn wildcard() -> Self {
        Self::default()
    }

    pub fn is_wildcard(&self) -> bool {
        self.property.is_empty()
    }
}

fn default_fill_color() -> String {
    DEFAULT_FILL_COLOR.to_string()
}

fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

/// 单条样式配置
///
/// `rule` 缺省时匹配任意要素。颜色作为不透明字符串透传给渲染层，不做校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyleConfig {
    #[serde(default = "default_fill_color", alias = "fillcolor")]
    pub fill_color: String,
    #[serde(default = "default_stroke_width", alias = "strokewidth")]
    pub stroke_width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<StyleRule>,
}

impl FeatureStyleConfig {
    /// 无规则（匹配任意要素）的样式配置
    pub fn new(fill_color: impl Into<String>, stroke_width: f64) -> Self {
        Self {
            fill_color: fill_color.into(),
            stroke_width,
            rule: None,
        }
    }

    pub fn with_rule(mut self, rule: StyleRule) -> Self {
        self.rule = Some(rule);
        self
    }

    /// 图层默认样式规则（空属性的 eq 规则）
    pub fn catch_all() -> Self {
        Self::new(DEFAULT_FILL_COLOR, DEFAULT_STROKE_WIDTH).with_rule(StyleRule::wildcard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_string() {
        assert_eq!(PropertyValue::from(5).to_canonical_string(), "5");
        assert_eq!(PropertyValue::from(5.5).to_canonical_string(), "5.5");
        assert_eq!(PropertyValue::from(-0.0).to_canonical_string(), "0");
        assert_eq!(PropertyValue::from(true).to_canonical_string(), "true");
        assert_eq!(PropertyValue::from("Airport").to_canonical_string(), "Airport");
        assert_eq!(PropertyValue::from(f64::INFINITY).to_canonical_string(), "Infinity");
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(PropertyValue::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(PropertyValue::from("1.5e3").as_number(), Some(1500.0));
        assert_eq!(PropertyValue::from("abc").as_number(), None);
        assert_eq!(PropertyValue::from("").as_number(), None);
        assert_eq!(PropertyValue::from("NaN").as_number(), None);
        assert_eq!(PropertyValue::from(true).as_number(), None);
    }

    #[test]
    fn test_infinity_spellings() {
        assert_eq!(parse_number("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_number(" -Infinity "), Some(f64::NEG_INFINITY));
        assert_eq!(parse_number("+Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-inf"), None);
        assert_eq!(parse_number("infinity"), None);
        assert_eq!(parse_number("INFINITY"), None);
    }

    #[test]
    fn test_canonical_string_never_uses_exponent() {
        assert_eq!(
            PropertyValue::from(1e21).to_canonical_string(),
            "1000000000000000000000"
        );
        assert_eq!(PropertyValue::from(1e-7).to_canonical_string(), "0.0000001");
        assert_eq!(PropertyValue::from(-2.5e6).to_canonical_string(), "-2500000");
    }

    #[test]
    fn test_feature_deserialization_skips_non_scalars() {
        let feature: Feature = serde_json::from_value(json!({
            "geometry": "Point",
            "properties": {
                "name": "SFO",
                "elevation": 13,
                "international": true,
                "closed": null,
                "runways": [1, 2],
                "meta": {"a": 1}
            }
        }))
        .unwrap();

        assert_eq!(feature.geometry, Some(GeometryKind::Point));
        assert_eq!(feature.properties.len(), 3);
        assert_eq!(feature.property("elevation"), Some(&PropertyValue::Number(13.0)));
        assert!(feature.property("closed").is_none());
        assert!(feature.property("runways").is_none());
    }

    #[test]
    fn test_feature_without_properties() {
        let feature: Feature = serde_json::from_value(json!({"geometry": null})).unwrap();
        assert!(feature.geometry.is_none());
        assert!(feature.properties.is_empty());
    }

    #[test]
    fn test_style_config_camel_case() {
        let config: FeatureStyleConfig = serde_json::from_value(json!({
            "fillColor": "#FF0000",
            "strokeWidth": 2,
            "rule": {"property": "type", "operation": "eq", "value": "airport"}
        }))
        .unwrap();

        assert_eq!(config.fill_color, "#FF0000");
        assert_eq!(config.stroke_width, 2.0);
        assert_eq!(
            config.rule,
            Some(StyleRule::new("type", ComparisonOperation::Eq, "airport"))
        );
    }

    #[test]
    fn test_style_config_defaults() {
        let config: FeatureStyleConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config.fill_color, DEFAULT_FILL_COLOR);
        assert_eq!(config.stroke_width, DEFAULT_STROKE_WIDTH);
        assert!(config.rule.is_none());
    }

    #[test]
    fn test_rule_value_accepts_scalars() {
        let rule: StyleRule = serde_json::from_value(json!({
            "property": "population",
            "operation": "gt",
            "value": 1000000
        }))
        .unwrap();
        assert_eq!(rule.value, "1000000");
    }

    #[test]
    fn test_catch_all_is_wildcard() {
        let config = FeatureStyleConfig::catch_all();
        assert!(config.rule.as_ref().is_some_and(StyleRule::is_wildcard));
        assert_eq!(config.fill_color, "#1F60C4");
    }
}
