//! 要素样式
//!
//! 与渲染后端无关的样式描述，颜色按原样透传。

use crate::models::{DEFAULT_FILL_COLOR, DEFAULT_STROKE_WIDTH, FeatureStyleConfig, GeometryKind};
use serde::Serialize;

/// 点要素圆形标记半径
pub const MARKER_RADIUS: f64 = 5.0;

/// 填充
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fill {
    pub color: String,
}

impl Fill {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
        }
    }
}

/// 描边
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

/// 圆形标记
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircleMarker {
    pub radius: f64,
    pub fill: Fill,
    pub stroke: Stroke,
}

/// 样式
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<CircleMarker>,
}

impl Style {
    /// 由匹配到的样式配置构建样式
    ///
    /// 填充与轮廓描边都使用 fillColor；点要素额外附带同参数的圆形标记。
    pub fn from_config(config: &FeatureStyleConfig, geometry: Option<GeometryKind>) -> Self {
        let fill = Fill::new(config.fill_color.as_str());
        let stroke = Stroke::new(config.fill_color.as_str(), config.stroke_width);

        let image = geometry.filter(|g| g.is_point()).map(|_| CircleMarker {
            radius: MARKER_RADIUS,
            fill: fill.clone(),
            stroke: stroke.clone(),
        });

        Self {
            fill: Some(fill),
            stroke: Some(stroke),
            image,
        }
    }

    /// geojson 图层的默认样式
    pub fn layer_default() -> Self {
        let stroke = Stroke::new(DEFAULT_FILL_COLOR, DEFAULT_STROKE_WIDTH);

        Self {
            fill: None,
            stroke: Some(stroke.clone()),
            image: Some(CircleMarker {
                radius: MARKER_RADIUS,
                fill: Fill::new("red"),
                stroke,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_style_has_no_marker() {
        let config = FeatureStyleConfig::new("#FF0000", 2.0);
        let style = Style::from_config(&config, Some(GeometryKind::Polygon));

        assert_eq!(style.fill, Some(Fill::new("#FF0000")));
        assert_eq!(style.stroke, Some(Stroke::new("#FF0000", 2.0)));
        assert!(style.image.is_none());
    }

    #[test]
    fn test_point_style_has_marker() {
        let config = FeatureStyleConfig::new("#FF0000", 2.0);
        let style = Style::from_config(&config, Some(GeometryKind::Point));

        let marker = style.image.expect("point features get a marker");
        assert_eq!(marker.radius, MARKER_RADIUS);
        assert_eq!(marker.fill.color, "#FF0000");
        assert_eq!(marker.stroke.width, 2.0);
    }

    #[test]
    fn test_color_is_passed_through() {
        let config = FeatureStyleConfig::new("not-a-color", -3.0);
        let style = Style::from_config(&config, Some(GeometryKind::LineString));
        assert_eq!(style.stroke, Some(Stroke::new("not-a-color", -3.0)));
    }

    #[test]
    fn test_layer_default() {
        let style = Style::layer_default();
        assert!(style.fill.is_none());
        assert_eq!(style.stroke, Some(Stroke::new("#1F60C4", 1.0)));
        assert_eq!(style.image.unwrap().fill.color, "red");
    }

    #[test]
    fn test_serialization_omits_absent_parts() {
        let style = Style::from_config(&FeatureStyleConfig::new("#000", 1.0), None);
        let json = serde_json::to_value(&style).unwrap();
        assert!(json.get("image").is_none());
        assert_eq!(json["fill"]["color"], "#000");
    }
}
