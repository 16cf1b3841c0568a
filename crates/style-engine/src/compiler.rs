//! 样式规则编译器
//!
//! 将样式配置列表编译成可重复使用的解析结构：预编译正则、预构建样式、
//! 提取规则引用的属性（用于缓存键）。编译结果的解析语义与
//! [`StyleResolver::resolve_style`](crate::resolver::StyleResolver::resolve_style) 完全一致。

use crate::error::Result;
use crate::evaluator::RuleEvaluator;
use crate::models::{FeatureLike, FeatureStyleConfig, GeometryKind};
use crate::operators::ComparisonOperation;
use crate::resolver::ResolutionOutcome;
use crate::style::Style;
use geomap_shared::observability::metrics::record_style_set_compilation;
use regex::Regex;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// 编译后的单条样式
#[derive(Debug, Clone)]
pub struct CompiledStyle {
    pub config: FeatureStyleConfig,
    /// regex 规则的预编译正则，非法正则为 None
    pattern: Option<Regex>,
    point_style: Style,
    shape_style: Style,
}

impl CompiledStyle {
    fn matches<F>(&self, feature: &F) -> bool
    where
        F: FeatureLike + ?Sized,
    {
        match &self.config.rule {
            None => true,
            Some(rule) => RuleEvaluator::matches_with_pattern(rule, feature, self.pattern.as_ref()),
        }
    }

    /// 是否无条件匹配
    pub fn is_unconditional(&self) -> bool {
        self.config.rule.as_ref().is_none_or(|r| r.is_wildcard())
    }
}

/// 编译后的样式列表
#[derive(Debug, Clone)]
pub struct CompiledStyleSet {
    styles: Vec<CompiledStyle>,
    /// 规则中引用的所有属性名
    pub required_properties: BTreeSet<String>,
    /// 编译版本号（用于缓存失效）
    pub compile_version: u64,
}

impl CompiledStyleSet {
    pub fn styles(&self) -> &[CompiledStyle] {
        &self.styles
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// 原始样式配置
    pub fn configs(&self) -> Vec<FeatureStyleConfig> {
        self.styles.iter().map(|s| s.config.clone()).collect()
    }

    /// 返回首条匹配的下标
    pub fn find_match<F>(&self, feature: &F) -> Option<usize>
    where
        F: FeatureLike + ?Sized,
    {
        feature.geometry()?;
        self.styles.iter().position(|s| s.matches(feature))
    }

    /// 解析要素样式
    pub fn resolve<F>(&self, feature: &F, default_style: &Style) -> Style
    where
        F: FeatureLike + ?Sized,
    {
        self.resolve_outcome(feature, default_style).0
    }

    /// 解析要素样式，同时返回解析结果类型
    pub fn resolve_outcome<F>(&self, feature: &F, default_style: &Style) -> (Style, ResolutionOutcome)
    where
        F: FeatureLike + ?Sized,
    {
        let Some(geometry) = feature.geometry() else {
            return (default_style.clone(), ResolutionOutcome::NoGeometry);
        };

        let Some(index) = self.find_match(feature) else {
            return (default_style.clone(), ResolutionOutcome::Default);
        };

        let compiled = &self.styles[index];
        let style = if geometry.is_point() {
            compiled.point_style.clone()
        } else {
            compiled.shape_style.clone()
        };
        (style, ResolutionOutcome::Matched)
    }
}

/// 样式规则编译器
pub struct StyleCompiler {
    compile_version: u64,
}

impl StyleCompiler {
    pub fn new() -> Self {
        Self { compile_version: 0 }
    }

    /// 从 JSON 数组编译样式列表
    pub fn compile_from_json(&mut self, json: &str) -> Result<CompiledStyleSet> {
        let configs: Vec<FeatureStyleConfig> = serde_json::from_str(json)?;
        Ok(self.compile(configs))
    }

    /// 编译样式列表
    ///
    /// 编译不会失败：非法正则只记录告警，对应规则在评估时不匹配。
    pub fn compile(&mut self, configs: Vec<FeatureStyleConfig>) -> CompiledStyleSet {
        let mut required_properties = BTreeSet::new();
        let mut first_unconditional: Option<usize> = None;

        let styles: Vec<CompiledStyle> = configs
            .into_iter()
            .enumerate()
            .map(|(i, config)| {
                let pattern = config.rule.as_ref().and_then(|rule| {
                    if rule.is_wildcard() {
                        return None;
                    }
                    required_properties.insert(rule.property.clone());
                    if rule.operation != ComparisonOperation::Regex {
                        return None;
                    }
                    Regex::new(&rule.value)
                        .map_err(|e| {
                            warn!(
                                index = i,
                                pattern = %rule.value,
                                error = %e,
                                "样式规则的正则表达式无效，该规则不会匹配"
                            );
                        })
                        .ok()
                });

                if let Some(rule) = config
                    .rule
                    .as_ref()
                    .filter(|r| r.operation == ComparisonOperation::Unknown)
                {
                    warn!(index = i, property = %rule.property, "未知的比较操作符，该规则不会匹配");
                }

                let compiled = CompiledStyle {
                    point_style: Style::from_config(&config, Some(GeometryKind::Point)),
                    shape_style: Style::from_config(&config, Some(GeometryKind::Polygon)),
                    pattern,
                    config,
                };

                if first_unconditional.is_none() && compiled.is_unconditional() {
                    first_unconditional = Some(i);
                }

                compiled
            })
            .collect();

        if let Some(i) = first_unconditional.filter(|i| i + 1 < styles.len()) {
            debug!(
                index = i,
                unreachable = styles.len() - i - 1,
                "无条件样式之后的规则永远不会生效"
            );
        }

        self.compile_version += 1;
        record_style_set_compilation(styles.len());

        CompiledStyleSet {
            styles,
            required_properties,
            compile_version: self.compile_version,
        }
    }
}

impl Default for StyleCompiler {
    fn default() -> Self {
        Self::new()
    }
}
