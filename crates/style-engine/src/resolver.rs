//! 样式解析器
//!
//! 按配置顺序为要素选择样式：首条匹配生效，其后的规则不再评估；
//! 无几何或无匹配时返回默认样式。

use crate::evaluator::RuleEvaluator;
use crate::models::{FeatureLike, FeatureStyleConfig};
use crate::style::Style;
use serde::Serialize;

/// 解析结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    /// 某条样式配置匹配
    Matched,
    /// 无配置匹配，使用默认样式
    Default,
    /// 要素无几何，使用默认样式
    NoGeometry,
}

impl ResolutionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Default => "default",
            Self::NoGeometry => "no_geometry",
        }
    }
}

/// 带追踪信息的解析结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub style: Style,
    pub outcome: ResolutionOutcome,
    /// 匹配的配置下标
    pub matched_index: Option<usize>,
    pub evaluation_trace: Vec<String>,
}

/// 样式解析器
pub struct StyleResolver;

impl StyleResolver {
    /// 解析要素样式
    pub fn resolve_style<F>(
        configs: &[FeatureStyleConfig],
        feature: &F,
        default_style: &Style,
    ) -> Style
    where
        F: FeatureLike + ?Sized,
    {
        match Self::find_match(configs, feature, None) {
            (ResolutionOutcome::Matched, Some(index)) => {
                Style::from_config(&configs[index], feature.geometry())
            }
            _ => default_style.clone(),
        }
    }

    /// 解析要素样式并记录每一步的评估追踪
    pub fn resolve_with_trace<F>(
        configs: &[FeatureStyleConfig],
        feature: &F,
        default_style: &Style,
    ) -> Resolution
    where
        F: FeatureLike + ?Sized,
    {
        let mut evaluation_trace = Vec::new();
        let (outcome, matched_index) = Self::find_match(configs, feature, Some(&mut evaluation_trace));

        let style = match matched_index {
            Some(index) => Style::from_config(&configs[index], feature.geometry()),
            None => default_style.clone(),
        };

        Resolution {
            style,
            outcome,
            matched_index,
            evaluation_trace,
        }
    }

    /// 返回首条匹配的配置下标
    fn find_match<F>(
        configs: &[FeatureStyleConfig],
        feature: &F,
        mut evaluation_trace: Option<&mut Vec<String>>,
    ) -> (ResolutionOutcome, Option<usize>)
    where
        F: FeatureLike + ?Sized,
    {
        if feature.geometry().is_none() {
            if let Some(t) = evaluation_trace.as_deref_mut() {
                t.push("feature has no geometry => DEFAULT".to_string());
            }
            return (ResolutionOutcome::NoGeometry, None);
        }

        for (i, config) in configs.iter().enumerate() {
            let matched = match &config.rule {
                None => true,
                Some(rule) => RuleEvaluator::matches(rule, feature),
            };

            if let Some(t) = evaluation_trace.as_deref_mut() {
                let rule_desc = match &config.rule {
                    None => "<no rule>".to_string(),
                    Some(rule) if rule.is_wildcard() => "<any>".to_string(),
                    Some(rule) => format!("{} {} {}", rule.property, rule.operation, rule.value),
                };
                t.push(format!(
                    "styles[{}]: {} => {}",
                    i,
                    rule_desc,
                    if matched { "MATCHED" } else { "NOT_MATCHED" }
                ));
            }

            if matched {
                return (ResolutionOutcome::Matched, Some(i));
            }
        }

        if let Some(t) = evaluation_trace.as_deref_mut() {
            t.push(format!("no match in {} styles => DEFAULT", configs.len()));
        }
        (ResolutionOutcome::Default, None)
    }
}
