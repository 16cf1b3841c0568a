//! 规则评估器
//!
//! 判断单个要素是否满足单条样式规则。评估是纯函数：
//! 属性缺失、操作数无法解析、未知操作符均视为不匹配，不会返回错误。

use crate::models::{FeatureLike, PropertyValue, StyleRule, parse_number};
use crate::operators::ComparisonOperation;
use regex::Regex;
use tracing::debug;

/// 规则评估器
pub struct RuleEvaluator;

impl RuleEvaluator {
    /// 评估规则
    ///
    /// 1. `property` 为空字符串时无条件匹配
    /// 2. 要素缺少该属性时不匹配
    /// 3. 按操作符比较属性值与规则值
    pub fn matches<F>(rule: &StyleRule, feature: &F) -> bool
    where
        F: FeatureLike + ?Sized,
    {
        Self::evaluate(rule, feature, |s| Self::regex_match(s, &rule.value))
    }

    /// 使用预编译的正则评估规则
    ///
    /// `pattern` 为 None 表示规则值不是合法正则，regex 操作不匹配。
    pub fn matches_with_pattern<F>(rule: &StyleRule, feature: &F, pattern: Option<&Regex>) -> bool
    where
        F: FeatureLike + ?Sized,
    {
        Self::evaluate(rule, feature, |s| pattern.is_some_and(|re| re.is_match(s)))
    }

    fn evaluate<F, R>(rule: &StyleRule, feature: &F, regex: R) -> bool
    where
        F: FeatureLike + ?Sized,
        R: FnOnce(&str) -> bool,
    {
        if rule.is_wildcard() {
            return true;
        }

        // 属性不存在时不匹配，不做默认值转换
        let Some(value) = feature.property(&rule.property) else {
            return false;
        };

        match rule.operation {
            ComparisonOperation::Eq => Self::eq(value, &rule.value),
            ComparisonOperation::Neq => !Self::eq(value, &rule.value),
            ComparisonOperation::Gt => Self::compare(value, &rule.value, |a, b| a > b),
            ComparisonOperation::Gte => Self::compare(value, &rule.value, |a, b| a >= b),
            ComparisonOperation::Lt => Self::compare(value, &rule.value, |a, b| a < b),
            ComparisonOperation::Lte => Self::compare(value, &rule.value, |a, b| a <= b),
            ComparisonOperation::Regex => regex(&value.to_canonical_string()),
            ComparisonOperation::Unknown => false,
        }
    }

    /// 相等比较：双方统一为规范字符串后精确比较（区分大小写）
    fn eq(field: &PropertyValue, expected: &str) -> bool {
        field.to_canonical_string() == expected
    }

    /// 数值比较：任一方无法解析为数值时不匹配
    fn compare<C>(field: &PropertyValue, expected: &str, cmp: C) -> bool
    where
        C: Fn(f64, f64) -> bool,
    {
        match (field.as_number(), parse_number(expected)) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => false,
        }
    }

    /// 正则表达式匹配（每次调用编译，需要复用时使用 StyleCompiler）
    fn regex_match(s: &str, pattern: &str) -> bool {
        match Regex::new(pattern) {
            Ok(re) => re.is_match(s),
            Err(e) => {
                debug!(pattern = %pattern, error = %e, "无效的正则表达式，按不匹配处理");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, GeometryKind};

    fn rule(property: &str, operation: ComparisonOperation, value: &str) -> StyleRule {
        StyleRule::new(property, operation, value)
    }

    fn feature_with(key: &str, value: impl Into<PropertyValue>) -> Feature {
        Feature::new(GeometryKind::Point).with_property(key, value)
    }

    #[test]
    fn test_wildcard_matches_anything() {
        let wildcard = rule("", ComparisonOperation::Gt, "not a number");
        assert!(RuleEvaluator::matches(&wildcard, &Feature::new(GeometryKind::Polygon)));
        assert!(RuleEvaluator::matches(&wildcard, &feature_with("p", 1)));
        assert!(RuleEvaluator::matches(&wildcard, &Feature::without_geometry()));
    }

    #[test]
    fn test_missing_property() {
        let feature = feature_with("other", "x");
        for op in [
            ComparisonOperation::Eq,
            ComparisonOperation::Neq,
            ComparisonOperation::Gt,
            ComparisonOperation::Lte,
            ComparisonOperation::Regex,
        ] {
            assert!(!RuleEvaluator::matches(&rule("p", op, "x"), &feature), "{}", op);
        }
    }

    #[test]
    fn test_eq_string_normalized() {
        let eq5 = rule("p", ComparisonOperation::Eq, "5");
        assert!(RuleEvaluator::matches(&eq5, &feature_with("p", 5)));
        assert!(RuleEvaluator::matches(&eq5, &feature_with("p", 5.0)));
        assert!(RuleEvaluator::matches(&eq5, &feature_with("p", "5")));
        assert!(!RuleEvaluator::matches(&eq5, &feature_with("p", 6)));
    }

    #[test]
    fn test_eq_is_case_sensitive() {
        let eq = rule("type", ComparisonOperation::Eq, "airport");
        assert!(RuleEvaluator::matches(&eq, &feature_with("type", "airport")));
        assert!(!RuleEvaluator::matches(&eq, &feature_with("type", "Airport")));
        // 字符串比较不做数值归一化
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Eq, "5.0"), &feature_with("p", 5)));
    }

    #[test]
    fn test_eq_bool() {
        let eq = rule("open", ComparisonOperation::Eq, "true");
        assert!(RuleEvaluator::matches(&eq, &feature_with("open", true)));
        assert!(!RuleEvaluator::matches(&eq, &feature_with("open", false)));
    }

    #[test]
    fn test_neq() {
        let neq = rule("type", ComparisonOperation::Neq, "airport");
        assert!(RuleEvaluator::matches(&neq, &feature_with("type", "seaport")));
        assert!(!RuleEvaluator::matches(&neq, &feature_with("type", "airport")));
    }

    #[test]
    fn test_numeric_comparisons() {
        let f = feature_with("p", 100);
        assert!(RuleEvaluator::matches(&rule("p", ComparisonOperation::Gt, "50"), &f));
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Gt, "100"), &f));
        assert!(RuleEvaluator::matches(&rule("p", ComparisonOperation::Gte, "100"), &f));
        assert!(RuleEvaluator::matches(&rule("p", ComparisonOperation::Lt, "100.5"), &f));
        assert!(RuleEvaluator::matches(&rule("p", ComparisonOperation::Lte, "100"), &f));
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Lt, "-1"), &f));
    }

    #[test]
    fn test_numeric_comparison_parses_string_property() {
        let f = feature_with("population", "8336817");
        assert!(RuleEvaluator::matches(&rule("population", ComparisonOperation::Gt, "1000000"), &f));
    }

    #[test]
    fn test_ordered_with_non_numeric_operand() {
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Gt, "abc"), &feature_with("p", 5)));
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Lt, "10"), &feature_with("p", "abc")));
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Gte, "1"), &feature_with("p", true)));
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Lte, ""), &feature_with("p", 0)));
    }

    #[test]
    fn test_regex() {
        let re = rule("iata", ComparisonOperation::Regex, "^S[A-Z]{2}$");
        assert!(RuleEvaluator::matches(&re, &feature_with("iata", "SFO")));
        assert!(!RuleEvaluator::matches(&re, &feature_with("iata", "LAX")));
    }

    #[test]
    fn test_invalid_regex_is_non_match() {
        let re = rule("iata", ComparisonOperation::Regex, "[invalid");
        assert!(!RuleEvaluator::matches(&re, &feature_with("iata", "[invalid")));
    }

    #[test]
    fn test_precompiled_pattern() {
        let re = rule("iata", ComparisonOperation::Regex, "^S");
        let pattern = Regex::new("^S").unwrap();
        let f = feature_with("iata", "SEA");
        assert!(RuleEvaluator::matches_with_pattern(&re, &f, Some(&pattern)));
        assert!(!RuleEvaluator::matches_with_pattern(&re, &f, None));
    }

    #[test]
    fn test_unknown_operation_is_non_match() {
        let unknown = rule("p", ComparisonOperation::Unknown, "5");
        assert!(!RuleEvaluator::matches(&unknown, &feature_with("p", 5)));
    }

    #[test]
    fn test_lowercase_infinity_is_non_numeric() {
        let feature = feature_with("p", 5);
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Lt, "inf"), &feature));
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Gt, "-infinity"), &feature));
        assert!(RuleEvaluator::matches(&rule("p", ComparisonOperation::Lt, "Infinity"), &feature));
    }

    #[test]
    fn test_large_numbers_compare_as_plain_digits() {
        let feature = feature_with("p", 1e21);
        assert!(RuleEvaluator::matches(
            &rule("p", ComparisonOperation::Eq, "1000000000000000000000"),
            &feature
        ));
        assert!(!RuleEvaluator::matches(&rule("p", ComparisonOperation::Eq, "1e+21"), &feature));
        // 有序比较按数值进行，不受字符串形式影响
        assert!(RuleEvaluator::matches(&rule("p", ComparisonOperation::Gte, "1e+21"), &feature));
    }
}
