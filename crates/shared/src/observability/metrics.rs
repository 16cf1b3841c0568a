//! 指标模块
//!
//! 基于 metrics facade 记录样式解析相关指标。
//! 未安装 recorder 时所有记录均为空操作。

/// 注册指标描述
pub fn describe_metrics() {
    metrics::describe_counter!(
        "geomap_style_resolutions_total",
        "Total number of feature style resolutions"
    );
    metrics::describe_histogram!(
        "geomap_style_resolution_duration_seconds",
        "Feature style resolution duration in seconds"
    );
    metrics::describe_counter!(
        "geomap_style_cache_lookups_total",
        "Total number of style cache lookups"
    );
    metrics::describe_counter!(
        "geomap_style_set_compilations_total",
        "Total number of style rule list compilations"
    );
    metrics::describe_histogram!(
        "geomap_style_set_rule_count",
        "Number of style rules per compiled rule list"
    );
}

/// 记录样式解析
///
/// `outcome` 取值：matched / default / no_geometry
#[inline]
pub fn record_style_resolution(layer: &str, outcome: &str, duration_secs: f64) {
    metrics::counter!(
        "geomap_style_resolutions_total",
        "layer" => layer.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);

    metrics::histogram!(
        "geomap_style_resolution_duration_seconds",
        "layer" => layer.to_string()
    )
    .record(duration_secs);
}

/// 记录样式缓存查询
#[inline]
pub fn record_style_cache_lookup(hit: bool) {
    metrics::counter!(
        "geomap_style_cache_lookups_total",
        "hit" => hit.to_string()
    )
    .increment(1);
}

/// 记录规则列表编译
#[inline]
pub fn record_style_set_compilation(rule_count: usize) {
    metrics::counter!("geomap_style_set_compilations_total").increment(1);
    metrics::histogram!("geomap_style_set_rule_count").record(rule_count as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 即使没有初始化 recorder，这些函数也不应该 panic
        describe_metrics();
        record_style_resolution("airports", "matched", 0.0001);
        record_style_resolution("airports", "default", 0.0001);
        record_style_cache_lookup(true);
        record_style_cache_lookup(false);
        record_style_set_compilation(3);
    }
}
