//! Chart generation for expenses by category.
//!
//! Charts are built as ECharts options with `charming`. The options can be
//! written out as JSON, or wrapped in a standalone HTML page that loads
//! ECharts and renders the chart.

use charming::{
    Chart,
    component::{Legend, Title},
    element::{Orient, Tooltip, Trigger},
    series::Pie,
};
use rust_decimal::prelude::ToPrimitive;

use crate::aggregation::{CategoryTotal, DateRange};

const ECHARTS_URL: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";

/// Builds a pie chart with one slice per category.
///
/// # Arguments
/// * `totals` - Expense totals per category, e.g. from [crate::aggregation::expenses_by_category]
/// * `range` - The period the totals cover, shown as the chart's subtitle
pub fn expenses_pie_chart(totals: &[CategoryTotal], range: Option<&DateRange>) -> Chart {
    let subtext = match range {
        Some(range) => format!("{} to {}", range.start().date(), range.end().date()),
        None => "All time".to_owned(),
    };

    let data: Vec<(f64, String)> = totals
        .iter()
        .map(|total| {
            (
                total.total.to_f64().unwrap_or_default(),
                total.category.to_string(),
            )
        })
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Expenses by category")
                .subtext(subtext)
                .left("center"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .formatter("{b}: {c} ({d}%)"),
        )
        .legend(Legend::new().orient(Orient::Vertical).left("left"))
        .series(
            Pie::new()
                .name("Expenses")
                .radius("55%")
                .data(data),
        )
}

/// Wraps chart options in an HTML page that renders them with ECharts.
///
/// # Arguments
/// * `options` - The ECharts options as JSON, e.g. `chart.to_string()`
pub fn standalone_html(options: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Expenses by category</title>
<script src="{ECHARTS_URL}"></script>
</head>
<body>
<div id="chart" style="width: 100%; height: 90vh;"></div>
<script>
(function() {{
    const chart = echarts.init(document.getElementById("chart"));
    chart.setOption({options});
    window.addEventListener('resize', chart.resize);
}})();
</script>
</body>
</html>
"#
    )
}
