use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

use crate::commands::{render, CommandError};
use crate::config::ReportConfig;
use crate::evaluation::evaluate_all;
use crate::ingest::load_file;
use crate::models::EvaluatedRecord;
use crate::trends::{
  compute_delta, compute_y_range, format_delta, generate_ticks, is_chronological, zone_color,
  zones_for, MetricKey, MetricTrend, ReferenceZone, YRange,
};

const TICK_COUNT: usize = 5;

/// A metric trend plus everything needed to chart it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendChart {
  #[serde(flatten)]
  pub trend: MetricTrend,
  pub zones: Vec<ReferenceZone>,
  /// Zone colour for each trend point
  pub point_colors: Vec<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub y_range: Option<YRange>,
  pub ticks: Vec<f64>,
}

impl TrendChart {
  /// Zones are resolved for the subject as of the latest visit
  pub fn compute(history: &[EvaluatedRecord], key: MetricKey) -> Option<Self> {
    let trend = MetricTrend::compute(history, key)?;
    let latest = &history.last()?.record;
    let zones = zones_for(key, latest.gender, latest.age);

    let values: Vec<f64> = trend.trend.iter().map(|p| p.value).collect();
    let point_colors = values.iter().map(|v| zone_color(*v, &zones)).collect();
    let y_range = compute_y_range(&values, &zones);
    let ticks = y_range
      .map(|r| generate_ticks(r.min, r.max, TICK_COUNT))
      .unwrap_or_default();

    Some(Self {
      trend,
      zones,
      point_colors,
      y_range,
      ticks,
    })
  }
}

/// Charts for one metric, or for every metric when `metric` is None
pub fn trend_charts(history: &[EvaluatedRecord], metric: Option<MetricKey>) -> Vec<TrendChart> {
  is_chronological(history);

  let keys: Vec<MetricKey> = match metric {
    Some(key) => vec![key],
    None => MetricKey::ALL.to_vec(),
  };
  keys
    .into_iter()
    .filter_map(|key| TrendChart::compute(history, key))
    .collect()
}

pub fn render_text(charts: &[TrendChart]) -> String {
  let mut out = String::new();
  for chart in charts {
    let t = &chart.trend;
    let decimals = t.key.decimals();
    let series = t
      .trend
      .iter()
      .map(|p| format!("{:.*}", decimals, p.value))
      .collect::<Vec<_>>()
      .join(" → ");

    let change = match (compute_delta(t.current, t.previous), t.change_percent) {
      (Some(delta), Some(pct)) if delta != 0.0 => format!(
        "  {} ({:+.1}%)",
        format_delta(t.key.as_str(), delta, t.key.delta_decimals(delta)),
        pct
      ),
      _ => String::new(),
    };
    let unit = if t.unit.is_empty() {
      String::new()
    } else {
      format!(" ({})", t.unit)
    };
    // Writing to a String cannot fail
    let _ = writeln!(out, "{}{}: {}{}", t.name, unit, series, change);
  }
  out
}

pub fn run(config: &ReportConfig, path: &Path, metric: Option<&str>) -> Result<String, CommandError> {
  let metric = metric
    .map(|m| m.parse::<MetricKey>().map_err(CommandError::InvalidArgument))
    .transpose()?;

  let records = load_file(path, config.reference_date)?;
  let history = evaluate_all(&records);
  let charts = trend_charts(&history, metric);

  render(config.format, &charts, |charts| render_text(charts))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::visit_history;
  use crate::trends::{GREEN, RED, YELLOW};

  fn history() -> Vec<EvaluatedRecord> {
    evaluate_all(&visit_history())
  }

  #[test]
  fn test_single_metric_chart() {
    let charts = trend_charts(&history(), Some(MetricKey::VisceralFat));

    assert_eq!(charts.len(), 1);
    let chart = &charts[0];
    assert_eq!(chart.trend.trend.len(), 3);
    // 11 → 8 → 5 across the visceral zones
    assert_eq!(chart.point_colors, vec![YELLOW, GREEN, GREEN]);
    assert!(!chart.ticks.is_empty());
  }

  #[test]
  fn test_all_metrics() {
    let charts = trend_charts(&history(), None);
    assert_eq!(charts.len(), MetricKey::ALL.len());

    // Metrics without zones still chart
    let weight = charts.iter().find(|c| c.trend.key == MetricKey::Weight).unwrap();
    assert!(weight.zones.is_empty());
    assert!(weight.y_range.is_some());
  }

  #[test]
  fn test_empty_history() {
    assert!(trend_charts(&[], None).is_empty());
  }

  #[test]
  fn test_text_output() {
    let charts = trend_charts(&history(), Some(MetricKey::Weight));
    crate::assert_approx_eq!(charts[0].trend.change_percent.unwrap(), -4.3478, 0.001);

    let text = render_text(&charts);
    assert_eq!(text, "Vikt (kg): 72.0 → 69.0 → 66.0  ▲ -3.0 (-4.3%)\n");
  }

  #[test]
  fn test_noise_level_change_has_no_delta() {
    let mut records = visit_history();
    records[1].body_composition.weight = 66.0;
    records[2].body_composition.weight = 66.0004;
    let charts = trend_charts(&evaluate_all(&records), Some(MetricKey::Weight));

    assert_eq!(charts[0].trend.is_improvement, None);
    let text = render_text(&charts);
    assert_eq!(text, "Vikt (kg): 72.0 → 66.0 → 66.0\n");
    assert!(!text.contains('▲') && !text.contains('▼'));
  }

  #[test]
  fn test_sub_unit_change_keeps_a_decimal() {
    let mut records = visit_history();
    records[1].blood_work.hb = 132.6;
    let charts = trend_charts(&evaluate_all(&records), Some(MetricKey::Hb));

    assert_eq!(render_text(&charts), "Hemoglobin (g/L): 119 → 133 → 133  ▲ +0.4 (+0.3%)\n");
  }

  #[test]
  fn test_hb_points_use_blood_zones() {
    let charts = trend_charts(&history(), Some(MetricKey::Hb));
    // 119 sits in the lower yellow band, 126 and 133 in green
    assert_eq!(charts[0].point_colors, vec![YELLOW, GREEN, GREEN]);
    assert!(!charts[0].point_colors.contains(&RED));
  }

  #[test]
  fn test_unknown_metric_argument() {
    let config = ReportConfig::default();
    let err = run(&config, Path::new("/unused.json"), Some("cholesterol")).unwrap_err();
    assert!(matches!(err, CommandError::InvalidArgument(_)));
  }
}
