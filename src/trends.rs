//! Visit-over-visit deltas and trend series
//!
//! Histories are handed in oldest-first by the caller; nothing here sorts.
//! "Previous" always means the entry immediately before in that order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::evaluation::{ldl_hdl_ratio, tc_hdl_ratio};
use crate::models::{EvaluatedRecord, Gender, RiskLevel, DEFAULT_AGE};
use crate::norms;
use crate::reference::{resolve_range, BloodMetric};

/// Changes smaller than this are float noise and reported as zero
pub const DELTA_EPSILON: f64 = 0.001;

/// Metric keys where a decrease is an improvement. Every other key,
/// including unknown ones, improves upwards.
pub const LOWER_IS_BETTER: [&str; 10] = [
  "weight",
  "bodyFat",
  "visceralFat",
  "ldl",
  "triglycerides",
  "glucose",
  "tcHdlRatio",
  "systolic",
  "diastolic",
  "stress",
];

pub const NEUTRAL_COLOR: &str = "#9A9488";
pub const IMPROVED_COLOR: &str = "#8FB3A3";
pub const REGRESSED_COLOR: &str = "#C4A47C";

/// ---------------------------------------------------------------------------
/// Deltas
/// ---------------------------------------------------------------------------

/// `current - previous`, None without a previous value
pub fn compute_delta(current: f64, previous: Option<f64>) -> Option<f64> {
  let previous = previous?;
  let delta = current - previous;
  if delta.abs() < DELTA_EPSILON {
    Some(0.0)
  } else {
    Some(delta)
  }
}

pub fn is_improvement(metric_key: &str, delta: f64) -> bool {
  if LOWER_IS_BETTER.contains(&metric_key) {
    delta < 0.0
  } else {
    delta > 0.0
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaResult {
  pub metric: String,
  pub delta: f64,
  pub is_improvement: bool,
}

impl DeltaResult {
  pub fn compute(metric_key: &str, current: f64, previous: Option<f64>) -> Option<Self> {
    let delta = compute_delta(current, previous)?;
    Some(Self {
      metric: metric_key.to_string(),
      delta,
      is_improvement: is_improvement(metric_key, delta),
    })
  }
}

/// "▲ +1.0" style label. The arrow shows improvement, the sign direction.
pub fn format_delta(metric_key: &str, delta: f64, decimals: usize) -> String {
  let arrow = if is_improvement(metric_key, delta) { "▲" } else { "▼" };
  let sign = if delta > 0.0 { "+" } else { "" };
  format!("{} {}{:.*}", arrow, sign, decimals, delta)
}

pub fn delta_color(metric_key: &str, delta: f64) -> &'static str {
  if delta == 0.0 {
    NEUTRAL_COLOR
  } else if is_improvement(metric_key, delta) {
    IMPROVED_COLOR
  } else {
    REGRESSED_COLOR
  }
}

/// ---------------------------------------------------------------------------
/// Metric Keys
/// ---------------------------------------------------------------------------

/// Every numeric field a report or chart can track over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricKey {
  Weight,
  BodyFat,
  MuscleMass,
  VisceralFat,
  Systolic,
  Diastolic,
  Vo2Max,
  GripStrength,
  Hb,
  Glucose,
  Ldl,
  Hdl,
  Triglycerides,
  TcHdlRatio,
  LdlHdlRatio,
  Sleep,
  Diet,
  Stress,
  Relationships,
  Smoking,
  Balance,
  Exercise,
  Alcohol,
}

impl MetricKey {
  pub const ALL: [MetricKey; 23] = [
    MetricKey::Weight,
    MetricKey::BodyFat,
    MetricKey::MuscleMass,
    MetricKey::VisceralFat,
    MetricKey::Systolic,
    MetricKey::Diastolic,
    MetricKey::Vo2Max,
    MetricKey::GripStrength,
    MetricKey::Hb,
    MetricKey::Glucose,
    MetricKey::Ldl,
    MetricKey::Hdl,
    MetricKey::Triglycerides,
    MetricKey::TcHdlRatio,
    MetricKey::LdlHdlRatio,
    MetricKey::Sleep,
    MetricKey::Diet,
    MetricKey::Stress,
    MetricKey::Relationships,
    MetricKey::Smoking,
    MetricKey::Balance,
    MetricKey::Exercise,
    MetricKey::Alcohol,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      MetricKey::Weight => "weight",
      MetricKey::BodyFat => "bodyFat",
      MetricKey::MuscleMass => "muscleMass",
      MetricKey::VisceralFat => "visceralFat",
      MetricKey::Systolic => "systolic",
      MetricKey::Diastolic => "diastolic",
      MetricKey::Vo2Max => "vo2Max",
      MetricKey::GripStrength => "gripStrength",
      MetricKey::Hb => "hb",
      MetricKey::Glucose => "glucose",
      MetricKey::Ldl => "ldl",
      MetricKey::Hdl => "hdl",
      MetricKey::Triglycerides => "triglycerides",
      MetricKey::TcHdlRatio => "tcHdlRatio",
      MetricKey::LdlHdlRatio => "ldlHdlRatio",
      MetricKey::Sleep => "sleep",
      MetricKey::Diet => "diet",
      MetricKey::Stress => "stress",
      MetricKey::Relationships => "relationships",
      MetricKey::Smoking => "smoking",
      MetricKey::Balance => "balance",
      MetricKey::Exercise => "exercise",
      MetricKey::Alcohol => "alcohol",
    }
  }

  /// Swedish display label
  pub fn label(&self) -> &'static str {
    match self {
      MetricKey::Weight => "Vikt",
      MetricKey::BodyFat => "Kroppsfett",
      MetricKey::MuscleMass => "Muskelmassa",
      MetricKey::VisceralFat => "Visceralt fett",
      MetricKey::Systolic => "Systoliskt",
      MetricKey::Diastolic => "Diastoliskt",
      MetricKey::Vo2Max => "VO\u{2082} Max",
      MetricKey::GripStrength => "Greppstyrka",
      MetricKey::Hb => "Hemoglobin",
      MetricKey::Glucose => "Glukos",
      MetricKey::Ldl => "LDL",
      MetricKey::Hdl => "HDL",
      MetricKey::Triglycerides => "Triglycerider",
      MetricKey::TcHdlRatio => "TC/HDL Kvot",
      MetricKey::LdlHdlRatio => "LDL/HDL Kvot",
      MetricKey::Sleep => "Sömn",
      MetricKey::Diet => "Kost",
      MetricKey::Stress => "Stress",
      MetricKey::Relationships => "Relationer",
      MetricKey::Smoking => "Rökning",
      MetricKey::Balance => "Balans",
      MetricKey::Exercise => "Träning",
      MetricKey::Alcohol => "Alkohol",
    }
  }

  pub fn unit(&self) -> &'static str {
    match self {
      MetricKey::Weight | MetricKey::GripStrength => "kg",
      MetricKey::BodyFat | MetricKey::MuscleMass => "%",
      MetricKey::Systolic | MetricKey::Diastolic => "mmHg",
      MetricKey::Vo2Max => "ml/min/kg",
      MetricKey::Hb => "g/L",
      MetricKey::Glucose | MetricKey::Ldl | MetricKey::Hdl | MetricKey::Triglycerides => "mmol/L",
      MetricKey::VisceralFat => "/20",
      MetricKey::TcHdlRatio | MetricKey::LdlHdlRatio => "",
      _ => "/10",
    }
  }

  /// Decimals shown for values and deltas
  pub fn decimals(&self) -> usize {
    match self {
      MetricKey::VisceralFat
      | MetricKey::Systolic
      | MetricKey::Diastolic
      | MetricKey::GripStrength
      | MetricKey::Hb => 0,
      k if k.is_lifestyle() => 0,
      _ => 1,
    }
  }

  /// Decimals for a delta label. Whole-number measurements show a
  /// sub-unit change with one decimal; ratings stay whole.
  pub fn delta_decimals(&self, delta: f64) -> usize {
    let decimals = self.decimals();
    if decimals == 0 && !self.is_lifestyle() && (delta - delta.round()).abs() >= DELTA_EPSILON {
      1
    } else {
      decimals
    }
  }

  pub fn is_lifestyle(&self) -> bool {
    matches!(
      self,
      MetricKey::Sleep
        | MetricKey::Diet
        | MetricKey::Stress
        | MetricKey::Relationships
        | MetricKey::Smoking
        | MetricKey::Balance
        | MetricKey::Exercise
        | MetricKey::Alcohol
    )
  }

  pub fn lower_is_better(&self) -> bool {
    LOWER_IS_BETTER.contains(&self.as_str())
  }

  /// Value of this metric on a record; ratios go through the derived
  /// calculator so supplied lab values win
  pub fn value(&self, e: &EvaluatedRecord) -> f64 {
    let r = &e.record;
    match self {
      MetricKey::Weight => r.body_composition.weight,
      MetricKey::BodyFat => r.body_composition.body_fat,
      MetricKey::MuscleMass => r.body_composition.muscle_mass,
      MetricKey::VisceralFat => r.body_composition.visceral_fat,
      MetricKey::Systolic => r.blood_pressure.systolic,
      MetricKey::Diastolic => r.blood_pressure.diastolic,
      MetricKey::Vo2Max => r.fitness.vo2_max,
      MetricKey::GripStrength => r.fitness.grip_strength,
      MetricKey::Hb => r.blood_work.hb,
      MetricKey::Glucose => r.blood_work.glucose,
      MetricKey::Ldl => r.blood_work.ldl,
      MetricKey::Hdl => r.blood_work.hdl,
      MetricKey::Triglycerides => r.blood_work.triglycerides,
      MetricKey::TcHdlRatio => tc_hdl_ratio(&r.blood_work),
      MetricKey::LdlHdlRatio => ldl_hdl_ratio(&r.blood_work),
      MetricKey::Sleep => r.lifestyle.sleep as f64,
      MetricKey::Diet => r.lifestyle.diet as f64,
      MetricKey::Stress => r.lifestyle.stress as f64,
      MetricKey::Relationships => r.lifestyle.relationships as f64,
      MetricKey::Smoking => r.lifestyle.smoking as f64,
      MetricKey::Balance => r.lifestyle.balance as f64,
      MetricKey::Exercise => r.lifestyle.exercise as f64,
      MetricKey::Alcohol => r.lifestyle.alcohol as f64,
    }
  }

  /// Individually tracked risk, when this metric has one
  pub fn risk(&self, e: &EvaluatedRecord) -> Option<RiskLevel> {
    match self {
      MetricKey::Systolic | MetricKey::Diastolic => Some(e.metric_risks.blood_pressure),
      k => e.metric_risks.get(k.as_str()),
    }
  }

  pub fn blood_metric(&self) -> Option<BloodMetric> {
    match self {
      MetricKey::Hb => Some(BloodMetric::Hb),
      MetricKey::Glucose => Some(BloodMetric::Glucose),
      MetricKey::Ldl => Some(BloodMetric::Ldl),
      MetricKey::Hdl => Some(BloodMetric::Hdl),
      MetricKey::Triglycerides => Some(BloodMetric::Triglycerides),
      MetricKey::TcHdlRatio => Some(BloodMetric::TcHdlRatio),
      MetricKey::LdlHdlRatio => Some(BloodMetric::LdlHdlRatio),
      _ => None,
    }
  }
}

impl std::fmt::Display for MetricKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for MetricKey {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    MetricKey::ALL
      .into_iter()
      .find(|k| k.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("Unknown metric: {}", s))
  }
}

/// Deltas for every tracked metric between two evaluated records.
/// Empty when there is no previous record.
pub fn compare_records(current: &EvaluatedRecord, previous: Option<&EvaluatedRecord>) -> Vec<DeltaResult> {
  let previous = match previous {
    Some(p) => p,
    None => return Vec::new(),
  };

  MetricKey::ALL
    .iter()
    .filter_map(|key| DeltaResult::compute(key.as_str(), key.value(current), Some(key.value(previous))))
    .collect()
}

/// True when dates never decrease. Histories that fail this are still
/// processed as given.
pub fn is_chronological(entries: &[EvaluatedRecord]) -> bool {
  let ordered = entries.windows(2).all(|w| w[0].record.date <= w[1].record.date);
  if !ordered {
    warn!(count = entries.len(), "history is not sorted oldest-first; deltas follow input order");
  }
  ordered
}

/// ---------------------------------------------------------------------------
/// Trend Series
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
  pub date: NaiveDate,
  pub value: f64,
}

pub fn extract_series<F>(entries: &[EvaluatedRecord], value: F) -> Vec<DataPoint>
where
  F: Fn(&EvaluatedRecord) -> f64,
{
  entries
    .iter()
    .map(|e| DataPoint {
      date: e.record.date,
      value: value(e),
    })
    .collect()
}

pub fn metric_series(entries: &[EvaluatedRecord], key: MetricKey) -> Vec<DataPoint> {
  extract_series(entries, |e| key.value(e))
}

/// Latest-vs-previous summary of one metric over a history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTrend {
  pub key: MetricKey,
  pub name: String,
  pub unit: String,
  pub current: f64,
  pub previous: Option<f64>,
  pub trend: Vec<DataPoint>,
  pub change_percent: Option<f64>,
  pub is_improvement: Option<bool>,
}

impl MetricTrend {
  /// None for an empty history
  pub fn compute(entries: &[EvaluatedRecord], key: MetricKey) -> Option<Self> {
    let trend = metric_series(entries, key);
    let current = trend.last()?.value;
    let previous = trend.len().checked_sub(2).map(|i| trend[i].value);

    let delta = compute_delta(current, previous);
    let change_percent = match (delta, previous) {
      (Some(d), Some(p)) if p != 0.0 => Some(d / p.abs() * 100.0),
      _ => None,
    };
    let is_improvement = delta
      .filter(|d| *d != 0.0)
      .map(|d| is_improvement(key.as_str(), d));

    Some(Self {
      key,
      name: key.label().to_string(),
      unit: key.unit().to_string(),
      current,
      previous,
      trend,
      change_percent,
      is_improvement,
    })
  }
}

/// ---------------------------------------------------------------------------
/// Reference Zones
/// ---------------------------------------------------------------------------

pub const RED: &str = "#C87979";
pub const YELLOW: &str = "#C4A47C";
pub const GREEN: &str = "#8FB3A3";

const RED_OPACITY: f64 = 0.15;
const YELLOW_OPACITY: f64 = 0.18;
const GREEN_OPACITY: f64 = 0.22;

/// Coloured background band for a chart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceZone {
  pub low: f64,
  pub high: f64,
  pub color: &'static str,
  pub opacity: f64,
}

impl ReferenceZone {
  fn red(low: f64, high: f64) -> Self {
    Self { low, high, color: RED, opacity: RED_OPACITY }
  }

  fn yellow(low: f64, high: f64) -> Self {
    Self { low, high, color: YELLOW, opacity: YELLOW_OPACITY }
  }

  fn green(low: f64, high: f64) -> Self {
    Self { low, high, color: GREEN, opacity: GREEN_OPACITY }
  }
}

pub fn lifestyle_zones() -> Vec<ReferenceZone> {
  vec![
    ReferenceZone::red(0.0, 4.0),
    ReferenceZone::yellow(4.0, 8.0),
    ReferenceZone::green(8.0, 10.0),
  ]
}

/// Zones derived from the resolved reference range, so chart colours and
/// classification always agree
pub fn blood_ref_zones(metric: BloodMetric, gender: Option<Gender>, age: Option<u32>) -> Vec<ReferenceZone> {
  let range = resolve_range(metric, gender, age);
  let mut zones = Vec::with_capacity(5);

  if range.yellow_low > 0.0 {
    zones.push(ReferenceZone::red(range.yellow_low * 0.7, range.yellow_low));
  }
  if range.yellow_low < range.green_low {
    zones.push(ReferenceZone::yellow(range.yellow_low, range.green_low));
  }
  match range.green_high {
    Some(high) => zones.push(ReferenceZone::green(range.green_low, high)),
    // Open upwards (HDL): draw three times the lower bound
    None => zones.push(ReferenceZone::green(range.green_low, range.green_low * 3.0)),
  }
  if let (Some(green_high), Some(yellow_high)) = (range.green_high, range.yellow_high) {
    if yellow_high > green_high {
      zones.push(ReferenceZone::yellow(green_high, yellow_high));
    }
  }
  if let Some(yellow_high) = range.yellow_high {
    zones.push(ReferenceZone::red(yellow_high, yellow_high * 1.3));
  }

  zones
}

pub fn body_fat_zones(gender: Option<Gender>) -> Vec<ReferenceZone> {
  match gender.unwrap_or_default() {
    Gender::Female => vec![
      ReferenceZone::red(0.0, 10.0),
      ReferenceZone::yellow(10.0, 18.0),
      ReferenceZone::green(18.0, 28.0),
      ReferenceZone::yellow(28.0, 35.0),
      ReferenceZone::red(35.0, 45.0),
    ],
    Gender::Male => vec![
      ReferenceZone::red(0.0, 10.0),
      ReferenceZone::green(10.0, 20.0),
      ReferenceZone::yellow(20.0, 25.0),
      ReferenceZone::red(25.0, 35.0),
    ],
  }
}

pub fn visceral_fat_zones() -> Vec<ReferenceZone> {
  vec![
    ReferenceZone::green(0.0, 9.0),
    ReferenceZone::yellow(9.0, 14.0),
    ReferenceZone::red(14.0, 20.0),
  ]
}

pub fn blood_pressure_zones() -> Vec<ReferenceZone> {
  vec![
    ReferenceZone::green(60.0, 120.0),
    ReferenceZone::yellow(120.0, 140.0),
    ReferenceZone::red(140.0, 180.0),
  ]
}

pub fn vo2_zones(gender: Option<Gender>, age: Option<u32>) -> Vec<ReferenceZone> {
  let t = norms::vo2_thresholds(
    gender.unwrap_or_default(),
    age.filter(|&a| a > 0).unwrap_or(DEFAULT_AGE),
  );
  vec![
    ReferenceZone::red(0.0, t.low),
    ReferenceZone::yellow(t.low, t.medium),
    ReferenceZone { opacity: YELLOW_OPACITY, ..ReferenceZone::green(t.medium, t.high) },
    ReferenceZone::green(t.high, t.high + 20.0),
  ]
}

/// Zones drawn behind a metric's chart, empty when it has none
pub fn zones_for(key: MetricKey, gender: Option<Gender>, age: Option<u32>) -> Vec<ReferenceZone> {
  if let Some(metric) = key.blood_metric() {
    return blood_ref_zones(metric, gender, age);
  }
  match key {
    MetricKey::BodyFat => body_fat_zones(gender),
    MetricKey::VisceralFat => visceral_fat_zones(),
    MetricKey::Systolic | MetricKey::Diastolic => blood_pressure_zones(),
    MetricKey::Vo2Max => vo2_zones(gender, age),
    k if k.is_lifestyle() => lifestyle_zones(),
    _ => Vec::new(),
  }
}

/// ---------------------------------------------------------------------------
/// Chart Axis Helpers
/// ---------------------------------------------------------------------------

pub const DEFAULT_LINE_COLOR: &str = "#004B87";

/// Colour of the zone containing `value`. Zones are scanned from last to
/// first so the later zone wins on a shared boundary.
pub fn zone_color(value: f64, zones: &[ReferenceZone]) -> &'static str {
  if zones.is_empty() {
    return DEFAULT_LINE_COLOR;
  }
  zones
    .iter()
    .rev()
    .find(|z| value >= z.low && value <= z.high)
    .map_or(NEUTRAL_COLOR, |z| z.color)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YRange {
  pub min: f64,
  pub max: f64,
}

/// Span of the values and zone bounds plus 10% padding (1.0 when flat).
/// None when there is nothing to span.
pub fn compute_y_range(values: &[f64], zones: &[ReferenceZone]) -> Option<YRange> {
  let bounds = zones.iter().flat_map(|z| [z.low, z.high]);
  let (min, max) = values
    .iter()
    .copied()
    .chain(bounds)
    .filter(|v| v.is_finite())
    .fold(None, |acc: Option<(f64, f64)>, v| match acc {
      None => Some((v, v)),
      Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;

  let span = (max - min) * 0.1;
  let pad = if span == 0.0 { 1.0 } else { span };
  Some(YRange { min: min - pad, max: max + pad })
}

/// Round-numbered ticks covering [min, max], using steps of 1, 2, 2.5, 5
/// or 10 times a power of ten
pub fn generate_ticks(min: f64, max: f64, target_count: usize) -> Vec<f64> {
  let range = max - min;
  if !(range > 0.0) || !range.is_finite() {
    return vec![min];
  }

  let raw_step = range / (target_count.max(2) - 1) as f64;
  let magnitude = 10f64.powf(raw_step.log10().floor());
  let step = [1.0, 2.0, 2.5, 5.0, 10.0]
    .iter()
    .map(|c| c * magnitude)
    .find(|s| *s >= raw_step)
    .unwrap_or(raw_step);

  let start = (min / step).floor() * step;
  let mut ticks = Vec::new();
  let mut i = 0u32;
  loop {
    let v = start + step * i as f64;
    if v > max + step * 0.01 {
      break;
    }
    if v >= min - step * 0.01 {
      ticks.push((v * 1000.0).round() / 1000.0);
    }
    i += 1;
  }
  ticks
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::evaluation::{evaluate_all, evaluate_health_data};
  use crate::test_utils::{sample_record, visit_history};
  use proptest::prelude::*;

  #[test]
  fn test_delta_without_previous() {
    assert_eq!(compute_delta(5.0, None), None);
  }

  #[test]
  fn test_delta_suppresses_float_noise() {
    assert_eq!(compute_delta(0.3, Some(0.1 + 0.2)), Some(0.0));
    assert_eq!(compute_delta(1.0005, Some(1.0)), Some(0.0));
    let d = compute_delta(72.5, Some(70.0)).unwrap();
    assert!((d - 2.5).abs() < 1e-9);
  }

  #[test]
  fn test_improvement_polarity() {
    assert!(is_improvement("weight", -1.0));
    assert!(!is_improvement("weight", 1.0));
    assert!(is_improvement("exercise", 1.0));
    assert!(!is_improvement("exercise", -1.0));

    // Not in the lower-is-better list, so higher counts as better
    assert!(is_improvement("ldlHdlRatio", 0.2));
    assert!(is_improvement("somethingNew", 0.2));
    // Zero is never an improvement
    assert!(!is_improvement("weight", 0.0));
    assert!(!is_improvement("hdl", 0.0));
  }

  #[test]
  fn test_metric_key_polarity_matches_list() {
    let lower: Vec<&str> = MetricKey::ALL
      .iter()
      .filter(|k| k.lower_is_better())
      .map(|k| k.as_str())
      .collect();
    assert_eq!(lower.len(), LOWER_IS_BETTER.len());
  }

  #[test]
  fn test_format_delta() {
    assert_eq!(format_delta("weight", -3.0, 1), "▲ -3.0");
    assert_eq!(format_delta("weight", 2.0, 1), "▼ +2.0");
    assert_eq!(format_delta("sleep", 2.0, 0), "▲ +2");
    assert_eq!(delta_color("weight", 0.0), NEUTRAL_COLOR);
    assert_eq!(delta_color("weight", -1.0), IMPROVED_COLOR);
    assert_eq!(delta_color("hdl", -0.1), REGRESSED_COLOR);
  }

  #[test]
  fn test_delta_decimals() {
    assert_eq!(MetricKey::Hb.delta_decimals(0.4), 1);
    assert_eq!(MetricKey::Hb.delta_decimals(7.0), 0);
    assert_eq!(MetricKey::Systolic.delta_decimals(-2.5), 1);
    assert_eq!(MetricKey::Weight.delta_decimals(0.4), 1);
    assert_eq!(MetricKey::Sleep.delta_decimals(2.0), 0);

    let hb = MetricKey::Hb;
    assert_eq!(format_delta(hb.as_str(), 0.4, hb.delta_decimals(0.4)), "▲ +0.4");
  }

  #[test]
  fn test_compare_records() {
    let history = evaluate_all(&visit_history());
    let deltas = compare_records(&history[2], Some(&history[1]));
    assert_eq!(deltas.len(), MetricKey::ALL.len());

    let weight = deltas.iter().find(|d| d.metric == "weight").unwrap();
    assert_eq!(weight.delta, -3.0);
    assert!(weight.is_improvement);

    assert!(compare_records(&history[0], None).is_empty());
  }

  #[test]
  fn test_chronological_check_does_not_reorder() {
    let mut history = evaluate_all(&visit_history());
    assert!(is_chronological(&history));

    history.reverse();
    assert!(!is_chronological(&history));
    let series = metric_series(&history, MetricKey::Weight);
    assert_eq!(series[0].value, 66.0);
  }

  #[test]
  fn test_metric_trend() {
    let history = evaluate_all(&visit_history());
    let trend = MetricTrend::compute(&history, MetricKey::Vo2Max).unwrap();

    assert_eq!(trend.trend.len(), 3);
    assert_eq!(trend.current, 38.0);
    assert_eq!(trend.previous, Some(34.0));
    assert_eq!(trend.is_improvement, Some(true));
    let pct = trend.change_percent.unwrap();
    assert!((pct - 11.7647).abs() < 0.001);

    assert!(MetricTrend::compute(&[], MetricKey::Vo2Max).is_none());

    let single = MetricTrend::compute(&history[..1], MetricKey::Weight).unwrap();
    assert_eq!(single.previous, None);
    assert_eq!(single.is_improvement, None);
  }

  #[test]
  fn test_ratio_series_use_supplied_values() {
    let mut record = sample_record();
    record.blood_work.tc_hdl_ratio = Some(4.1);
    let evaluated = vec![evaluate_health_data(&record)];
    assert_eq!(metric_series(&evaluated, MetricKey::TcHdlRatio)[0].value, 4.1);
  }

  #[test]
  fn test_blood_zones_follow_reference_range() {
    // Female hb: red 81.9-117, yellow 117-121, green 121-144, yellow 144-153, red 153-198.9
    let zones = blood_ref_zones(BloodMetric::Hb, Some(Gender::Female), Some(35));
    let colors: Vec<&str> = zones.iter().map(|z| z.color).collect();
    assert_eq!(colors, vec![RED, YELLOW, GREEN, YELLOW, RED]);
    assert_eq!((zones[2].low, zones[2].high), (121.0, 144.0));
    assert!((zones[0].low - 81.9).abs() < 1e-9);
    assert_eq!(zones[2].opacity, 0.22);
  }

  #[test]
  fn test_one_directional_zones() {
    // HDL: open upwards, green drawn to 3x its lower bound
    let hdl = blood_ref_zones(BloodMetric::Hdl, Some(Gender::Male), None);
    let colors: Vec<&str> = hdl.iter().map(|z| z.color).collect();
    assert_eq!(colors, vec![RED, YELLOW, GREEN]);
    assert!((hdl[2].high - 3.33).abs() < 1e-9);

    // LDL: starts at zero, no red below
    let ldl = blood_ref_zones(BloodMetric::Ldl, None, Some(55));
    let colors: Vec<&str> = ldl.iter().map(|z| z.color).collect();
    assert_eq!(colors, vec![GREEN, YELLOW, RED]);
  }

  #[test]
  fn test_vo2_zones() {
    let zones = vo2_zones(Some(Gender::Male), Some(45));
    assert_eq!(zones.len(), 4);
    assert_eq!(zones[1].low, 27.0);
    assert_eq!(zones[2].opacity, 0.18);
    assert_eq!(zones[3].high, 68.0);
  }

  #[test]
  fn test_zones_for_metric() {
    assert!(zones_for(MetricKey::Weight, None, None).is_empty());
    assert_eq!(zones_for(MetricKey::Sleep, None, None), lifestyle_zones());
    assert_eq!(zones_for(MetricKey::Diastolic, None, None), blood_pressure_zones());
    assert_eq!(
      zones_for(MetricKey::Hdl, Some(Gender::Female), None),
      blood_ref_zones(BloodMetric::Hdl, Some(Gender::Female), None)
    );
  }

  #[test]
  fn test_zone_color_prefers_later_zone_on_boundary() {
    let zones = body_fat_zones(Some(Gender::Male));
    assert_eq!(zone_color(10.0, &zones), GREEN);
    assert_eq!(zone_color(22.0, &zones), YELLOW);
    assert_eq!(zone_color(50.0, &zones), NEUTRAL_COLOR);
    assert_eq!(zone_color(50.0, &[]), DEFAULT_LINE_COLOR);
  }

  #[test]
  fn test_y_range() {
    let range = compute_y_range(&[10.0, 20.0], &[]).unwrap();
    assert_eq!(range, YRange { min: 9.0, max: 21.0 });

    let flat = compute_y_range(&[5.0, 5.0], &[]).unwrap();
    assert_eq!(flat, YRange { min: 4.0, max: 6.0 });

    let with_zones = compute_y_range(&[5.0], &visceral_fat_zones()).unwrap();
    assert_eq!(with_zones, YRange { min: -2.0, max: 22.0 });

    assert!(compute_y_range(&[], &[]).is_none());
  }

  #[test]
  fn test_ticks() {
    assert_eq!(generate_ticks(0.0, 100.0, 5), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
    assert_eq!(generate_ticks(3.0, 3.0, 5), vec![3.0]);
    assert_eq!(generate_ticks(1.0, 9.0, 5), vec![2.0, 4.0, 6.0, 8.0]);
  }

  proptest! {
    #[test]
    fn prop_delta_of_equal_values_is_zero(x in -1.0e6f64..1.0e6) {
      prop_assert_eq!(compute_delta(x, Some(x)), Some(0.0));
    }

    #[test]
    fn prop_polarity_flips_with_sign(d in 0.001f64..1000.0) {
      for key in MetricKey::ALL {
        prop_assert_ne!(is_improvement(key.as_str(), d), is_improvement(key.as_str(), -d));
      }
    }
  }
}
