//! Report assembly
//!
//! Flattens an evaluated record (and optionally the visit before it) into
//! the sections of the printed health report, then renders them as plain
//! text or JSON. Pure: the caller decides where the output goes.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;

use crate::lifestyle::{
  focus_tip, lifestyle_items, FocusArea, FocusAreaKey, FocusSelection, LifestyleHighlight, LifestyleItem,
};
use crate::models::{CategoryScores, EvaluatedRecord, Gender, RiskLevel, ScoreResult};
use crate::norms::ekblom_bak_norms;
use crate::reference::resolve_range;
use crate::trends::{compute_delta, delta_color, format_delta, is_improvement, MetricKey};

pub const FALLBACK_NAME: &str = "Klient";

const PHYSICAL_METRICS: [MetricKey; 8] = [
  MetricKey::Weight,
  MetricKey::BodyFat,
  MetricKey::MuscleMass,
  MetricKey::VisceralFat,
  MetricKey::Systolic,
  MetricKey::Diastolic,
  MetricKey::Vo2Max,
  MetricKey::GripStrength,
];

const BLOOD_METRICS: [MetricKey; 7] = [
  MetricKey::Hb,
  MetricKey::Glucose,
  MetricKey::Ldl,
  MetricKey::Hdl,
  MetricKey::Triglycerides,
  MetricKey::TcHdlRatio,
  MetricKey::LdlHdlRatio,
];

/// ---------------------------------------------------------------------------
/// Report Types
/// ---------------------------------------------------------------------------

/// Change since the previous visit, only present when non-zero
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaView {
  pub value: f64,
  pub is_improvement: bool,
  pub label: String,
  pub color: &'static str,
}

impl DeltaView {
  fn compute(key: MetricKey, current: f64, previous: Option<f64>) -> Option<Self> {
    let delta = compute_delta(current, previous).filter(|d| *d != 0.0)?;
    let name = key.as_str();
    Some(Self {
      value: delta,
      is_improvement: is_improvement(name, delta),
      label: format_delta(name, delta, key.delta_decimals(delta)),
      color: delta_color(name, delta),
    })
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRow {
  pub key: MetricKey,
  pub label: &'static str,
  pub value: f64,
  pub unit: &'static str,
  pub decimals: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub risk: Option<RiskLevel>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delta: Option<DeltaView>,
  /// Position on the blood range bar, 0-100
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bar_percent: Option<f64>,
}

impl MetricRow {
  fn compute(key: MetricKey, current: &EvaluatedRecord, previous: Option<&EvaluatedRecord>) -> Self {
    let value = key.value(current);
    Self {
      key,
      label: key.label(),
      value,
      unit: key.unit(),
      decimals: key.decimals(),
      risk: key.risk(current),
      delta: DeltaView::compute(key, value, previous.map(|p| key.value(p))),
      bar_percent: None,
    }
  }

  pub fn formatted_value(&self) -> String {
    format!("{:.*}", self.decimals, self.value)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleRow {
  #[serde(flatten)]
  pub item: LifestyleItem,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub delta: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessZone {
  pub vo2_max: f64,
  pub risk: RiskLevel,
  /// Ekblom-Bak zone when the age is known, otherwise the risk label
  pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub personnummer: Option<String>,
  pub date: NaiveDate,
  pub gender: Gender,
  pub age: u32,
  pub scores: CategoryScores,
  pub physical: Vec<MetricRow>,
  pub blood: Vec<MetricRow>,
  pub fitness_zone: FitnessZone,
  pub lifestyle: Vec<LifestyleRow>,
  pub lifestyle_average: f64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub lifestyle_average_delta: Option<f64>,
  pub highlight: LifestyleHighlight,
  pub focus_areas: Vec<FocusArea>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub focus_tip: Option<&'static str>,
}

/// ---------------------------------------------------------------------------
/// Assembly
/// ---------------------------------------------------------------------------

/// Map a value onto the range bar so the reference bounds sit at 22% and
/// 78%, clamped to 3-97
pub fn blood_bar_percent(value: f64, ref_low: f64, ref_high: f64) -> f64 {
  let center = (ref_low + ref_high) / 2.0;
  let half_width = (ref_high - ref_low) / 2.0;
  if half_width <= 0.0 {
    return 50.0;
  }
  let normalized = (value - center) / half_width;
  (50.0 + normalized * 28.0).clamp(3.0, 97.0)
}

fn fitness_zone(current: &EvaluatedRecord) -> FitnessZone {
  let record = &current.record;
  let vo2_max = record.fitness.vo2_max;
  let risk = current.metric_risks.vo2_max;
  let label = record
    .age
    .filter(|&a| a > 0)
    .and_then(|age| ekblom_bak_norms(record.effective_gender()).zone_for(age as f64, vo2_max))
    .map_or(risk.label(), |zone| zone.label);
  FitnessZone { vo2_max, risk, label }
}

impl HealthReport {
  pub fn build(current: &EvaluatedRecord, previous: Option<&EvaluatedRecord>, focus: &FocusSelection) -> Self {
    let record = &current.record;
    let gender = record.effective_gender();
    let age = record.effective_age();

    let physical = PHYSICAL_METRICS
      .iter()
      .map(|&key| MetricRow::compute(key, current, previous))
      .collect();

    let blood = BLOOD_METRICS
      .iter()
      .map(|&key| {
        let mut row = MetricRow::compute(key, current, previous);
        if let Some(metric) = key.blood_metric() {
          let range = resolve_range(metric, record.gender, record.age);
          row.bar_percent = Some(blood_bar_percent(row.value, range.low, range.high));
        }
        row
      })
      .collect();

    let prev_lifestyle = previous.map(|p| &p.record.lifestyle);
    let lifestyle = lifestyle_items(&record.lifestyle)
      .into_iter()
      .map(|item| LifestyleRow {
        item,
        delta: prev_lifestyle
          .map(|prev| item.value as i16 - item.key.rating(prev) as i16)
          .filter(|d| *d != 0),
      })
      .collect();

    let lifestyle_average = record.lifestyle.average();
    let lifestyle_average_delta = prev_lifestyle
      .and_then(|prev| compute_delta(lifestyle_average, Some(prev.average())))
      .filter(|d| *d != 0.0);

    let tip = focus.keys().first().map(|k| focus_tip(*k));

    Self {
      name: record.display_name().unwrap_or_else(|| FALLBACK_NAME.to_string()),
      personnummer: record.personnummer.clone(),
      date: record.date,
      gender,
      age,
      scores: current.scores.clone(),
      physical,
      blood,
      fitness_zone: fitness_zone(current),
      lifestyle,
      lifestyle_average,
      lifestyle_average_delta,
      highlight: LifestyleHighlight::compute(&record.lifestyle, prev_lifestyle),
      focus_areas: focus.areas(),
      focus_tip: tip,
    }
  }

  pub fn to_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }

  pub fn render_text(&self) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = self.write_text(&mut out);
    out
  }

  fn write_text(&self, out: &mut String) -> std::fmt::Result {
    writeln!(out, "HÄLSOKONTROLL")?;
    writeln!(out, "{}", self.name)?;
    if let Some(pnr) = &self.personnummer {
      writeln!(out, "{}", pnr)?;
    }
    writeln!(out, "{}", self.date)?;

    writeln!(out)?;
    writeln!(out, "POÄNG")?;
    let s = &self.scores;
    write_score(out, "Totalt", &s.overall_score)?;
    write_score(out, "Blodanalys", &s.blood_work_score)?;
    write_score(out, "Livsstil", &s.lifestyle_score)?;
    write_score(out, "Kondition", &s.fitness_score)?;
    write_score(out, "Kroppssammansättning", &s.body_composition_score)?;
    write_score(out, "Blodtryck", &s.blood_pressure_score)?;

    writeln!(out)?;
    writeln!(out, "FYSISK STATUS")?;
    for row in &self.physical {
      write_metric(out, row)?;
    }
    writeln!(
      out,
      "  Ekblom-Bak: {} ({})",
      self.fitness_zone.label,
      self.fitness_zone.risk.label()
    )?;

    writeln!(out)?;
    writeln!(out, "BLODANALYS")?;
    for row in &self.blood {
      write_metric(out, row)?;
    }

    writeln!(out)?;
    writeln!(out, "LIVSSTIL")?;
    for row in &self.lifestyle {
      let delta = match row.delta {
        Some(d) if d > 0 => format!("▲{}", d),
        Some(d) => format!("▼{}", d.abs()),
        None => String::new(),
      };
      writeln!(out, "  {:<22}{:>5}/10  {}", row.item.label, row.item.value, delta)?;
    }
    let average_delta = match self.lifestyle_average_delta {
      Some(d) if d > 0.0 => format!("▲ +{:.1}", d),
      Some(d) => format!("▼ {:.1}", d),
      None => String::new(),
    };
    writeln!(out, "  {:<22}{:>5.1}/10  {}", "Medelvärde", self.lifestyle_average, average_delta)?;

    writeln!(out)?;
    match &self.highlight {
      LifestyleHighlight::Progress { items, insight } => {
        writeln!(out, "Störst framsteg")?;
        for c in items {
          writeln!(out, "  ▲ {} +{}", c.label, c.diff)?;
        }
        writeln!(out, "  {}", insight)?;
      }
      LifestyleHighlight::BroadProgress { improved, total, diff, insight } => {
        writeln!(out, "Störst framsteg")?;
        writeln!(out, "  ▲ {} av {} områden förbättrades med +{}", improved, total, diff)?;
        writeln!(out, "  {}", insight)?;
      }
      LifestyleHighlight::Strengths { items, insight } => {
        writeln!(out, "Dina styrkor")?;
        for item in items {
          writeln!(out, "  ★ {} {}/10", item.label, item.value)?;
        }
        writeln!(out, "  {}", insight)?;
      }
    }

    if !self.focus_areas.is_empty() {
      writeln!(out)?;
      writeln!(out, "FOKUSOMRÅDEN")?;
      for area in &self.focus_areas {
        writeln!(out, "  {}: {}", area.label, area.description)?;
      }
      if let Some(tip) = self.focus_tip {
        writeln!(out, "  \"{}\"", tip)?;
      }
    }

    Ok(())
  }

  pub fn focus_keys(&self) -> Vec<FocusAreaKey> {
    self.focus_areas.iter().map(|a| a.key).collect()
  }
}

fn write_score(out: &mut String, label: &str, score: &ScoreResult) -> std::fmt::Result {
  writeln!(out, "  {:<22}{:>5.0}  {}", label, score.value, score.risk.label())
}

fn write_metric(out: &mut String, row: &MetricRow) -> std::fmt::Result {
  let value = if row.unit.is_empty() {
    row.formatted_value()
  } else if row.unit.starts_with('/') {
    format!("{}{}", row.formatted_value(), row.unit)
  } else {
    format!("{} {}", row.formatted_value(), row.unit)
  };
  let risk = row.risk.map(|r| r.label()).unwrap_or("");
  let delta = row.delta.as_ref().map(|d| d.label.as_str()).unwrap_or("");
  writeln!(out, "  {:<16}{:>14}  {:<9}{}", row.label, value, risk, delta)
}
