use serde::Serialize;
use std::fmt::Write;

use crate::commands::{render, CommandError};
use crate::config::OutputFormat;
use crate::models::{Gender, DEFAULT_AGE};
use crate::norms::{ekblom_bak_norms, vo2_thresholds, Vo2Threshold};
use crate::reference::{resolve_range, BloodMetric, ReferenceRange};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRange {
  pub metric: BloodMetric,
  #[serde(flatten)]
  pub range: ReferenceRange,
}

/// One Ekblom-Bak zone evaluated at the subject's age
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneAtAge {
  pub label: &'static str,
  pub vo2_min: f64,
  pub vo2_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTable {
  pub gender: Gender,
  pub age: u32,
  pub blood: Vec<BloodRange>,
  pub vo2_thresholds: Vo2Threshold,
  pub ekblom_bak: Vec<ZoneAtAge>,
}

impl ReferenceTable {
  pub fn compute(gender: Option<Gender>, age: Option<u32>) -> Self {
    let gender = gender.unwrap_or_default();
    let age = age.filter(|&a| a > 0).unwrap_or(DEFAULT_AGE);

    let blood = BloodMetric::ALL
      .iter()
      .map(|&metric| BloodRange {
        metric,
        range: resolve_range(metric, Some(gender), Some(age)),
      })
      .collect();

    let norms = ekblom_bak_norms(gender);
    let clamped = norms.clamp_age(age as f64);
    let ekblom_bak = norms
      .zones
      .iter()
      .map(|zone| {
        let (vo2_min, vo2_max) = zone.bounds_at(clamped);
        ZoneAtAge {
          label: zone.label,
          vo2_min,
          vo2_max,
        }
      })
      .collect();

    Self {
      gender,
      age,
      blood,
      vo2_thresholds: vo2_thresholds(gender, age),
      ekblom_bak,
    }
  }

  pub fn render_text(&self) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = self.write_text(&mut out);
    out
  }

  fn write_text(&self, out: &mut String) -> std::fmt::Result {
    writeln!(out, "Referensvärden: {}, {} år", self.gender, self.age)?;
    writeln!(out)?;
    writeln!(out, "  {:<14}{:>16}{:>16}", "", "grön", "gul")?;
    for row in &self.blood {
      let r = &row.range;
      writeln!(
        out,
        "  {:<14}{:>16}{:>16}",
        row.metric.as_str(),
        band(r.green_low, r.green_high),
        band(r.yellow_low, r.yellow_high)
      )?;
    }

    let t = &self.vo2_thresholds;
    writeln!(out)?;
    writeln!(out, "  VO2max: låg < {}, medel < {}, hög < {}", t.low, t.medium, t.high)?;

    writeln!(out)?;
    writeln!(out, "  Ekblom-Bak")?;
    for zone in &self.ekblom_bak {
      writeln!(out, "  {:<14}{:>6.1} - {:.1}", zone.label, zone.vo2_min, zone.vo2_max)?;
    }
    Ok(())
  }
}

fn band(low: f64, high: Option<f64>) -> String {
  match high {
    Some(high) => format!("{} - {}", low, high),
    None => format!("≥ {}", low),
  }
}

pub fn run(format: OutputFormat, gender: Option<Gender>, age: Option<u32>) -> Result<String, CommandError> {
  let table = ReferenceTable::compute(gender, age);
  render(format, &table, ReferenceTable::render_text)
}
