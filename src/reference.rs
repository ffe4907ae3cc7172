//! Reference ranges and risk classification
//!
//! Resolves the medical green/yellow bands for a blood metric given the
//! subject's gender and age, and classifies values against them. The
//! banded rules for body fat, visceral fat, blood pressure and VO2max live
//! here too so the category scores and the per-metric risks share one
//! source of truth.

use serde::{Deserialize, Serialize};

use crate::models::{BloodPressure, Gender, RiskLevel, DEFAULT_AGE};
use crate::norms;

/// ---------------------------------------------------------------------------
/// Blood Metrics
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BloodMetric {
  Hb,
  Glucose,
  Hdl,
  Ldl,
  Triglycerides,
  TcHdlRatio,
  LdlHdlRatio,
}

impl BloodMetric {
  pub const ALL: [BloodMetric; 7] = [
    BloodMetric::Hb,
    BloodMetric::Glucose,
    BloodMetric::Hdl,
    BloodMetric::Ldl,
    BloodMetric::Triglycerides,
    BloodMetric::TcHdlRatio,
    BloodMetric::LdlHdlRatio,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      BloodMetric::Hb => "hb",
      BloodMetric::Glucose => "glucose",
      BloodMetric::Hdl => "hdl",
      BloodMetric::Ldl => "ldl",
      BloodMetric::Triglycerides => "triglycerides",
      BloodMetric::TcHdlRatio => "tcHdlRatio",
      BloodMetric::LdlHdlRatio => "ldlHdlRatio",
    }
  }
}

impl std::str::FromStr for BloodMetric {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    BloodMetric::ALL
      .into_iter()
      .find(|m| m.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("Unknown blood metric: {}", s))
  }
}

/// ---------------------------------------------------------------------------
/// Reference Range
/// ---------------------------------------------------------------------------

/// Resolved bands for one metric. `low`/`high` are the practical display
/// bounds; `None` as an upper bound means the band is open upwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceRange {
  pub low: f64,
  pub high: f64,
  pub green_low: f64,
  pub green_high: Option<f64>,
  pub yellow_low: f64,
  pub yellow_high: Option<f64>,
}

impl ReferenceRange {
  const fn closed(low: f64, high: f64, green: (f64, f64), yellow: (f64, f64)) -> Self {
    Self {
      low,
      high,
      green_low: green.0,
      green_high: Some(green.1),
      yellow_low: yellow.0,
      yellow_high: Some(yellow.1),
    }
  }

  const fn open_above(low: f64, high: f64, green_low: f64, yellow_low: f64) -> Self {
    Self {
      low,
      high,
      green_low,
      green_high: None,
      yellow_low,
      yellow_high: None,
    }
  }

  pub fn in_green(&self, value: f64) -> bool {
    value >= self.green_low && self.green_high.map_or(true, |h| value <= h)
  }

  pub fn in_yellow(&self, value: f64) -> bool {
    value >= self.yellow_low && self.yellow_high.map_or(true, |h| value <= h)
  }
}

/// Resolve the reference range for a metric. Total: a missing gender uses
/// the male table, a missing age the default age (which lands LDL in its
/// youngest bracket).
pub fn resolve_range(metric: BloodMetric, gender: Option<Gender>, age: Option<u32>) -> ReferenceRange {
  let gender = gender.unwrap_or_default();
  let age = age.unwrap_or(DEFAULT_AGE);

  match metric {
    BloodMetric::Hb => match gender {
      Gender::Female => ReferenceRange::closed(121.0, 144.0, (121.0, 144.0), (117.0, 153.0)),
      Gender::Male => ReferenceRange::closed(141.0, 165.0, (141.0, 165.0), (134.0, 170.0)),
    },
    BloodMetric::Glucose => ReferenceRange::closed(4.2, 6.0, (4.2, 6.0), (3.75, 6.45)),
    // Lower is better, no red zone below
    BloodMetric::Ldl => {
      if age > 50 {
        ReferenceRange::closed(1.0, 4.9, (0.0, 4.9), (0.0, 5.3))
      } else if age > 30 {
        ReferenceRange::closed(1.7, 4.2, (0.0, 4.2), (0.0, 4.7))
      } else {
        ReferenceRange::closed(1.0, 4.0, (0.0, 4.0), (0.0, 4.3))
      }
    }
    // Higher is better, no upper bound
    BloodMetric::Hdl => match gender {
      Gender::Female => ReferenceRange::open_above(0.8, 2.5, 1.11, 1.0),
      Gender::Male => ReferenceRange::open_above(0.8, 2.5, 1.11, 0.8),
    },
    BloodMetric::Triglycerides => ReferenceRange::closed(0.3, 2.3, (0.0, 2.3), (0.0, 2.69)),
    BloodMetric::TcHdlRatio => ReferenceRange::closed(1.5, 3.5, (0.0, 3.5), (0.0, 5.0)),
    BloodMetric::LdlHdlRatio => ReferenceRange::closed(0.5, 3.0, (0.0, 3.0), (0.0, 4.0)),
  }
}

/// Inclusive bands: green is optimal, yellow warning, anything else high-risk
pub fn classify(value: f64, range: &ReferenceRange) -> RiskLevel {
  if range.in_green(value) {
    RiskLevel::Optimal
  } else if range.in_yellow(value) {
    RiskLevel::Warning
  } else {
    RiskLevel::HighRisk
  }
}

/// ---------------------------------------------------------------------------
/// Banded Body, Blood Pressure and VO2max Rules
/// ---------------------------------------------------------------------------

/// InBody body fat bands.
/// Female: green 18-28, yellow 10-18 / 28-35, red outside.
/// Male: green 10-20, yellow 20-25, red below 10 or above 25.
pub fn body_fat_risk(body_fat: f64, gender: Option<Gender>) -> RiskLevel {
  match gender.unwrap_or_default() {
    Gender::Female => {
      if body_fat < 10.0 || body_fat > 35.0 {
        RiskLevel::HighRisk
      } else if body_fat < 18.0 || body_fat > 28.0 {
        RiskLevel::Warning
      } else {
        RiskLevel::Optimal
      }
    }
    Gender::Male => {
      if body_fat < 10.0 || body_fat > 25.0 {
        RiskLevel::HighRisk
      } else if body_fat > 20.0 {
        RiskLevel::Warning
      } else {
        RiskLevel::Optimal
      }
    }
  }
}

/// InBody visceral fat level: below 10 optimal, 10-14 warning, 15+ high-risk
pub fn visceral_fat_risk(level: f64) -> RiskLevel {
  if level >= 15.0 {
    RiskLevel::HighRisk
  } else if level >= 10.0 {
    RiskLevel::Warning
  } else {
    RiskLevel::Optimal
  }
}

/// Normal <120/<80, elevated 120-129/<80, stage 1 130-139/80-89, stage 2 140+/90+.
/// Diastolic only participates in the stage 1 and 2 checks.
pub fn blood_pressure_risk(bp: &BloodPressure) -> RiskLevel {
  if bp.systolic >= 140.0 || bp.diastolic >= 90.0 {
    RiskLevel::HighRisk
  } else if bp.systolic >= 130.0 || bp.diastolic >= 80.0 {
    RiskLevel::Warning
  } else if bp.systolic >= 120.0 {
    RiskLevel::Good
  } else {
    RiskLevel::Optimal
  }
}

/// VO2max against the Ekblom-Bak bracket for the subject. The only
/// individual classifier that emits all four levels.
pub fn vo2_max_risk(vo2_max: f64, gender: Option<Gender>, age: Option<u32>) -> RiskLevel {
  let t = norms::vo2_thresholds(
    gender.unwrap_or_default(),
    age.filter(|&a| a > 0).unwrap_or(DEFAULT_AGE),
  );
  if vo2_max < t.low {
    RiskLevel::HighRisk
  } else if vo2_max < t.medium {
    RiskLevel::Warning
  } else if vo2_max < t.high {
    RiskLevel::Good
  } else {
    RiskLevel::Optimal
  }
}

/// Grip strength, no sex-specific data: below 20 kg warning, 30+ optimal
pub fn grip_strength_risk(grip_kg: f64) -> RiskLevel {
  if grip_kg < 20.0 {
    RiskLevel::Warning
  } else if grip_kg >= 30.0 {
    RiskLevel::Optimal
  } else {
    RiskLevel::Good
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn test_hb_by_gender() {
    let female = resolve_range(BloodMetric::Hb, Some(Gender::Female), Some(35));
    assert_eq!(classify(133.0, &female), RiskLevel::Optimal);
    assert_eq!(classify(118.0, &female), RiskLevel::Warning);
    assert_eq!(classify(116.0, &female), RiskLevel::HighRisk);

    // Missing gender falls back to the male table
    let unknown = resolve_range(BloodMetric::Hb, None, None);
    assert_eq!(unknown, resolve_range(BloodMetric::Hb, Some(Gender::Male), None));
    assert_eq!(classify(133.0, &unknown), RiskLevel::HighRisk);
  }

  #[test]
  fn test_ldl_age_brackets() {
    let older = resolve_range(BloodMetric::Ldl, Some(Gender::Male), Some(55));
    assert_eq!(classify(4.5, &older), RiskLevel::Optimal);

    let young = resolve_range(BloodMetric::Ldl, Some(Gender::Male), Some(25));
    assert_eq!(young.green_high, Some(4.0));
    assert_eq!(young.yellow_high, Some(4.3));
    assert_eq!(classify(4.5, &young), RiskLevel::HighRisk);

    let middle = resolve_range(BloodMetric::Ldl, None, Some(31));
    assert_eq!(middle.green_high, Some(4.2));
    assert_eq!(resolve_range(BloodMetric::Ldl, None, Some(30)).green_high, Some(4.0));
    assert_eq!(resolve_range(BloodMetric::Ldl, None, Some(50)).green_high, Some(4.2));
    assert_eq!(resolve_range(BloodMetric::Ldl, None, Some(51)).green_high, Some(4.9));

    // Missing age uses the youngest bracket
    assert_eq!(resolve_range(BloodMetric::Ldl, None, None), young);
  }

  #[test]
  fn test_hdl_open_upper_bound() {
    let male = resolve_range(BloodMetric::Hdl, Some(Gender::Male), None);
    assert_eq!(male.green_high, None);
    assert_eq!(classify(9.0, &male), RiskLevel::Optimal);
    assert_eq!(classify(0.9, &male), RiskLevel::Warning);
    assert_eq!(classify(0.79, &male), RiskLevel::HighRisk);

    let female = resolve_range(BloodMetric::Hdl, Some(Gender::Female), None);
    assert_eq!(classify(0.9, &female), RiskLevel::HighRisk);
  }

  #[test]
  fn test_boundaries_are_inclusive() {
    let tg = resolve_range(BloodMetric::Triglycerides, None, None);
    assert_eq!(classify(2.3, &tg), RiskLevel::Optimal);
    assert_eq!(classify(2.69, &tg), RiskLevel::Warning);
    assert_eq!(classify(2.7, &tg), RiskLevel::HighRisk);

    let glucose = resolve_range(BloodMetric::Glucose, Some(Gender::Female), Some(70));
    assert_eq!(classify(3.75, &glucose), RiskLevel::Warning);
    assert_eq!(classify(3.74, &glucose), RiskLevel::HighRisk);
  }

  #[test]
  fn test_negative_values_do_not_panic() {
    let tc = resolve_range(BloodMetric::TcHdlRatio, None, None);
    assert_eq!(classify(-1.0, &tc), RiskLevel::HighRisk);
  }

  #[test]
  fn test_green_band_inside_yellow_band() {
    for metric in BloodMetric::ALL {
      for gender in [Gender::Male, Gender::Female] {
        for age in [20, 30, 31, 50, 51, 80] {
          let r = resolve_range(metric, Some(gender), Some(age));
          assert!(r.yellow_low <= r.green_low, "{:?}", metric);
          assert!(r.yellow_low >= 0.0);
          match (r.green_high, r.yellow_high) {
            (Some(g), Some(y)) => assert!(g <= y, "{:?}", metric),
            (None, None) => {}
            _ => panic!("{:?}: green open but yellow closed", metric),
          }
        }
      }
    }
  }

  #[test]
  fn test_body_fat_bands() {
    assert_eq!(body_fat_risk(36.0, Some(Gender::Female)), RiskLevel::HighRisk);
    assert_eq!(body_fat_risk(36.0, Some(Gender::Male)), RiskLevel::HighRisk);
    assert_eq!(body_fat_risk(30.0, Some(Gender::Female)), RiskLevel::Warning);
    assert_eq!(body_fat_risk(22.0, Some(Gender::Female)), RiskLevel::Optimal);
    assert_eq!(body_fat_risk(22.0, None), RiskLevel::Warning);
    assert_eq!(body_fat_risk(9.9, Some(Gender::Male)), RiskLevel::HighRisk);
  }

  #[test]
  fn test_visceral_fat_bands() {
    assert_eq!(visceral_fat_risk(9.0), RiskLevel::Optimal);
    assert_eq!(visceral_fat_risk(10.0), RiskLevel::Warning);
    assert_eq!(visceral_fat_risk(14.0), RiskLevel::Warning);
    assert_eq!(visceral_fat_risk(15.0), RiskLevel::HighRisk);
  }

  #[test]
  fn test_blood_pressure_bands() {
    let bp = |s, d| BloodPressure { systolic: s, diastolic: d };
    assert_eq!(blood_pressure_risk(&bp(118.0, 75.0)), RiskLevel::Optimal);
    assert_eq!(blood_pressure_risk(&bp(125.0, 75.0)), RiskLevel::Good);
    assert_eq!(blood_pressure_risk(&bp(118.0, 82.0)), RiskLevel::Warning);
    assert_eq!(blood_pressure_risk(&bp(135.0, 70.0)), RiskLevel::Warning);
    assert_eq!(blood_pressure_risk(&bp(118.0, 90.0)), RiskLevel::HighRisk);
  }

  #[test]
  fn test_vo2_max_uses_all_four_levels() {
    // Male 45: low 27, medium 39, high 48
    let age = Some(45);
    let male = Some(Gender::Male);
    assert_eq!(vo2_max_risk(26.0, male, age), RiskLevel::HighRisk);
    assert_eq!(vo2_max_risk(30.0, male, age), RiskLevel::Warning);
    assert_eq!(vo2_max_risk(40.0, male, age), RiskLevel::Good);
    assert_eq!(vo2_max_risk(48.0, male, age), RiskLevel::Optimal);
  }

  #[test]
  fn test_metric_name_parsing() {
    assert_eq!("tcHdlRatio".parse::<BloodMetric>(), Ok(BloodMetric::TcHdlRatio));
    assert_eq!("HB".parse::<BloodMetric>(), Ok(BloodMetric::Hb));
    assert!("cholesterol".parse::<BloodMetric>().is_err());
  }

  fn any_metric() -> impl Strategy<Value = BloodMetric> {
    prop::sample::select(BloodMetric::ALL.to_vec())
  }

  proptest! {
    // Moving away from the green band never improves the risk
    #[test]
    fn prop_classify_is_monotonic_outward(
      metric in any_metric(),
      female in any::<bool>(),
      age in 18u32..90,
      a in 0.0f64..20.0,
      b in 0.0f64..20.0,
    ) {
      let gender = if female { Gender::Female } else { Gender::Male };
      let range = resolve_range(metric, Some(gender), Some(age));
      let (near, far) = if a <= b { (a, b) } else { (b, a) };

      // Upward from greenLow
      let up_near = classify(range.green_low + near, &range);
      let up_far = classify(range.green_low + far, &range);
      prop_assert!(up_near <= up_far);

      // Downward from greenLow
      let down_near = classify(range.green_low - near, &range);
      let down_far = classify(range.green_low - far, &range);
      prop_assert!(down_near <= down_far);
    }
  }
}
