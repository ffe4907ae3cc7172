//! Normative reference tables
//!
//! Process-wide constant data: the Ekblom-Bak VO2max risk thresholds by
//! age bracket and the five normative zones used for the fitness graph.
//! Kept as arrays of rows so they can be checked against the published
//! tables line by line.

use serde::Serialize;

use crate::models::{Gender, RiskLevel};

/// ---------------------------------------------------------------------------
/// VO2max Risk Thresholds
/// ---------------------------------------------------------------------------

/// One age bracket. Values below `low` are high-risk, below `medium`
/// warning, below `high` good, otherwise optimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vo2Threshold {
  pub max_age: u32,
  pub low: f64,
  pub medium: f64,
  pub high: f64,
}

const fn row(max_age: u32, low: f64, medium: f64, high: f64) -> Vo2Threshold {
  Vo2Threshold { max_age, low, medium, high }
}

pub static MALE_VO2_THRESHOLDS: [Vo2Threshold; 5] = [
  row(29, 34.0, 44.0, 53.0),
  row(39, 31.0, 42.0, 50.0),
  row(49, 27.0, 39.0, 48.0),
  row(59, 25.0, 37.0, 45.0),
  row(99, 23.0, 33.0, 41.0),
];

pub static FEMALE_VO2_THRESHOLDS: [Vo2Threshold; 5] = [
  row(29, 28.0, 37.0, 45.0),
  row(39, 26.0, 35.0, 43.0),
  row(49, 23.0, 33.0, 41.0),
  row(59, 21.0, 30.0, 38.0),
  row(99, 18.0, 27.0, 35.0),
];

pub fn vo2_threshold_table(gender: Gender) -> &'static [Vo2Threshold] {
  match gender {
    Gender::Male => &MALE_VO2_THRESHOLDS,
    Gender::Female => &FEMALE_VO2_THRESHOLDS,
  }
}

/// First bracket with `age <= max_age`; the last row catches every older age.
pub fn vo2_thresholds(gender: Gender, age: u32) -> Vo2Threshold {
  let table = vo2_threshold_table(gender);
  table
    .iter()
    .find(|r| age <= r.max_age)
    .or(table.last())
    .copied()
    .unwrap_or(row(u32::MAX, 0.0, 0.0, 0.0))
}

/// ---------------------------------------------------------------------------
/// Ekblom-Bak Normative Zones
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneBound {
  pub age: u32,
  pub vo2_min: f64,
  pub vo2_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormativeZone {
  pub label: &'static str,
  pub color: &'static str,
  pub bounds: &'static [ZoneBound],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EkblomBakNorms {
  /// Best zone first
  pub zones: &'static [NormativeZone],
  pub age_range: (u32, u32),
  pub vo2_range: (f64, f64),
}

const fn b(age: u32, vo2_min: f64, vo2_max: f64) -> ZoneBound {
  ZoneBound { age, vo2_min, vo2_max }
}

pub const VERY_HIGH: &str = "Mycket hög";
pub const HIGH: &str = "Hög";
pub const AVERAGE: &str = "Medel";
pub const LOW: &str = "Låg";
pub const VERY_LOW: &str = "Mycket låg";

pub static MALE_EKBLOM_BAK: EkblomBakNorms = EkblomBakNorms {
  zones: &[
    NormativeZone {
      label: VERY_HIGH,
      color: "#8FB3A3",
      bounds: &[b(25, 62.0, 70.0), b(35, 58.0, 66.0), b(45, 56.0, 64.0), b(55, 53.0, 61.0), b(65, 49.0, 57.0)],
    },
    NormativeZone {
      label: HIGH,
      color: "#C8D6C7",
      bounds: &[b(25, 53.0, 62.0), b(35, 50.0, 58.0), b(45, 48.0, 56.0), b(55, 45.0, 53.0), b(65, 41.0, 49.0)],
    },
    NormativeZone {
      label: AVERAGE,
      color: "#E5E0D8",
      bounds: &[b(25, 44.0, 52.0), b(35, 42.0, 49.0), b(45, 39.0, 47.0), b(55, 37.0, 44.0), b(65, 33.0, 40.0)],
    },
    NormativeZone {
      label: LOW,
      color: "#D9C5B2",
      bounds: &[b(25, 34.0, 43.0), b(35, 31.0, 41.0), b(45, 27.0, 38.0), b(55, 25.0, 36.0), b(65, 23.0, 32.0)],
    },
    NormativeZone {
      label: VERY_LOW,
      color: "#C4A47C",
      bounds: &[b(25, 15.0, 33.0), b(35, 15.0, 30.0), b(45, 15.0, 26.0), b(55, 15.0, 24.0), b(65, 15.0, 22.0)],
    },
  ],
  age_range: (20, 70),
  vo2_range: (15.0, 70.0),
};

pub static FEMALE_EKBLOM_BAK: EkblomBakNorms = EkblomBakNorms {
  zones: &[
    NormativeZone {
      label: VERY_HIGH,
      color: "#8FB3A3",
      bounds: &[b(25, 53.0, 61.0), b(35, 51.0, 59.0), b(45, 48.0, 56.0), b(55, 45.0, 53.0), b(65, 43.0, 51.0)],
    },
    NormativeZone {
      label: HIGH,
      color: "#C8D6C7",
      bounds: &[b(25, 45.0, 53.0), b(35, 43.0, 51.0), b(45, 41.0, 48.0), b(55, 38.0, 45.0), b(65, 35.0, 43.0)],
    },
    NormativeZone {
      label: AVERAGE,
      color: "#E5E0D8",
      bounds: &[b(25, 37.0, 44.0), b(35, 35.0, 42.0), b(45, 33.0, 40.0), b(55, 30.0, 37.0), b(65, 27.0, 34.0)],
    },
    NormativeZone {
      label: LOW,
      color: "#D9C5B2",
      bounds: &[b(25, 28.0, 36.0), b(35, 26.0, 34.0), b(45, 23.0, 32.0), b(55, 21.0, 29.0), b(65, 18.0, 26.0)],
    },
    NormativeZone {
      label: VERY_LOW,
      color: "#C4A47C",
      bounds: &[b(25, 15.0, 27.0), b(35, 15.0, 25.0), b(45, 15.0, 22.0), b(55, 15.0, 20.0), b(65, 15.0, 17.0)],
    },
  ],
  age_range: (20, 70),
  vo2_range: (15.0, 61.0),
};

pub fn ekblom_bak_norms(gender: Gender) -> &'static EkblomBakNorms {
  match gender {
    Gender::Male => &MALE_EKBLOM_BAK,
    Gender::Female => &FEMALE_EKBLOM_BAK,
  }
}

impl NormativeZone {
  /// (vo2_min, vo2_max) at `age`, linearly interpolated between control
  /// points and held flat outside the first and last point
  pub fn bounds_at(&self, age: f64) -> (f64, f64) {
    let (first, last) = match (self.bounds.first(), self.bounds.last()) {
      (Some(f), Some(l)) => (f, l),
      _ => return (0.0, 0.0),
    };
    if age <= first.age as f64 {
      return (first.vo2_min, first.vo2_max);
    }
    if age >= last.age as f64 {
      return (last.vo2_min, last.vo2_max);
    }

    for pair in self.bounds.windows(2) {
      let (lo, hi) = (&pair[0], &pair[1]);
      if age >= lo.age as f64 && age <= hi.age as f64 {
        let t = (age - lo.age as f64) / (hi.age - lo.age) as f64;
        return (
          lo.vo2_min + t * (hi.vo2_min - lo.vo2_min),
          lo.vo2_max + t * (hi.vo2_max - lo.vo2_max),
        );
      }
    }
    (last.vo2_min, last.vo2_max)
  }

  /// Risk level the zone stands for on the report
  pub fn risk(&self) -> RiskLevel {
    match self.label {
      VERY_LOW => RiskLevel::HighRisk,
      LOW => RiskLevel::Warning,
      AVERAGE => RiskLevel::Good,
      _ => RiskLevel::Optimal,
    }
  }
}

impl EkblomBakNorms {
  pub fn clamp_age(&self, age: f64) -> f64 {
    age.clamp(self.age_range.0 as f64, self.age_range.1 as f64)
  }

  /// Zone for a VO2max at an age. The published bands leave small gaps
  /// between neighbours, so the best zone whose lower bound is reached
  /// wins; anything below every lower bound is the bottom zone.
  pub fn zone_for(&self, age: f64, vo2_max: f64) -> Option<&'static NormativeZone> {
    let age = self.clamp_age(age);
    self
      .zones
      .iter()
      .find(|zone| vo2_max >= zone.bounds_at(age).0)
      .or(self.zones.last())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_vo2_bracket_lookup() {
    let t = vo2_thresholds(Gender::Male, 45);
    assert_eq!((t.low, t.medium, t.high), (27.0, 39.0, 48.0));

    // Boundary ages belong to the bracket they close
    assert_eq!(vo2_thresholds(Gender::Female, 29).low, 28.0);
    assert_eq!(vo2_thresholds(Gender::Female, 30).low, 26.0);
  }

  #[test]
  fn test_vo2_last_bracket_is_catch_all() {
    let t = vo2_thresholds(Gender::Male, 120);
    assert_eq!(t, MALE_VO2_THRESHOLDS[4]);
  }

  #[test]
  fn test_threshold_rows_are_ordered() {
    for table in [&MALE_VO2_THRESHOLDS, &FEMALE_VO2_THRESHOLDS] {
      for r in table.iter() {
        assert!(r.low < r.medium && r.medium < r.high);
      }
      for pair in table.windows(2) {
        assert!(pair[0].max_age < pair[1].max_age);
      }
    }
  }

  #[test]
  fn test_zone_interpolation() {
    let zone = &MALE_EKBLOM_BAK.zones[0];
    // Halfway between 25 (62-70) and 35 (58-66)
    let (lo, hi) = zone.bounds_at(30.0);
    assert!((lo - 60.0).abs() < 1e-9);
    assert!((hi - 68.0).abs() < 1e-9);

    // Held flat outside the control points
    assert_eq!(zone.bounds_at(20.0), (62.0, 70.0));
    assert_eq!(zone.bounds_at(70.0), (49.0, 57.0));
  }

  #[test]
  fn test_zone_label_lookup() {
    let norms = ekblom_bak_norms(Gender::Female);
    assert_eq!(norms.zone_for(35.0, 38.0).map(|z| z.label), Some(AVERAGE));
    assert_eq!(norms.zone_for(35.0, 60.0).map(|z| z.label), Some(VERY_HIGH));
    assert_eq!(norms.zone_for(35.0, 10.0).map(|z| z.label), Some(VERY_LOW));

    // Age beyond the table is clamped
    assert_eq!(
      norms.zone_for(95.0, 30.0).map(|z| z.label),
      norms.zone_for(70.0, 30.0).map(|z| z.label)
    );
  }

  #[test]
  fn test_zone_risk_mapping() {
    let zones = MALE_EKBLOM_BAK.zones;
    let risks: Vec<RiskLevel> = zones.iter().map(|z| z.risk()).collect();
    assert_eq!(
      risks,
      vec![
        RiskLevel::Optimal,
        RiskLevel::Optimal,
        RiskLevel::Good,
        RiskLevel::Warning,
        RiskLevel::HighRisk
      ]
    );
  }
}
