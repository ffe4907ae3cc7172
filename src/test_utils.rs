//! Test utilities and helpers for unit testing
//!
//! This module provides common test infrastructure including:
//! - Sample client factories
//! - JSON row fixtures for ingestion
//! - Helper assertions

use crate::models::{
  BloodPressure, BloodWork, BodyComposition, FitnessTests, Gender, HealthRecord, LifestyleRatings,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

/// ---------------------------------------------------------------------------
/// Sample Client
/// ---------------------------------------------------------------------------

pub const SAMPLE_PERSONNUMMER: &str = "19900814-2384";

/// Fixed date helper so fixtures never depend on the clock
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

/// Reference date the sample history is anchored to
pub fn reference_date() -> NaiveDate {
  date(2025, 6, 1)
}

/// Build a visit for the sample client (female, 35) from the values that
/// change between visits
#[allow(clippy::too_many_arguments)]
fn visit(
  date: NaiveDate,
  blood: [f64; 5],
  lifestyle: [u8; 8],
  fitness: [f64; 2],
  body: [f64; 4],
  bp: [f64; 2],
) -> HealthRecord {
  let [hb, glucose, hdl, ldl, triglycerides] = blood;
  let [sleep, diet, stress, relationships, smoking, balance, exercise, alcohol] = lifestyle;
  let [body_fat, muscle_mass, visceral_fat, weight] = body;

  HealthRecord {
    blood_work: BloodWork {
      hb,
      glucose,
      hdl,
      ldl,
      triglycerides,
      tc_hdl_ratio: None,
      ldl_hdl_ratio: None,
    },
    lifestyle: LifestyleRatings {
      sleep,
      diet,
      stress,
      relationships,
      smoking,
      balance,
      exercise,
      alcohol,
    },
    fitness: FitnessTests {
      vo2_max: fitness[0],
      grip_strength: fitness[1],
    },
    body_composition: BodyComposition {
      body_fat,
      muscle_mass,
      visceral_fat,
      weight,
      height: 168.0,
    },
    blood_pressure: BloodPressure {
      systolic: bp[0],
      diastolic: bp[1],
    },
    date,
    firstname: Some("Anna".to_string()),
    lastname: Some("Lindgren".to_string()),
    personnummer: Some(SAMPLE_PERSONNUMMER.to_string()),
    age: Some(35),
    gender: Some(Gender::Female),
  }
}

/// The sample client's latest visit
pub fn sample_record() -> HealthRecord {
  visit(
    reference_date(),
    [133.0, 4.9, 1.5, 2.8, 1.3],
    [8, 8, 6, 8, 10, 7, 8, 9],
    [38.0, 27.0],
    [24.0, 32.0, 5.0, 66.0],
    [116.0, 72.0],
  )
}

/// Three visits three months apart, oldest first, improving each time
pub fn visit_history() -> Vec<HealthRecord> {
  vec![
    visit(
      date(2024, 12, 1),
      [119.0, 5.8, 1.0, 4.0, 2.5],
      [5, 5, 4, 7, 10, 4, 4, 7],
      [30.0, 22.0],
      [31.0, 28.0, 11.0, 72.0],
      [128.0, 82.0],
    ),
    visit(
      date(2025, 3, 1),
      [126.0, 5.4, 1.2, 3.5, 2.0],
      [6, 7, 5, 8, 10, 5, 6, 8],
      [34.0, 24.0],
      [27.0, 30.0, 8.0, 69.0],
      [122.0, 78.0],
    ),
    sample_record(),
  ]
}

/// ---------------------------------------------------------------------------
/// Ingestion Fixtures
/// ---------------------------------------------------------------------------

/// The sample client's latest visit as an exported spreadsheet row
pub fn mock_row() -> Value {
  json!({
    "Name": "Anna Lindgren",
    "Personnummer": SAMPLE_PERSONNUMMER,
    "Date": "2025-06-01",
    "Hemoglobin": 133,
    "Glucose": 4.9,
    "HDL": 1.5,
    "LDL": 2.8,
    "Triglycerides": 1.3,
    "Sömn": 8,
    "Kost": 8,
    "Stress": 6,
    "Relationer": 8,
    "Rökning": 10,
    "Balans": 7,
    "Träning": 8,
    "Alkohol": 9,
    "VO2 Max": 38,
    "Grip Strength": 27,
    "Body Fat": 24,
    "Muscle Mass": 32,
    "Visceral Fat": 5,
    "Weight": 66,
    "Height": 168,
    "Systolic": 116,
    "Diastolic": 72
  })
}

/// ---------------------------------------------------------------------------
/// Test Macros
/// ---------------------------------------------------------------------------

/// Assert two floats are approximately equal within a tolerance
#[macro_export]
macro_rules! assert_approx_eq {
  ($left:expr, $right:expr, $tolerance:expr) => {
    let diff = ($left - $right).abs();
    assert!(
      diff < $tolerance,
      "Values not approximately equal: {} vs {} (diff: {}, tolerance: {})",
      $left,
      $right,
      diff,
      $tolerance
    );
  };
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_history_is_oldest_first() {
    let history = visit_history();
    assert_eq!(history.len(), 3);
    assert!(history.windows(2).all(|w| w[0].date < w[1].date));
    assert_eq!(history[2], sample_record());
  }

  #[test]
  fn test_assert_approx_eq_macro() {
    assert_approx_eq!(1.0_f64, 1.0005_f64, 0.001);
  }
}
