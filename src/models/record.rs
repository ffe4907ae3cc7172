use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Age used when a record carries none
pub const DEFAULT_AGE: u32 = 30;

/// Biological sex used to pick sex-specific reference tables.
/// Male is the default when a record carries none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
  #[default]
  Male,
  Female,
}

impl Gender {
  pub fn as_str(&self) -> &'static str {
    match self {
      Gender::Male => "male",
      Gender::Female => "female",
    }
  }
}

impl std::fmt::Display for Gender {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for Gender {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "male" | "man" | "m" => Ok(Gender::Male),
      "female" | "kvinna" | "f" | "k" => Ok(Gender::Female),
      other => Err(format!("Unknown gender: {}", other)),
    }
  }
}

/// Blood panel in Swedish lab units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodWork {
  /// Hemoglobin (g/L)
  pub hb: f64,
  /// Fasting glucose (mmol/L)
  pub glucose: f64,
  /// HDL cholesterol (mmol/L)
  pub hdl: f64,
  /// LDL cholesterol (mmol/L)
  pub ldl: f64,
  /// Triglycerides (mmol/L)
  pub triglycerides: f64,
  /// Lab-supplied TC/HDL ratio; computed when absent
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tc_hdl_ratio: Option<f64>,
  /// Lab-supplied LDL/HDL ratio; computed when absent
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ldl_hdl_ratio: Option<f64>,
}

/// Self-reported ratings, 1-10, higher is always better.
/// Smoking and alcohol use 10 for abstinence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleRatings {
  pub sleep: u8,
  pub diet: u8,
  pub stress: u8,
  pub relationships: u8,
  pub smoking: u8,
  pub balance: u8,
  pub exercise: u8,
  pub alcohol: u8,
}

impl LifestyleRatings {
  /// All eight ratings in report order
  pub fn values(&self) -> [u8; 8] {
    [
      self.sleep,
      self.diet,
      self.stress,
      self.relationships,
      self.smoking,
      self.balance,
      self.exercise,
      self.alcohol,
    ]
  }

  pub fn average(&self) -> f64 {
    let sum: u32 = self.values().iter().map(|&v| v as u32).sum();
    sum as f64 / 8.0
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessTests {
  /// Ekblom-Bak estimated VO2max (ml/kg/min)
  pub vo2_max: f64,
  /// Grip strength (kg)
  pub grip_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyComposition {
  /// Body fat (%)
  pub body_fat: f64,
  /// Muscle mass (%)
  pub muscle_mass: f64,
  /// InBody visceral fat level, 1-20
  pub visceral_fat: f64,
  /// Weight (kg)
  pub weight: f64,
  /// Height (cm)
  pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
  /// mmHg
  pub systolic: f64,
  /// mmHg
  pub diastolic: f64,
}

/// One measurement session for one subject, already coerced and
/// defaulted by ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
  pub blood_work: BloodWork,
  pub lifestyle: LifestyleRatings,
  pub fitness: FitnessTests,
  pub body_composition: BodyComposition,
  pub blood_pressure: BloodPressure,
  pub date: NaiveDate,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub firstname: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub lastname: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub personnummer: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub age: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gender: Option<Gender>,
}

impl HealthRecord {
  /// Gender with the documented default applied
  pub fn effective_gender(&self) -> Gender {
    self.gender.unwrap_or_default()
  }

  /// Age with the documented default applied
  pub fn effective_age(&self) -> u32 {
    self.age.filter(|&a| a > 0).unwrap_or(DEFAULT_AGE)
  }

  /// "First Last", or None when neither is set
  pub fn display_name(&self) -> Option<String> {
    let parts: Vec<&str> = [self.firstname.as_deref(), self.lastname.as_deref()]
      .into_iter()
      .flatten()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .collect();
    if parts.is_empty() {
      None
    } else {
      Some(parts.join(" "))
    }
  }
}
