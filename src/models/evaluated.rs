use serde::{Deserialize, Serialize};

use super::record::HealthRecord;

/// Risk classification, ordered from best to worst so that `max()` is
/// the worst-of operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
  Optimal,
  Good,
  Warning,
  HighRisk,
}

impl RiskLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      RiskLevel::Optimal => "optimal",
      RiskLevel::Good => "good",
      RiskLevel::Warning => "warning",
      RiskLevel::HighRisk => "high-risk",
    }
  }

  /// Swedish label used on the printed report
  pub fn label(&self) -> &'static str {
    match self {
      RiskLevel::Optimal => "Optimalt",
      RiskLevel::Good => "Bra",
      RiskLevel::Warning => "Varning",
      RiskLevel::HighRisk => "Högrisk",
    }
  }

  pub fn color(&self) -> &'static str {
    match self {
      RiskLevel::Optimal => "#004B87",
      RiskLevel::Good => "#8FB3A3",
      RiskLevel::Warning => "#C4A47C",
      RiskLevel::HighRisk => "#C87979",
    }
  }

  /// Worst level in the iterator, `Optimal` when empty
  pub fn worst_of<I: IntoIterator<Item = RiskLevel>>(risks: I) -> RiskLevel {
    risks.into_iter().max().unwrap_or(RiskLevel::Optimal)
  }
}

impl std::fmt::Display for RiskLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A 0-100 category score with its risk band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
  pub value: f64,
  pub risk: RiskLevel,
}

impl ScoreResult {
  pub fn new(value: f64, risk: RiskLevel) -> Self {
    Self { value, risk }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
  pub blood_work_score: ScoreResult,
  pub lifestyle_score: ScoreResult,
  pub fitness_score: ScoreResult,
  pub body_composition_score: ScoreResult,
  pub blood_pressure_score: ScoreResult,
  pub overall_score: ScoreResult,
}

/// Per-metric risk for the eleven individually tracked metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricRisks {
  pub hb: RiskLevel,
  pub glucose: RiskLevel,
  pub hdl: RiskLevel,
  pub ldl: RiskLevel,
  pub triglycerides: RiskLevel,
  pub tc_hdl_ratio: RiskLevel,
  pub ldl_hdl_ratio: RiskLevel,
  pub body_fat: RiskLevel,
  pub visceral_fat: RiskLevel,
  pub blood_pressure: RiskLevel,
  pub vo2_max: RiskLevel,
}

impl MetricRisks {
  /// (metric key, risk) pairs in report order
  pub fn entries(&self) -> [(&'static str, RiskLevel); 11] {
    [
      ("hb", self.hb),
      ("glucose", self.glucose),
      ("hdl", self.hdl),
      ("ldl", self.ldl),
      ("triglycerides", self.triglycerides),
      ("tcHdlRatio", self.tc_hdl_ratio),
      ("ldlHdlRatio", self.ldl_hdl_ratio),
      ("bodyFat", self.body_fat),
      ("visceralFat", self.visceral_fat),
      ("bloodPressure", self.blood_pressure),
      ("vo2Max", self.vo2_max),
    ]
  }

  pub fn get(&self, key: &str) -> Option<RiskLevel> {
    self
      .entries()
      .into_iter()
      .find(|(k, _)| *k == key)
      .map(|(_, risk)| risk)
  }
}

/// A raw record plus everything the evaluation pipeline derives from it.
/// Built once by `evaluate_health_data` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedRecord {
  #[serde(flatten)]
  pub record: HealthRecord,
  pub scores: CategoryScores,
  pub metric_risks: MetricRisks,
}
