//! Deterministic evaluation layer for health-check records
//!
//! Maps a raw record to per-category scores, an overall score and the
//! individual metric risks. Everything here is a pure function of the
//! record: no I/O, no shared state, same input gives the same output.

use tracing::debug;

use crate::models::{
  BloodPressure, BloodWork, BodyComposition, CategoryScores, EvaluatedRecord, FitnessTests, Gender,
  HealthRecord, LifestyleRatings, MetricRisks, RiskLevel, ScoreResult,
};
use crate::reference::{
  blood_pressure_risk, body_fat_risk, classify, grip_strength_risk, resolve_range,
  visceral_fat_risk, vo2_max_risk, BloodMetric,
};

/// ---------------------------------------------------------------------------
/// Derived Ratios
/// ---------------------------------------------------------------------------

/// Triglyceride divisor of the Friedewald approximation in mmol/L
const FRIEDEWALD_TG_DIVISOR: f64 = 2.2;

fn round_1(value: f64) -> f64 {
  (value * 10.0).round() / 10.0
}

/// Total cholesterol estimated as LDL + HDL + TG/2.2
pub fn total_cholesterol(bw: &BloodWork) -> f64 {
  bw.ldl + bw.hdl + bw.triglycerides / FRIEDEWALD_TG_DIVISOR
}

/// TC/HDL, one decimal. A lab-supplied ratio is returned untouched.
///
/// HDL must be positive; ingestion rejects records where it is not.
pub fn tc_hdl_ratio(bw: &BloodWork) -> f64 {
  match bw.tc_hdl_ratio {
    Some(ratio) => ratio,
    None => round_1(total_cholesterol(bw) / bw.hdl),
  }
}

/// LDL/HDL, one decimal. A lab-supplied ratio is returned untouched.
pub fn ldl_hdl_ratio(bw: &BloodWork) -> f64 {
  match bw.ldl_hdl_ratio {
    Some(ratio) => ratio,
    None => round_1(bw.ldl / bw.hdl),
  }
}

/// ---------------------------------------------------------------------------
/// Category Scores
/// ---------------------------------------------------------------------------

/// Deduction weights of the blood work score, summing to 100
pub const BLOOD_WORK_WEIGHTS: [(BloodMetric, f64); 5] = [
  (BloodMetric::Hb, 25.0),
  (BloodMetric::Glucose, 25.0),
  (BloodMetric::Hdl, 20.0),
  (BloodMetric::Ldl, 15.0),
  (BloodMetric::Triglycerides, 15.0),
];

fn blood_value(bw: &BloodWork, metric: BloodMetric) -> f64 {
  match metric {
    BloodMetric::Hb => bw.hb,
    BloodMetric::Glucose => bw.glucose,
    BloodMetric::Hdl => bw.hdl,
    BloodMetric::Ldl => bw.ldl,
    BloodMetric::Triglycerides => bw.triglycerides,
    BloodMetric::TcHdlRatio => tc_hdl_ratio(bw),
    BloodMetric::LdlHdlRatio => ldl_hdl_ratio(bw),
  }
}

/// Risk of one blood metric against the subject's reference range
pub fn blood_metric_risk(bw: &BloodWork, metric: BloodMetric, gender: Option<Gender>, age: Option<u32>) -> RiskLevel {
  classify(blood_value(bw, metric), &resolve_range(metric, gender, age))
}

fn clamp_score(score: f64) -> f64 {
  score.max(0.0)
}

/// Start at 100, lose the full weight for a high-risk metric and half of
/// it (rounded) for a warning. Risk is the worst metric.
pub fn blood_work_score(bw: &BloodWork, gender: Option<Gender>, age: Option<u32>) -> ScoreResult {
  let mut score = 100.0;
  let mut risks = Vec::with_capacity(BLOOD_WORK_WEIGHTS.len());

  for (metric, weight) in BLOOD_WORK_WEIGHTS {
    let risk = blood_metric_risk(bw, metric, gender, age);
    match risk {
      RiskLevel::HighRisk => score -= weight,
      RiskLevel::Warning => score -= (weight * 0.5).round(),
      _ => {}
    }
    risks.push(risk);
  }

  ScoreResult::new(clamp_score(score), RiskLevel::worst_of(risks))
}

/// Mean rating x 10. Bands on the mean: 8+ optimal, 6+ good, 4+ warning.
pub fn lifestyle_score(lifestyle: &LifestyleRatings) -> ScoreResult {
  let average = lifestyle.average();
  let risk = match average {
    a if a >= 8.0 => RiskLevel::Optimal,
    a if a >= 6.0 => RiskLevel::Good,
    a if a >= 4.0 => RiskLevel::Warning,
    _ => RiskLevel::HighRisk,
  };
  ScoreResult::new(average * 10.0, risk)
}

/// Points lost for a VO2max or blood pressure classification
fn banded_deduction(risk: RiskLevel) -> f64 {
  match risk {
    RiskLevel::HighRisk => 30.0,
    RiskLevel::Warning => 15.0,
    RiskLevel::Good => 5.0,
    RiskLevel::Optimal => 0.0,
  }
}

/// Worst component, with "good" components counting as optimal
fn component_risk<I: IntoIterator<Item = RiskLevel>>(risks: I) -> RiskLevel {
  match RiskLevel::worst_of(risks) {
    RiskLevel::Good => RiskLevel::Optimal,
    worst => worst,
  }
}

/// VO2max against the Ekblom-Bak bracket plus grip strength
pub fn fitness_score(fitness: &FitnessTests, gender: Option<Gender>, age: Option<u32>) -> ScoreResult {
  let mut score = 100.0;

  let vo2 = vo2_max_risk(fitness.vo2_max, gender, age);
  score -= banded_deduction(vo2);

  let grip = grip_strength_risk(fitness.grip_strength);
  if grip == RiskLevel::Warning {
    score -= 20.0;
  }

  ScoreResult::new(clamp_score(score), component_risk([vo2, grip]))
}

/// Body fat only; visceral fat and weight are tracked per metric instead
pub fn body_composition_score(bc: &BodyComposition, gender: Option<Gender>) -> ScoreResult {
  let risk = body_fat_risk(bc.body_fat, gender);
  let deduction = match risk {
    RiskLevel::HighRisk => 30.0,
    RiskLevel::Warning => 15.0,
    _ => 0.0,
  };
  ScoreResult::new(clamp_score(100.0 - deduction), risk)
}

pub fn blood_pressure_score(bp: &BloodPressure) -> ScoreResult {
  let risk = blood_pressure_risk(bp);
  ScoreResult::new(clamp_score(100.0 - banded_deduction(risk)), risk)
}

/// ---------------------------------------------------------------------------
/// Overall Score
/// ---------------------------------------------------------------------------

pub const OVERALL_WEIGHTS: OverallWeights = OverallWeights {
  blood_work: 0.25,
  lifestyle: 0.25,
  fitness: 0.20,
  body_composition: 0.15,
  blood_pressure: 0.15,
};

/// Category weights of the overall score, summing to 1.0
#[derive(Debug, Clone, Copy)]
pub struct OverallWeights {
  pub blood_work: f64,
  pub lifestyle: f64,
  pub fitness: f64,
  pub body_composition: f64,
  pub blood_pressure: f64,
}

/// Weighted mean of the category scores. The risk band is taken on the
/// exact mean; the reported value is rounded to a whole point.
pub fn overall_score(
  blood_work: &ScoreResult,
  lifestyle: &ScoreResult,
  fitness: &ScoreResult,
  body_composition: &ScoreResult,
  blood_pressure: &ScoreResult,
) -> ScoreResult {
  let w = OVERALL_WEIGHTS;
  let value = blood_work.value * w.blood_work
    + lifestyle.value * w.lifestyle
    + fitness.value * w.fitness
    + body_composition.value * w.body_composition
    + blood_pressure.value * w.blood_pressure;

  let risk = match value {
    v if v >= 80.0 => RiskLevel::Optimal,
    v if v >= 65.0 => RiskLevel::Good,
    v if v >= 50.0 => RiskLevel::Warning,
    _ => RiskLevel::HighRisk,
  };

  ScoreResult::new(value.round(), risk)
}

impl CategoryScores {
  /// Compute every category score and the overall score for a record
  pub fn compute(record: &HealthRecord) -> Self {
    let (gender, age) = (record.gender, record.age);

    let blood_work_score = blood_work_score(&record.blood_work, gender, age);
    let lifestyle_score = lifestyle_score(&record.lifestyle);
    let fitness_score = fitness_score(&record.fitness, gender, age);
    let body_composition_score = body_composition_score(&record.body_composition, gender);
    let blood_pressure_score = blood_pressure_score(&record.blood_pressure);

    let overall_score = overall_score(
      &blood_work_score,
      &lifestyle_score,
      &fitness_score,
      &body_composition_score,
      &blood_pressure_score,
    );

    Self {
      blood_work_score,
      lifestyle_score,
      fitness_score,
      body_composition_score,
      blood_pressure_score,
      overall_score,
    }
  }
}

/// ---------------------------------------------------------------------------
/// Individual Metric Risks
/// ---------------------------------------------------------------------------

impl MetricRisks {
  /// Classify the eleven tracked metrics of a record
  pub fn compute(record: &HealthRecord) -> Self {
    let (gender, age) = (record.gender, record.age);
    let bw = &record.blood_work;
    let blood = |metric| blood_metric_risk(bw, metric, gender, age);

    Self {
      hb: blood(BloodMetric::Hb),
      glucose: blood(BloodMetric::Glucose),
      hdl: blood(BloodMetric::Hdl),
      ldl: blood(BloodMetric::Ldl),
      triglycerides: blood(BloodMetric::Triglycerides),
      tc_hdl_ratio: blood(BloodMetric::TcHdlRatio),
      ldl_hdl_ratio: blood(BloodMetric::LdlHdlRatio),
      body_fat: body_fat_risk(record.body_composition.body_fat, gender),
      visceral_fat: visceral_fat_risk(record.body_composition.visceral_fat),
      blood_pressure: blood_pressure_risk(&record.blood_pressure),
      vo2_max: vo2_max_risk(record.fitness.vo2_max, gender, age),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Pipeline
/// ---------------------------------------------------------------------------

/// Evaluate one raw record. Never fails, whatever the numbers.
pub fn evaluate_health_data(record: &HealthRecord) -> EvaluatedRecord {
  let scores = CategoryScores::compute(record);
  let metric_risks = MetricRisks::compute(record);

  debug!(
    date = %record.date,
    overall = scores.overall_score.value,
    risk = %scores.overall_score.risk,
    "evaluated record"
  );

  EvaluatedRecord {
    record: record.clone(),
    scores,
    metric_risks,
  }
}

/// Evaluate a history, preserving the caller's order
pub fn evaluate_all(records: &[HealthRecord]) -> Vec<EvaluatedRecord> {
  records.iter().map(evaluate_health_data).collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
