pub mod record;
pub mod evaluated;

pub use record::{
  BloodPressure, BloodWork, BodyComposition, FitnessTests, Gender, HealthRecord, LifestyleRatings,
  DEFAULT_AGE,
};
pub use evaluated::{CategoryScores, EvaluatedRecord, MetricRisks, RiskLevel, ScoreResult};
