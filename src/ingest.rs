//! Row export ingestion
//!
//! Turns a JSON array of flat spreadsheet rows into validated
//! `HealthRecord`s, sorted oldest-first, ready for evaluation. This is the
//! only place records are rejected; everything downstream is total.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::models::{
  BloodPressure, BloodWork, BodyComposition, FitnessTests, Gender, HealthRecord, LifestyleRatings,
};

type Row = Map<String, Value>;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
  #[error("Failed to read file: {0}")]
  Io(#[from] std::io::Error),

  #[error("Failed to parse rows: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("File contains no rows")]
  Empty,

  #[error("Row {row} is not an object")]
  InvalidRow { row: usize },

  #[error("Row {row}: missing {field}")]
  MissingField { row: usize, field: &'static str },

  #[error("Row {row}: invalid date '{value}'")]
  InvalidDate { row: usize, value: String },

  #[error("Row {row}: HDL must be positive")]
  NonPositiveHdl { row: usize },
}

impl Serialize for IngestionError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// Column Aliases
/// ---------------------------------------------------------------------------

const NAME: &[&str] = &["Name", "name", "Namn"];
const FIRSTNAME: &[&str] = &["Firstname", "firstname", "First name", "Förnamn"];
const LASTNAME: &[&str] = &["Lastname", "lastname", "Last name", "Efternamn"];
const PERSONNUMMER: &[&str] = &["Personnummer", "personnummer"];
const GENDER: &[&str] = &["Gender", "gender", "Kön"];
const AGE: &[&str] = &["Age", "age", "Ålder"];
const DATE: &[&str] = &["Date", "date", "Datum"];

const HB: &[&str] = &["Hemoglobin", "Hb", "hb"];
const GLUCOSE: &[&str] = &["Glucose", "glucose", "Glukos"];
const HDL: &[&str] = &["HDL", "hdl"];
const LDL: &[&str] = &["LDL", "ldl"];
const TRIGLYCERIDES: &[&str] = &["Triglycerides", "Trig", "triglycerides", "Triglycerider"];
const TC_HDL_RATIO: &[&str] = &["TC/HDL", "tcHdlRatio", "TC/HDL Kvot"];
const LDL_HDL_RATIO: &[&str] = &["LDL/HDL", "ldlHdlRatio", "LDL/HDL Kvot"];

const SLEEP: &[&str] = &["Sleep", "sleep", "Sömn"];
const DIET: &[&str] = &["Diet", "diet", "Kost"];
const STRESS: &[&str] = &["Stress", "stress"];
const RELATIONSHIPS: &[&str] = &["Relationships", "relationships", "Relationer"];
const SMOKING: &[&str] = &["Smoking", "smoking", "Rökning"];
const BALANCE: &[&str] = &["Balance", "balance", "Balans"];
const EXERCISE: &[&str] = &["Exercise", "exercise", "Träning"];
const ALCOHOL: &[&str] = &["Alcohol", "alcohol", "Alkohol"];

const VO2_MAX: &[&str] = &["VO2 Max", "VO2Max", "vo2max", "VO₂ Max"];
const GRIP: &[&str] = &["Grip Strength", "GripStrength", "grip", "Greppstyrka"];

const BODY_FAT: &[&str] = &["Body Fat", "BodyFat", "bodyfat", "Kroppsfett"];
const MUSCLE_MASS: &[&str] = &["Muscle Mass", "MuscleMass", "muscle", "Muskelmassa"];
const VISCERAL_FAT: &[&str] = &["Visceral Fat", "VisceralFat", "Visceralt fett", "visceralfat"];
const WEIGHT: &[&str] = &["Weight", "weight", "Vikt"];
const HEIGHT: &[&str] = &["Height", "height", "Längd"];

const SYSTOLIC: &[&str] = &["Systolic", "BP Systolic", "systolic", "Systoliskt"];
const DIASTOLIC: &[&str] = &["Diastolic", "BP Diastolic", "diastolic", "Diastoliskt"];

/// Day zero of spreadsheet serial dates
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// ---------------------------------------------------------------------------
/// Personnummer
/// ---------------------------------------------------------------------------

/// What a Swedish national ID reveals about its holder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersonnummerInfo {
  pub gender: Option<Gender>,
  pub age: Option<u32>,
}

/// Parse `YYYYMMDD-XXXX` or `YYMMDD-XXXX`. Gender comes from the
/// second-to-last digit (odd = male); age is completed years at `today`.
pub fn parse_personnummer(pnr: &str, today: NaiveDate) -> PersonnummerInfo {
  let digits: Vec<u32> = pnr
    .chars()
    .filter(|c| !c.is_whitespace() && *c != '-')
    .map(|c| c.to_digit(10))
    .collect::<Option<Vec<u32>>>()
    .unwrap_or_default();
  if digits.len() < 10 {
    return PersonnummerInfo::default();
  }

  let num = |range: std::ops::Range<usize>| range.fold(0, |acc, i| acc * 10 + digits[i]);
  let (year, md) = if digits.len() >= 12 {
    (num(0..4) as i32, 4)
  } else {
    let yy = num(0..2) as i32;
    (if yy >= 30 { 1900 + yy } else { 2000 + yy }, 2)
  };

  let gender = if digits[digits.len() - 2] % 2 == 1 {
    Gender::Male
  } else {
    Gender::Female
  };

  let age = NaiveDate::from_ymd_opt(year, num(md..md + 2), num(md + 2..md + 4))
    .map(|birth| completed_years(birth, today))
    .filter(|&years| years > 0)
    .map(|years| years as u32);

  PersonnummerInfo {
    gender: Some(gender),
    age,
  }
}

fn completed_years(birth: NaiveDate, today: NaiveDate) -> i32 {
  let mut years = today.year() - birth.year();
  if (today.month(), today.day()) < (birth.month(), birth.day()) {
    years -= 1;
  }
  years
}

/// ---------------------------------------------------------------------------
/// Cell Coercion
/// ---------------------------------------------------------------------------

/// First alias with a non-blank value
fn lookup<'a>(row: &'a Row, aliases: &[&str]) -> Option<&'a Value> {
  aliases
    .iter()
    .filter_map(|key| row.get(*key))
    .find(|v| match v {
      Value::Null => false,
      Value::String(s) => !s.trim().is_empty(),
      _ => true,
    })
}

/// Numbers arrive as JSON numbers or as text, possibly with a decimal comma
fn as_number(value: &Value) -> Option<f64> {
  let n = match value {
    Value::Number(n) => n.as_f64(),
    Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
    _ => None,
  };
  n.filter(|v| v.is_finite())
}

fn as_text(value: &Value) -> Option<String> {
  match value {
    Value::String(s) => Some(s.trim().to_string()),
    Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// What a numeric column held
#[derive(Debug, Clone, PartialEq)]
enum Cell<'a> {
  Missing,
  Unreadable(&'a Value),
  Number(f64),
}

fn cell<'a>(row: &'a Row, aliases: &[&str]) -> Cell<'a> {
  match lookup(row, aliases) {
    None => Cell::Missing,
    Some(value) => as_number(value).map_or(Cell::Unreadable(value), Cell::Number),
  }
}

fn number(row: &Row, aliases: &[&str]) -> Option<f64> {
  match cell(row, aliases) {
    Cell::Number(v) => Some(v),
    Cell::Unreadable(value) => {
      warn!(column = aliases[0], value = %value, "unreadable number");
      None
    }
    Cell::Missing => None,
  }
}

/// Number with a fallback; logs one warning naming why the default was used
fn number_or(row: &Row, aliases: &[&str], default: f64) -> f64 {
  match cell(row, aliases) {
    Cell::Number(v) => v,
    Cell::Unreadable(value) => {
      warn!(column = aliases[0], value = %value, default, "unreadable number, using default");
      default
    }
    Cell::Missing => {
      warn!(column = aliases[0], default, "column missing, using default");
      default
    }
  }
}

/// Ratings are whole numbers on a 0-10 scale; fractions are truncated
fn rating_or(row: &Row, aliases: &[&str], default: u8) -> u8 {
  let value = number_or(row, aliases, f64::from(default));
  value.trunc().clamp(0.0, 10.0) as u8
}

fn text(row: &Row, aliases: &[&str]) -> Option<String> {
  lookup(row, aliases).and_then(as_text).filter(|s| !s.is_empty())
}

fn parse_date(value: &Value) -> Option<NaiveDate> {
  match value {
    Value::String(s) => {
      let s = s.trim();
      NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| s.get(..10).and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()))
    }
    // Spreadsheet serial day number
    Value::Number(n) => {
      let days = n.as_f64()?.trunc();
      if !(1.0..=2_958_465.0).contains(&days) {
        return None;
      }
      let (y, m, d) = SERIAL_EPOCH;
      NaiveDate::from_ymd_opt(y, m, d)?.checked_add_signed(Duration::days(days as i64))
    }
    _ => None,
  }
}

/// ---------------------------------------------------------------------------
/// Row Parsing
/// ---------------------------------------------------------------------------

/// Parse one row. `row_number` is 1-based and only used in errors.
pub fn parse_row(row: &Row, row_number: usize, today: NaiveDate) -> Result<HealthRecord, IngestionError> {
  let personnummer = text(row, PERSONNUMMER);
  let from_pnr = personnummer
    .as_deref()
    .map(|p| parse_personnummer(p, today))
    .unwrap_or_default();

  let gender = text(row, GENDER)
    .and_then(|g| g.parse::<Gender>().ok())
    .or(from_pnr.gender);
  let age = number(row, AGE)
    .filter(|a| *a >= 1.0)
    .map(|a| a.trunc() as u32)
    .or(from_pnr.age);

  let (mut firstname, mut lastname) = match text(row, NAME) {
    Some(full) => match full.split_once(char::is_whitespace) {
      Some((first, last)) => (Some(first.to_string()), Some(last.trim().to_string())),
      None => (Some(full), None),
    },
    None => (None, None),
  };
  if let Some(first) = text(row, FIRSTNAME) {
    firstname = Some(first);
  }
  if let Some(last) = text(row, LASTNAME) {
    lastname = Some(last);
  }

  let date = match lookup(row, DATE) {
    Some(value) => parse_date(value).ok_or_else(|| IngestionError::InvalidDate {
      row: row_number,
      value: as_text(value).unwrap_or_else(|| value.to_string()),
    })?,
    None => {
      debug!(row = row_number, %today, "no date, using reference date");
      today
    }
  };

  let hb = number(row, HB)
    .filter(|v| *v != 0.0)
    .ok_or(IngestionError::MissingField { row: row_number, field: "hemoglobin" })?;
  let glucose = number_or(row, GLUCOSE, 5.0);
  if glucose == 0.0 {
    return Err(IngestionError::MissingField { row: row_number, field: "glucose" });
  }
  let hdl = number_or(row, HDL, 1.3);
  if hdl <= 0.0 {
    return Err(IngestionError::NonPositiveHdl { row: row_number });
  }

  Ok(HealthRecord {
    blood_work: BloodWork {
      hb,
      glucose,
      hdl,
      ldl: number_or(row, LDL, 3.0),
      triglycerides: number_or(row, TRIGLYCERIDES, 1.5),
      tc_hdl_ratio: number(row, TC_HDL_RATIO),
      ldl_hdl_ratio: number(row, LDL_HDL_RATIO),
    },
    lifestyle: LifestyleRatings {
      sleep: rating_or(row, SLEEP, 7),
      diet: rating_or(row, DIET, 7),
      stress: rating_or(row, STRESS, 5),
      relationships: rating_or(row, RELATIONSHIPS, 7),
      smoking: rating_or(row, SMOKING, 10),
      balance: rating_or(row, BALANCE, 6),
      exercise: rating_or(row, EXERCISE, 6),
      alcohol: rating_or(row, ALCOHOL, 8),
    },
    fitness: FitnessTests {
      vo2_max: number_or(row, VO2_MAX, 30.0),
      grip_strength: number_or(row, GRIP, 25.0),
    },
    body_composition: BodyComposition {
      body_fat: number_or(row, BODY_FAT, 20.0),
      muscle_mass: number_or(row, MUSCLE_MASS, 40.0),
      visceral_fat: number_or(row, VISCERAL_FAT, 8.0),
      weight: number_or(row, WEIGHT, 75.0),
      height: number_or(row, HEIGHT, 175.0),
    },
    blood_pressure: BloodPressure {
      systolic: number_or(row, SYSTOLIC, 120.0),
      diastolic: number_or(row, DIASTOLIC, 80.0),
    },
    date,
    firstname,
    lastname,
    personnummer,
    age,
    gender,
  })
}

/// Parse every row and sort oldest-first. Rows sharing a date keep their
/// input order.
pub fn parse_rows(rows: &[Value], today: NaiveDate) -> Result<Vec<HealthRecord>, IngestionError> {
  if rows.is_empty() {
    return Err(IngestionError::Empty);
  }

  let mut records = rows
    .iter()
    .enumerate()
    .map(|(i, value)| {
      let row = value.as_object().ok_or(IngestionError::InvalidRow { row: i + 1 })?;
      parse_row(row, i + 1, today)
    })
    .collect::<Result<Vec<_>, _>>()?;

  records.sort_by_key(|r| r.date);
  Ok(records)
}

pub fn parse_json(text: &str, today: NaiveDate) -> Result<Vec<HealthRecord>, IngestionError> {
  let rows: Vec<Value> = serde_json::from_str(text)?;
  parse_rows(&rows, today)
}

pub fn load_file(path: &Path, today: NaiveDate) -> Result<Vec<HealthRecord>, IngestionError> {
  let text = std::fs::read_to_string(path)?;
  let records = parse_json(&text, today)?;
  info!(path = %path.display(), count = records.len(), "loaded health records");
  Ok(records)
}
