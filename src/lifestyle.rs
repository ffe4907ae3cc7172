//! Lifestyle items, focus areas and the progress summary shown on a report

use serde::{Deserialize, Serialize};

use crate::models::LifestyleRatings;

pub const DEFAULT_MAX_FOCUS_AREAS: usize = 3;

/// ---------------------------------------------------------------------------
/// Keys and Items
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusAreaKey {
  Sleep,
  Diet,
  Stress,
  Relationships,
  Smoking,
  Balance,
  Exercise,
  Alcohol,
}

impl FocusAreaKey {
  /// Report order
  pub const ALL: [FocusAreaKey; 8] = [
    FocusAreaKey::Sleep,
    FocusAreaKey::Diet,
    FocusAreaKey::Stress,
    FocusAreaKey::Relationships,
    FocusAreaKey::Smoking,
    FocusAreaKey::Balance,
    FocusAreaKey::Exercise,
    FocusAreaKey::Alcohol,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      FocusAreaKey::Sleep => "sleep",
      FocusAreaKey::Diet => "diet",
      FocusAreaKey::Stress => "stress",
      FocusAreaKey::Relationships => "relationships",
      FocusAreaKey::Smoking => "smoking",
      FocusAreaKey::Balance => "balance",
      FocusAreaKey::Exercise => "exercise",
      FocusAreaKey::Alcohol => "alcohol",
    }
  }

  pub fn rating(&self, lifestyle: &LifestyleRatings) -> u8 {
    match self {
      FocusAreaKey::Sleep => lifestyle.sleep,
      FocusAreaKey::Diet => lifestyle.diet,
      FocusAreaKey::Stress => lifestyle.stress,
      FocusAreaKey::Relationships => lifestyle.relationships,
      FocusAreaKey::Smoking => lifestyle.smoking,
      FocusAreaKey::Balance => lifestyle.balance,
      FocusAreaKey::Exercise => lifestyle.exercise,
      FocusAreaKey::Alcohol => lifestyle.alcohol,
    }
  }

  /// Label used in the lifestyle list of a report
  pub fn item_label(&self) -> &'static str {
    match self {
      FocusAreaKey::Balance => "Balans arbete/fritid",
      other => focus_area(*other).label,
    }
  }
}

impl std::fmt::Display for FocusAreaKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for FocusAreaKey {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    FocusAreaKey::ALL
      .into_iter()
      .find(|k| k.as_str().eq_ignore_ascii_case(s) || focus_area(*k).label.eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("Unknown focus area: {}", s))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
  #[serde(rename = "status-good")]
  Good,
  #[serde(rename = "status-mid")]
  Mid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LifestyleItem {
  pub key: FocusAreaKey,
  pub label: &'static str,
  pub value: u8,
  pub status: ItemStatus,
}

pub fn lifestyle_items(lifestyle: &LifestyleRatings) -> [LifestyleItem; 8] {
  FocusAreaKey::ALL.map(|key| LifestyleItem {
    key,
    label: key.item_label(),
    value: key.rating(lifestyle),
    status: match key {
      FocusAreaKey::Stress | FocusAreaKey::Alcohol => ItemStatus::Mid,
      _ => ItemStatus::Good,
    },
  })
}

/// ---------------------------------------------------------------------------
/// Focus Areas
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
  pub key: FocusAreaKey,
  pub label: &'static str,
  pub icon_name: &'static str,
  pub description: &'static str,
}

const fn area(key: FocusAreaKey, label: &'static str, icon_name: &'static str, description: &'static str) -> FocusArea {
  FocusArea { key, label, icon_name, description }
}

pub static FOCUS_AREAS: [FocusArea; 8] = [
  area(FocusAreaKey::Sleep, "Sömn", "Moon", "Förbättra sömnkvalitet och rutiner"),
  area(FocusAreaKey::Diet, "Kost", "Apple", "Balanserad näring för optimal hälsa"),
  area(FocusAreaKey::Stress, "Stress", "Brain", "Hantera stress och återhämtning"),
  area(FocusAreaKey::Relationships, "Relationer", "Heart", "Socialt välmående och relationer"),
  area(FocusAreaKey::Smoking, "Rökning", "Cigarette", "Minska eller sluta röka"),
  area(FocusAreaKey::Balance, "Balans", "Scale", "Balans mellan arbete och fritid"),
  area(FocusAreaKey::Exercise, "Träning", "Dumbbell", "Regelbunden fysisk aktivitet"),
  area(FocusAreaKey::Alcohol, "Alkohol", "Wine", "Hållbara alkoholvanor"),
];

pub fn focus_area(key: FocusAreaKey) -> &'static FocusArea {
  &FOCUS_AREAS[key as usize]
}

/// Quote printed under the first selected focus area
pub fn focus_tip(key: FocusAreaKey) -> &'static str {
  match key {
    FocusAreaKey::Sleep => "En god natts sömn är kroppens viktigaste återhämtning. Sikta på 7–8 timmar regelbundet.",
    FocusAreaKey::Diet => "Maten du äter är information till din kropp, välj den med omsorg.",
    FocusAreaKey::Stress => "Fem minuters djupandning per dag kan sänka stressnivåer och förbättra sömnkvaliteten.",
    FocusAreaKey::Relationships => "Starka sociala band är en av de kraftfullaste skyddsfaktorerna för långsiktig hälsa.",
    FocusAreaKey::Smoking => "Varje rökfri dag stärker ditt hjärta, dina lungor och din kondition märkbart.",
    FocusAreaKey::Balance => "Återhämtning är inte lättja, det är en förutsättning för prestation och välmående.",
    FocusAreaKey::Exercise => "Regelbunden rörelse förbättrar kondition, hormoner och humör på bara några veckor.",
    FocusAreaKey::Alcohol => "Att minska alkoholen förbättrar sömn, energi och leverparametrar redan på kort sikt.",
  }
}

/// Ordered set of chosen focus areas with an upper bound
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FocusSelection {
  keys: Vec<FocusAreaKey>,
  max: usize,
}

impl Default for FocusSelection {
  fn default() -> Self {
    Self::new(DEFAULT_MAX_FOCUS_AREAS)
  }
}

impl FocusSelection {
  pub fn new(max: usize) -> Self {
    Self {
      keys: Vec::with_capacity(max),
      max,
    }
  }

  /// Toggle each key in turn; keys past the limit are dropped
  pub fn from_keys<I: IntoIterator<Item = FocusAreaKey>>(keys: I, max: usize) -> Self {
    let mut selection = Self::new(max);
    for key in keys {
      if !selection.contains(key) {
        selection.toggle(key);
      }
    }
    selection
  }

  /// Deselects a selected key, otherwise selects it if there is room.
  /// Returns whether the key is selected afterwards.
  pub fn toggle(&mut self, key: FocusAreaKey) -> bool {
    if let Some(pos) = self.keys.iter().position(|k| *k == key) {
      self.keys.remove(pos);
      return false;
    }
    if self.is_full() {
      return false;
    }
    self.keys.push(key);
    true
  }

  pub fn contains(&self, key: FocusAreaKey) -> bool {
    self.keys.contains(&key)
  }

  pub fn is_full(&self) -> bool {
    self.keys.len() >= self.max
  }

  pub fn keys(&self) -> &[FocusAreaKey] {
    &self.keys
  }

  pub fn max(&self) -> usize {
    self.max
  }

  pub fn areas(&self) -> Vec<FocusArea> {
    self.keys.iter().map(|k| *focus_area(*k)).collect()
  }
}

/// ---------------------------------------------------------------------------
/// Progress Summary
/// ---------------------------------------------------------------------------

/// More tied top improvements than this are summarised in one line
const MAX_LISTED_IMPROVEMENTS: usize = 3;
const STRENGTHS_SHOWN: usize = 2;

const BROAD_PROGRESS_INSIGHT: &str =
  "Bred förbättring över flera områden visar på en positiv helhetsutveckling.";

fn progress_insight(key: FocusAreaKey) -> &'static str {
  match key {
    FocusAreaKey::Sleep => "Bättre sömn stärker immunförsvaret och den mentala återhämtningen.",
    FocusAreaKey::Diet => "Förbättrad kost ger kroppen rätt förutsättningar för optimal hälsa.",
    FocusAreaKey::Stress => "Lägre stressnivå har en direkt positiv effekt på hjärta och sömn.",
    FocusAreaKey::Relationships => "Starka relationer är en av de viktigaste faktorerna för långsiktig hälsa.",
    FocusAreaKey::Smoking => "Minskad rökning förbättrar syreupptagning och kärlhälsa markant.",
    FocusAreaKey::Balance => "Bättre balans mellan arbete och fritid stärker den mentala hälsan.",
    FocusAreaKey::Exercise => "Ökad träning förbättrar kondition, sömn och stresshantering.",
    FocusAreaKey::Alcohol => "Minskat alkoholintag gynnar lever, sömn och övergripande hälsa.",
  }
}

fn strength_insight(key: FocusAreaKey) -> &'static str {
  match key {
    FocusAreaKey::Sleep => "Din goda sömn är en stark grund för övrig hälsa.",
    FocusAreaKey::Diet => "Din kost ger kroppen utmärkta förutsättningar.",
    FocusAreaKey::Stress => "Din låga stressnivå skyddar hjärta och immunförsvar.",
    FocusAreaKey::Relationships => "Dina starka relationer bidrar till långsiktig hälsa.",
    FocusAreaKey::Smoking => "Ditt tobaksfria liv ger stor hälsonytta.",
    FocusAreaKey::Balance => "Din balans mellan arbete och fritid stärker välmåendet.",
    FocusAreaKey::Exercise => "Dina träningsvanor stärker kondition och mental hälsa.",
    FocusAreaKey::Alcohol => "Dina alkoholvanor gynnar din övergripande hälsa.",
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemChange {
  pub key: FocusAreaKey,
  pub label: &'static str,
  pub value: u8,
  pub diff: i16,
}

/// What the lifestyle card highlights: the largest raw rating increases
/// since the previous visit, or the two best ratings when nothing rose
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LifestyleHighlight {
  Progress {
    items: Vec<ItemChange>,
    insight: &'static str,
  },
  BroadProgress {
    improved: usize,
    total: usize,
    diff: i16,
    insight: &'static str,
  },
  Strengths {
    items: Vec<LifestyleItem>,
    insight: &'static str,
  },
}

impl LifestyleHighlight {
  pub fn compute(current: &LifestyleRatings, previous: Option<&LifestyleRatings>) -> Self {
    let items = lifestyle_items(current);

    let mut improvements: Vec<ItemChange> = match previous {
      Some(prev) => items
        .iter()
        .map(|item| ItemChange {
          key: item.key,
          label: item.label,
          value: item.value,
          diff: item.value as i16 - item.key.rating(prev) as i16,
        })
        .filter(|c| c.diff > 0)
        .collect(),
      None => Vec::new(),
    };

    if improvements.is_empty() {
      let mut strengths = items.to_vec();
      strengths.sort_by(|a, b| b.value.cmp(&a.value));
      strengths.truncate(STRENGTHS_SHOWN);
      let insight = strength_insight(strengths[0].key);
      return LifestyleHighlight::Strengths { items: strengths, insight };
    }

    improvements.sort_by(|a, b| b.diff.cmp(&a.diff));
    let top = improvements[0].diff;
    improvements.retain(|c| c.diff == top);

    if improvements.len() > MAX_LISTED_IMPROVEMENTS {
      LifestyleHighlight::BroadProgress {
        improved: improvements.len(),
        total: items.len(),
        diff: top,
        insight: BROAD_PROGRESS_INSIGHT,
      }
    } else {
      let insight = progress_insight(improvements[0].key);
      LifestyleHighlight::Progress { items: improvements, insight }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_utils::{sample_record, visit_history};

  #[test]
  fn test_items_follow_report_order() {
    let items = lifestyle_items(&sample_record().lifestyle);
    let labels: Vec<&str> = items.iter().map(|i| i.label).collect();
    assert_eq!(
      labels,
      vec!["Sömn", "Kost", "Stress", "Relationer", "Rökning", "Balans arbete/fritid", "Träning", "Alkohol"]
    );
    assert_eq!(items[7].value, 9);
    assert_eq!(items[2].status, ItemStatus::Mid);
    assert_eq!(items[0].status, ItemStatus::Good);
  }

  #[test]
  fn test_catalogue_lookup() {
    for key in FocusAreaKey::ALL {
      assert_eq!(focus_area(key).key, key);
    }
    assert_eq!(focus_area(FocusAreaKey::Alcohol).icon_name, "Wine");
    assert_eq!("Träning".parse::<FocusAreaKey>(), Ok(FocusAreaKey::Exercise));
    assert_eq!("SLEEP".parse::<FocusAreaKey>(), Ok(FocusAreaKey::Sleep));
    assert!("yoga".parse::<FocusAreaKey>().is_err());
  }

  #[test]
  fn test_selection_toggle() {
    let mut selection = FocusSelection::default();

    assert!(selection.toggle(FocusAreaKey::Sleep));
    assert!(selection.toggle(FocusAreaKey::Diet));
    assert!(selection.toggle(FocusAreaKey::Stress));

    // Full: further additions are ignored
    assert!(!selection.toggle(FocusAreaKey::Alcohol));
    assert_eq!(selection.keys().len(), 3);

    // Toggling a selected key removes it and frees a slot
    assert!(!selection.toggle(FocusAreaKey::Diet));
    assert!(selection.toggle(FocusAreaKey::Alcohol));
    assert_eq!(
      selection.keys(),
      &[FocusAreaKey::Sleep, FocusAreaKey::Stress, FocusAreaKey::Alcohol]
    );
  }

  #[test]
  fn test_selection_from_keys_ignores_duplicates() {
    let selection = FocusSelection::from_keys(
      [FocusAreaKey::Sleep, FocusAreaKey::Sleep, FocusAreaKey::Diet, FocusAreaKey::Smoking],
      2,
    );
    assert_eq!(selection.keys(), &[FocusAreaKey::Sleep, FocusAreaKey::Diet]);
    assert_eq!(selection.areas()[1].label, "Kost");
  }

  #[test]
  fn test_highlight_lists_tied_top_improvements() {
    let history = visit_history();

    // Arrange: visit 3 vs visit 2 raises sleep, balance and exercise by 2
    let highlight = LifestyleHighlight::compute(&history[2].lifestyle, Some(&history[1].lifestyle));

    // Assert
    match highlight {
      LifestyleHighlight::Progress { items, insight } => {
        let keys: Vec<FocusAreaKey> = items.iter().map(|c| c.key).collect();
        assert_eq!(keys, vec![FocusAreaKey::Sleep, FocusAreaKey::Balance, FocusAreaKey::Exercise]);
        assert!(items.iter().all(|c| c.diff == 2));
        assert_eq!(insight, progress_insight(FocusAreaKey::Sleep));
      }
      other => panic!("expected progress, got {:?}", other),
    }
  }

  #[test]
  fn test_highlight_summarises_broad_progress() {
    let previous = LifestyleRatings {
      sleep: 5,
      diet: 5,
      stress: 5,
      relationships: 5,
      smoking: 5,
      balance: 5,
      exercise: 5,
      alcohol: 5,
    };
    let current = LifestyleRatings { sleep: 6, diet: 6, stress: 6, relationships: 6, ..previous };

    let highlight = LifestyleHighlight::compute(&current, Some(&previous));
    assert_eq!(
      highlight,
      LifestyleHighlight::BroadProgress {
        improved: 4,
        total: 8,
        diff: 1,
        insight: BROAD_PROGRESS_INSIGHT
      }
    );
  }

  #[test]
  fn test_highlight_falls_back_to_strengths() {
    let record = sample_record();

    let highlight = LifestyleHighlight::compute(&record.lifestyle, None);

    match highlight {
      LifestyleHighlight::Strengths { items, insight } => {
        // Smoking 10, then alcohol 9
        assert_eq!(items[0].key, FocusAreaKey::Smoking);
        assert_eq!(items[1].key, FocusAreaKey::Alcohol);
        assert_eq!(insight, strength_insight(FocusAreaKey::Smoking));
      }
      other => panic!("expected strengths, got {:?}", other),
    }
  }

  #[test]
  fn test_focus_tip_available_for_every_area() {
    for key in FocusAreaKey::ALL {
      assert!(!focus_tip(key).is_empty());
    }
  }
}
