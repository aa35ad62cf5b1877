//! Domain models used by the backend: game catalog entries, tiles, students and variants.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sidebar group of games ("Word Building", "Sound Bingo", ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameCategory {
  pub name: String,
  pub games: Vec<GameDefinition>,
}

/// One playable game. The payload is tagged by `game_type`, so a definition can never
/// carry more than one kind of content.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameDefinition {
  pub name: String,
  #[serde(default)]
  pub slug: String,
  /// Answer-key slug for the teacher link.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub answer_key: Option<String>,
  #[serde(flatten)]
  pub payload: GamePayload,
}

impl GameDefinition {
  pub fn game_type(&self) -> GameType {
    self.payload.game_type()
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "game_type", rename_all = "snake_case")]
pub enum GamePayload {
  WordBuilding { words: Vec<WordData> },
  Story { story: Story },
  AuditoryProcessing { auditory: AuditoryProcessingData },
  SoundBingo { cards: Vec<BingoCard> },
  WordList { words: Vec<String> },
}

impl GamePayload {
  pub fn game_type(&self) -> GameType {
    match self {
      GamePayload::WordBuilding { .. } => GameType::WordBuilding,
      GamePayload::Story { .. } => GameType::Story,
      GamePayload::AuditoryProcessing { .. } => GameType::AuditoryProcessing,
      GamePayload::SoundBingo { .. } => GameType::SoundBingo,
      GamePayload::WordList { .. } => GameType::WordList,
    }
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
  WordBuilding,
  Story,
  AuditoryProcessing,
  SoundBingo,
  WordList,
}

/// Target word for a word-building round. `letters` is the tile bag in word order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordData {
  pub word: String,
  pub letters: Vec<String>,
  #[serde(default)]
  pub image: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Story {
  pub sentences: Vec<String>,
  #[serde(default)]
  pub images: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditoryProcessingData {
  pub letters: Vec<String>,
  pub correct_words: Vec<String>,
  #[serde(default = "default_slot_count")]
  pub slot_count: usize,
}

fn default_slot_count() -> usize { 3 }

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BingoCard {
  pub grid: Vec<Vec<String>>,
}

/// A draggable tile. Ids are fresh per render so two tiles with the same letter stay distinct.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LetterTile {
  pub id: String,
  pub letter: String,
  pub original_index: usize,
}

impl LetterTile {
  pub fn fresh(letter: &str, original_index: usize) -> Self {
    Self {
      id: Uuid::new_v4().to_string(),
      letter: letter.to_lowercase(),
      original_index,
    }
  }
}

/// Teacher-facing answer key for a game family (two columns of words).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnswerKey {
  pub slug: String,
  pub title: String,
  pub columns: Vec<Vec<String>>,
}

/// Which sitting of the assessment battery a result belongs to.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
  #[default]
  Pretest,
  Posttest,
}

impl Variant {
  pub fn as_str(&self) -> &'static str {
    match self {
      Variant::Pretest => "pretest",
      Variant::Posttest => "posttest",
    }
  }

  /// Lenient query-string parsing: anything other than "posttest" means pretest.
  pub fn from_query(raw: Option<&str>) -> Self {
    match raw {
      Some("posttest") => Variant::Posttest,
      _ => Variant::Pretest,
    }
  }
}

impl fmt::Display for Variant {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Grade {
  #[serde(rename = "Grade 1")] One,
  #[serde(rename = "Grade 2")] Two,
  #[serde(rename = "Grade 3")] Three,
  #[serde(rename = "Grade 4")] Four,
  #[serde(rename = "Grade 5")] Five,
  #[serde(rename = "Grade 6")] Six,
  #[serde(rename = "Grade 7")] Seven,
  #[serde(rename = "Grade 8")] Eight,
}

impl Grade {
  pub const ALL: [Grade; 8] = [
    Grade::One, Grade::Two, Grade::Three, Grade::Four,
    Grade::Five, Grade::Six, Grade::Seven, Grade::Eight,
  ];

  pub fn level(&self) -> u8 {
    match self {
      Grade::One => 1,
      Grade::Two => 2,
      Grade::Three => 3,
      Grade::Four => 4,
      Grade::Five => 5,
      Grade::Six => 6,
      Grade::Seven => 7,
      Grade::Eight => 8,
    }
  }
}

impl fmt::Display for Grade {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Grade {}", self.level())
  }
}

impl FromStr for Grade {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Grade::ALL
      .iter()
      .copied()
      .find(|g| g.to_string() == s.trim())
      .ok_or_else(|| format!("unknown grade '{}'", s))
  }
}

/// Roster entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Student {
  pub id: u64,
  pub name: String,
  pub grade: Grade,
  pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewStudent {
  pub name: String,
  pub grade: String,
}
