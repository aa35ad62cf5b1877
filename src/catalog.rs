//! The validated content catalog (categories -> games -> typed payloads, plus answer keys).
//!
//! Content is supplied whole at startup, either from `seeds` or a TOML file, and checked
//! once here. Controllers index into it freely afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::{AnswerKey, GameCategory, GameDefinition, GamePayload, GameType};
use crate::error::ContentError;
use crate::seeds::{seed_answer_keys, seed_categories};
use crate::util::slugify;

#[derive(Clone, Debug)]
pub struct Catalog {
  categories: Vec<GameCategory>,
  answer_keys: Vec<AnswerKey>,
}

/// On-disk TOML shape. `answer_keys` falls back to the built-in ones when omitted.
#[derive(Debug, Deserialize)]
struct CatalogFile {
  categories: Vec<GameCategory>,
  #[serde(default)]
  answer_keys: Vec<AnswerKey>,
}

/// Sidebar listing: no payloads.
#[derive(Clone, Debug, Serialize)]
pub struct CategorySummary {
  pub name: String,
  pub games: Vec<GameSummary>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
  pub index: usize,
  pub name: String,
  pub slug: String,
  pub game_type: GameType,
}

impl Catalog {
  /// Validate and index content. Empty slugs and missing answer keys are derived from the
  /// game name.
  pub fn new(mut categories: Vec<GameCategory>, answer_keys: Vec<AnswerKey>) -> Result<Self, ContentError> {
    if categories.is_empty() {
      return Err(ContentError::Empty);
    }
    if answer_keys.is_empty() {
      return Err(ContentError::invalid("answer keys", "at least one answer key is required"));
    }
    for key in &answer_keys {
      if key.columns.is_empty() || key.columns.iter().all(|c| c.is_empty()) {
        return Err(ContentError::invalid(&key.title, "answer key has no words"));
      }
    }
    let has_key = |slug: &str| answer_keys.iter().any(|k| k.slug == slug);

    let mut slugs = HashSet::new();
    for category in categories.iter_mut() {
      if category.games.is_empty() {
        return Err(ContentError::EmptyCategory { category: category.name.clone() });
      }
      for game in category.games.iter_mut() {
        if game.slug.trim().is_empty() {
          game.slug = slugify(&game.name);
        }
        if !slugs.insert(game.slug.clone()) {
          return Err(ContentError::DuplicateSlug(game.slug.clone()));
        }
        match &game.answer_key {
          Some(slug) if !has_key(slug) => {
            return Err(ContentError::invalid(&game.name, format!("unknown answer key '{}'", slug)));
          }
          Some(_) => {}
          None => game.answer_key = answer_key_for_name(&game.name).filter(|s| has_key(s)).map(str::to_string),
        }
        validate_game(game)?;
      }
    }
    Ok(Self { categories, answer_keys })
  }

  pub fn builtin() -> Result<Self, ContentError> {
    Self::new(seed_categories(), seed_answer_keys())
  }

  pub fn from_toml_str(raw: &str) -> Result<Self, ContentError> {
    let file: CatalogFile = toml::from_str(raw).map_err(|e| ContentError::Parse(e.to_string()))?;
    let keys = if file.answer_keys.is_empty() { seed_answer_keys() } else { file.answer_keys };
    Self::new(file.categories, keys)
  }

  /// Load from `path` if given, else the built-in seeds. Any problem is fatal to the caller.
  #[instrument(level = "info")]
  pub fn load(path: Option<&str>) -> Result<Self, ContentError> {
    let catalog = match path {
      Some(p) => {
        let raw = std::fs::read_to_string(p)
          .map_err(|e| ContentError::Io { path: p.to_string(), message: e.to_string() })?;
        Self::from_toml_str(&raw)?
      }
      None => Self::builtin()?,
    };
    let games: usize = catalog.categories.iter().map(|c| c.games.len()).sum();
    info!(target: "phonics_backend", source = path.unwrap_or("builtin"), categories = catalog.categories.len(), games, "Content catalog validated");
    Ok(catalog)
  }

  pub fn categories(&self) -> &[GameCategory] {
    &self.categories
  }

  pub fn game(&self, category: usize, game: usize) -> Option<&GameDefinition> {
    self.categories.get(category)?.games.get(game)
  }

  pub fn find_by_slug(&self, slug: &str) -> Option<(usize, usize, &GameDefinition)> {
    self.categories.iter().enumerate().find_map(|(ci, c)| {
      c.games.iter().enumerate().find(|(_, g)| g.slug == slug).map(|(gi, g)| (ci, gi, g))
    })
  }

  /// Answer key by slug; unknown or missing slugs get the first key.
  pub fn answer_key(&self, slug: Option<&str>) -> &AnswerKey {
    slug
      .and_then(|s| self.answer_keys.iter().find(|k| k.slug == s))
      .unwrap_or(&self.answer_keys[0])
  }

  pub fn summary(&self) -> Vec<CategorySummary> {
    self.categories
      .iter()
      .map(|c| CategorySummary {
        name: c.name.clone(),
        games: c.games
          .iter()
          .enumerate()
          .map(|(index, g)| GameSummary {
            index,
            name: g.name.clone(),
            slug: g.slug.clone(),
            game_type: g.game_type(),
          })
          .collect(),
      })
      .collect()
  }
}

/// Answer-key family a game belongs to, judged by its display name.
fn answer_key_for_name(name: &str) -> Option<&'static str> {
  let name = name.to_lowercase();
  if name.contains("fat cat") {
    Some("fat-cat-sat")
  } else if name.contains("bug on jug") {
    Some("bug-on-jug")
  } else if name.contains("ben bun") {
    Some("ben-bun")
  } else {
    None
  }
}

fn validate_game(game: &GameDefinition) -> Result<(), ContentError> {
  let name = game.name.as_str();
  match &game.payload {
    GamePayload::WordBuilding { words } => {
      if words.is_empty() {
        return Err(ContentError::invalid(name, "word building game has no words"));
      }
      for w in words {
        if w.letters.is_empty() || w.letters.iter().any(|l| l.chars().count() != 1) {
          return Err(ContentError::invalid(name, format!("'{}' needs one single-letter tile per position", w.word)));
        }
        let rebuilt: String = w.letters.concat();
        if rebuilt.to_lowercase() != w.word.to_lowercase() {
          return Err(ContentError::invalid(name, format!("tiles '{}' do not spell '{}'", rebuilt, w.word)));
        }
      }
    }
    GamePayload::Story { story } => {
      if story.sentences.is_empty() {
        return Err(ContentError::invalid(name, "story has no sentences"));
      }
      if !story.images.is_empty() && story.images.len() != story.sentences.len() {
        return Err(ContentError::invalid(
          name,
          format!("{} images for {} sentences", story.images.len(), story.sentences.len()),
        ));
      }
    }
    GamePayload::AuditoryProcessing { auditory } => {
      if auditory.slot_count == 0 {
        return Err(ContentError::invalid(name, "slot_count must be at least 1"));
      }
      if auditory.letters.len() < auditory.slot_count || auditory.letters.iter().any(|l| l.is_empty()) {
        return Err(ContentError::invalid(name, "letter pool is smaller than the slot count or has empty tiles"));
      }
      if auditory.correct_words.is_empty() {
        return Err(ContentError::invalid(name, "no accepted words"));
      }
      let pool: Vec<String> = auditory.letters.iter().map(|l| l.to_lowercase()).collect();
      for w in &auditory.correct_words {
        if !can_assemble(&w.to_lowercase(), &pool, auditory.slot_count) {
          return Err(ContentError::invalid(
            name,
            format!("'{}' cannot be built from the letter pool in {} slots", w, auditory.slot_count),
          ));
        }
      }
    }
    GamePayload::SoundBingo { cards } => {
      if cards.is_empty() {
        return Err(ContentError::invalid(name, "bingo game has no cards"));
      }
      for (i, card) in cards.iter().enumerate() {
        let width = card.grid.first().map(|r| r.len()).unwrap_or(0);
        if width == 0 || card.grid.iter().any(|r| r.len() != width) {
          return Err(ContentError::invalid(name, format!("card {} is not a non-empty rectangle", i)));
        }
        if card.grid.iter().flatten().any(|cell| cell.trim().is_empty()) {
          return Err(ContentError::invalid(name, format!("card {} has a blank cell", i)));
        }
      }
    }
    GamePayload::WordList { words } => {
      if words.is_empty() {
        return Err(ContentError::invalid(name, "word list is empty"));
      }
    }
  }
  Ok(())
}

/// Can `word` be spelled by exactly `slots` distinct tiles from `pool` (tiles may be multi-letter)?
pub fn can_assemble(word: &str, pool: &[String], slots: usize) -> bool {
  fn go(rest: &str, pool: &[String], used: &mut [bool], left: usize) -> bool {
    if left == 0 {
      return rest.is_empty();
    }
    for i in 0..pool.len() {
      if used[i] || pool[i].is_empty() || !rest.starts_with(pool[i].as_str()) {
        continue;
      }
      used[i] = true;
      if go(&rest[pool[i].len()..], pool, used, left - 1) {
        return true;
      }
      used[i] = false;
    }
    false
  }
  let mut used = vec![false; pool.len()];
  go(word, pool, &mut used, slots)
}
