//! Game sessions: one per open games screen.
//!
//! `GameSession` owns navigation (category/game selection) and the active controller, and is
//! only mutated through `apply` (client events) and `fire` (expired timers). The whole thing
//! serializes as the snapshot the client renders.

pub mod auditory;
pub mod bingo;
pub mod story;
pub mod word_building;
pub mod word_list;

use std::sync::Arc;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::catalog::Catalog;
use crate::config::Timings;
use crate::domain::{GameDefinition, GamePayload, GameType};
use crate::error::GameError;
use crate::pages::PageRoute;
use crate::timer::{Scheduled, TimerBook};

use self::auditory::AuditoryAssembly;
use self::bingo::BingoBoard;
use self::story::StoryReader;
use self::word_building::{Feedback, WordBuilding};
use self::word_list::WordListSlideshow;

/// Everything a games screen can ask for.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
  SelectGame { category: usize, game: usize },
  /// Word building and auditory assembly.
  DropTile { tile_id: String, slot: usize },
  NextWord,
  PrevWord,
  DismissSuccess,
  BingoClick { row: usize, col: usize },
  BingoRightClick { row: usize, col: usize },
  BingoReset,
  SelectBingoCard { card: usize },
  NextSentence,
  PrevSentence,
  ResetStory,
  NextSlide,
  PrevSlide,
  GoToSlide { index: usize },
  ResetSlides,
}

impl GameEvent {
  pub fn name(&self) -> &'static str {
    match self {
      GameEvent::SelectGame { .. } => "select_game",
      GameEvent::DropTile { .. } => "drop_tile",
      GameEvent::NextWord => "next_word",
      GameEvent::PrevWord => "prev_word",
      GameEvent::DismissSuccess => "dismiss_success",
      GameEvent::BingoClick { .. } => "bingo_click",
      GameEvent::BingoRightClick { .. } => "bingo_right_click",
      GameEvent::BingoReset => "bingo_reset",
      GameEvent::SelectBingoCard { .. } => "select_bingo_card",
      GameEvent::NextSentence => "next_sentence",
      GameEvent::PrevSentence => "prev_sentence",
      GameEvent::ResetStory => "reset_story",
      GameEvent::NextSlide => "next_slide",
      GameEvent::PrevSlide => "prev_slide",
      GameEvent::GoToSlide { .. } => "go_to_slide",
      GameEvent::ResetSlides => "reset_slides",
    }
  }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "game_type", rename_all = "snake_case")]
pub enum ActiveGame {
  WordBuilding(WordBuilding),
  Story(StoryReader),
  AuditoryProcessing(AuditoryAssembly),
  SoundBingo(BingoBoard),
  WordList(WordListSlideshow),
}

impl ActiveGame {
  pub fn game_type(&self) -> GameType {
    match self {
      ActiveGame::WordBuilding(_) => GameType::WordBuilding,
      ActiveGame::Story(_) => GameType::Story,
      ActiveGame::AuditoryProcessing(_) => GameType::AuditoryProcessing,
      ActiveGame::SoundBingo(_) => GameType::SoundBingo,
      ActiveGame::WordList(_) => GameType::WordList,
    }
  }
}

/// Derived word-building feedback sent next to the snapshot.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WordFeedback {
  pub border: Feedback,
  pub slot_errors: Vec<bool>,
}

#[derive(Debug, Serialize)]
pub struct GameSession {
  #[serde(skip)]
  catalog: Arc<Catalog>,
  #[serde(skip)]
  timings: Timings,
  #[serde(skip)]
  timers: TimerBook,
  #[serde(skip)]
  rng: StdRng,
  category_index: usize,
  game_index: usize,
  game_name: String,
  game_slug: String,
  /// Teacher answer key for this game's family, when it has one.
  answer_key_url: Option<String>,
  active: ActiveGame,
}

impl GameSession {
  /// Starts on the first game of the first category.
  pub fn new(catalog: Arc<Catalog>, timings: Timings, mut rng: StdRng) -> Self {
    let first = &catalog.categories()[0].games[0];
    let active = build_active(&first.payload, &timings, &mut rng);
    let (game_name, game_slug) = (first.name.clone(), first.slug.clone());
    let answer_key_url = answer_key_url(first);
    Self {
      catalog,
      timings,
      timers: TimerBook::new(),
      rng,
      category_index: 0,
      game_index: 0,
      game_name,
      game_slug,
      answer_key_url,
      active,
    }
  }

  pub fn active(&self) -> &ActiveGame { &self.active }
  pub fn selection(&self) -> (usize, usize) { (self.category_index, self.game_index) }

  /// Switch game. Always rebuilds controller state, even when re-selecting the same game.
  #[instrument(level = "debug", skip(self))]
  pub fn select_game(&mut self, category: usize, game: usize) -> Result<(), GameError> {
    let def = self
      .catalog
      .game(category, game)
      .ok_or(GameError::NoSuchGame { category, game })?
      .clone();
    self.timers.cancel_all();
    self.active = build_active(&def.payload, &self.timings, &mut self.rng);
    self.category_index = category;
    self.game_index = game;
    self.answer_key_url = answer_key_url(&def);
    self.game_name = def.name;
    self.game_slug = def.slug;
    info!(target: "game", category, game, slug = %self.game_slug, game_type = ?self.active.game_type(), "Game selected");
    Ok(())
  }

  /// Apply one client event. `now_ms` is a monotonic clock used for bingo double clicks.
  #[instrument(level = "debug", skip(self, event), fields(event = event.name()))]
  pub fn apply(&mut self, event: GameEvent, now_ms: u64) -> Result<(), GameError> {
    if let GameEvent::SelectGame { category, game } = event {
      return self.select_game(category, game);
    }
    let event_name = event.name();
    let timings = self.timings;

    match (event, &mut self.active) {
      (GameEvent::DropTile { tile_id, slot }, ActiveGame::WordBuilding(wb)) => {
        let outcome = wb.round_mut().drop_tile(&tile_id, slot, &mut self.timers, &timings);
        debug!(target: "game", ?outcome, slot, "Word-building drop");
      }
      (GameEvent::DropTile { tile_id, slot }, ActiveGame::AuditoryProcessing(a)) => {
        let outcome = a.drop_tile(&tile_id, slot, &mut self.timers, &timings);
        debug!(target: "game", ?outcome, slot, "Auditory drop");
      }
      (GameEvent::NextWord, ActiveGame::WordBuilding(wb)) => {
        wb.next_word(&mut self.rng, &mut self.timers);
      }
      (GameEvent::PrevWord, ActiveGame::WordBuilding(wb)) => {
        wb.prev_word(&mut self.rng, &mut self.timers);
      }
      (GameEvent::DismissSuccess, ActiveGame::WordBuilding(wb)) => wb.round_mut().dismiss_success(),

      (GameEvent::BingoClick { row, col }, ActiveGame::SoundBingo(b)) => {
        b.click(row, col, now_ms);
      }
      (GameEvent::BingoRightClick { row, col }, ActiveGame::SoundBingo(b)) => {
        b.right_click(row, col);
      }
      (GameEvent::BingoReset, ActiveGame::SoundBingo(b)) => b.reset(),
      (GameEvent::SelectBingoCard { card }, ActiveGame::SoundBingo(b)) => {
        b.select_card(card);
      }

      (GameEvent::NextSentence, ActiveGame::Story(s)) => s.next(&mut self.timers, timings.story_success_ms),
      (GameEvent::PrevSentence, ActiveGame::Story(s)) => {
        s.prev();
      }
      (GameEvent::ResetStory, ActiveGame::Story(s)) => s.reset(),

      (GameEvent::NextSlide, ActiveGame::WordList(w)) => {
        w.next();
      }
      (GameEvent::PrevSlide, ActiveGame::WordList(w)) => {
        w.prev();
      }
      (GameEvent::GoToSlide { index }, ActiveGame::WordList(w)) => {
        w.go_to(index);
      }
      (GameEvent::ResetSlides, ActiveGame::WordList(w)) => w.reset(),

      (_, active) => {
        return Err(GameError::WrongGameType { event: event_name, active: active.game_type() });
      }
    }
    Ok(())
  }

  /// Deliver an expired timer. Stale tokens are dropped; true if state changed.
  pub fn fire(&mut self, token: &Scheduled) -> bool {
    if !self.timers.accept(token) {
      debug!(target: "game", kind = ?token.kind, "Dropped stale timer");
      return false;
    }
    match &mut self.active {
      ActiveGame::WordBuilding(wb) => wb.round_mut().on_timer(token.kind),
      ActiveGame::AuditoryProcessing(a) => a.on_timer(token.kind),
      ActiveGame::Story(s) => s.on_timer(token.kind),
      ActiveGame::SoundBingo(_) | ActiveGame::WordList(_) => {}
    }
    true
  }

  /// Timers requested since the last call; the caller arms them.
  pub fn take_timers(&mut self) -> Vec<Scheduled> {
    self.timers.drain()
  }

  pub fn word_feedback(&self) -> Option<WordFeedback> {
    match &self.active {
      ActiveGame::WordBuilding(wb) => Some(WordFeedback {
        border: wb.round().feedback(),
        slot_errors: wb.round().slot_errors(),
      }),
      _ => None,
    }
  }
}

fn answer_key_url(def: &GameDefinition) -> Option<String> {
  def.answer_key.as_ref().map(|slug| PageRoute::AnswerKey { game: slug.clone(), variant: None }.url())
}

fn build_active(payload: &GamePayload, timings: &Timings, rng: &mut StdRng) -> ActiveGame {
  match payload {
    GamePayload::WordBuilding { words } => ActiveGame::WordBuilding(WordBuilding::new(words.clone(), rng)),
    GamePayload::Story { story } => ActiveGame::Story(StoryReader::new(story.clone())),
    GamePayload::AuditoryProcessing { auditory } => ActiveGame::AuditoryProcessing(AuditoryAssembly::new(auditory)),
    GamePayload::SoundBingo { cards } => ActiveGame::SoundBingo(BingoBoard::new(cards.clone(), timings.bingo_double_click_ms)),
    GamePayload::WordList { words } => ActiveGame::WordList(WordListSlideshow::new(words.clone())),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::bingo::CellColor;
  use crate::timer::TimerKind;
  use rand::SeedableRng;

  fn session() -> GameSession {
    let catalog = Arc::new(Catalog::builtin().unwrap());
    GameSession::new(catalog, Timings::default(), StdRng::seed_from_u64(42))
  }

  fn select(s: &mut GameSession, slug: &str) {
    let (c, g, _) = s.catalog.find_by_slug(slug).unwrap();
    s.apply(GameEvent::SelectGame { category: c, game: g }, 0).unwrap();
  }

  fn word_tile(s: &GameSession, letter: &str) -> String {
    match s.active() {
      ActiveGame::WordBuilding(wb) => wb.round().available().iter().find(|t| t.letter == letter).unwrap().id.clone(),
      other => panic!("expected word building, got {:?}", other.game_type()),
    }
  }

  fn auditory_tile(s: &GameSession, letter: &str) -> String {
    match s.active() {
      ActiveGame::AuditoryProcessing(a) => a.available().iter().find(|t| t.letter == letter).unwrap().id.clone(),
      other => panic!("expected auditory, got {:?}", other.game_type()),
    }
  }

  #[test]
  fn starts_on_first_word_building_game() {
    let s = session();
    assert_eq!(s.selection(), (0, 0));
    assert_eq!(s.active().game_type(), GameType::WordBuilding);
    assert_eq!(s.word_feedback().unwrap().border, Feedback::Neutral);
  }

  #[test]
  fn events_for_another_game_type_are_errors() {
    let mut s = session();
    let err = s.apply(GameEvent::NextSentence, 0).unwrap_err();
    assert_eq!(err, GameError::WrongGameType { event: "next_sentence", active: GameType::WordBuilding });
    assert!(matches!(
      s.apply(GameEvent::SelectGame { category: 99, game: 0 }, 0),
      Err(GameError::NoSuchGame { .. })
    ));
  }

  #[test]
  fn stale_timer_from_previous_game_is_dropped() {
    let mut s = session();
    let wrong = word_tile(&s, "a");
    s.apply(GameEvent::DropTile { tile_id: wrong, slot: 0 }, 0).unwrap();
    let flash = s.take_timers();
    assert_eq!(flash[0].kind, TimerKind::ClearIncorrectFlash);

    select(&mut s, "auditory-fat-cat-sat");
    for (letter, slot) in [("c", 0), ("o", 1), ("t", 2)] {
      let id = auditory_tile(&s, letter);
      s.apply(GameEvent::DropTile { tile_id: id, slot }, 0).unwrap();
    }
    assert!(!s.fire(&flash[0]));
    let advance = s.take_timers();
    assert!(s.fire(&advance[0]));
    match s.active() {
      ActiveGame::AuditoryProcessing(a) => assert_eq!(a.completed_words(), 1),
      _ => unreachable!(),
    }
  }

  #[test]
  fn word_change_mid_delay_leaves_new_round_untouched() {
    let mut s = session();
    for (letter, slot) in [("c", 0), ("a", 1), ("t", 2)] {
      let id = word_tile(&s, letter);
      s.apply(GameEvent::DropTile { tile_id: id, slot }, 0).unwrap();
    }
    let popup = s.take_timers();
    s.apply(GameEvent::NextWord, 0).unwrap();
    assert!(!s.fire(&popup[0]));
    match s.active() {
      ActiveGame::WordBuilding(wb) => {
        assert_eq!(wb.word_index(), 1);
        assert!(!wb.round().show_success_popup());
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn bingo_uses_session_clock_and_resets_on_game_change() {
    let mut s = session();
    select(&mut s, "bingo-fat-cat");
    s.apply(GameEvent::BingoClick { row: 0, col: 0 }, 1_000).unwrap();
    s.apply(GameEvent::BingoClick { row: 0, col: 0 }, 1_200).unwrap();
    match s.active() {
      ActiveGame::SoundBingo(b) => assert_eq!(b.color(0, 0), Some(CellColor::Green)),
      _ => unreachable!(),
    }
    select(&mut s, "bingo-fat-cat");
    match s.active() {
      ActiveGame::SoundBingo(b) => assert_eq!(b.color(0, 0), Some(CellColor::White)),
      _ => unreachable!(),
    }
  }

  #[test]
  fn story_finish_and_game_switch_reset() {
    let mut s = session();
    select(&mut s, "story-ben-bun");
    for _ in 0..4 {
      s.apply(GameEvent::NextSentence, 0).unwrap();
    }
    match s.active() {
      ActiveGame::Story(r) => {
        assert_eq!(r.sentence_index(), 3);
        assert!(r.show_success());
      }
      _ => unreachable!(),
    }
    select(&mut s, "story-fat-cat");
    match s.active() {
      ActiveGame::Story(r) => {
        assert_eq!(r.sentence_index(), 0);
        assert!(!r.show_success());
      }
      _ => unreachable!(),
    }
  }

  #[test]
  fn snapshot_serializes_with_game_type_tag() {
    let mut s = session();
    select(&mut s, "list-ben-bun");
    s.apply(GameEvent::NextSlide, 0).unwrap();
    let v = serde_json::to_value(&s).unwrap();
    assert_eq!(v["active"]["game_type"], "word_list");
    assert_eq!(v["active"]["index"], 1);
    assert_eq!(v["game_slug"], "list-ben-bun");
    assert_eq!(v["answer_key_url"], "/games/answer-key?game=ben-bun");
  }

  #[test]
  fn answer_key_link_follows_the_selected_game() {
    let mut s = session();
    select(&mut s, "bingo-bug-on-jug");
    assert_eq!(serde_json::to_value(&s).unwrap()["answer_key_url"], "/games/answer-key?game=bug-on-jug");
    select(&mut s, "story-mad-cat");
    assert!(serde_json::to_value(&s).unwrap()["answer_key_url"].is_null());
  }

  #[test]
  fn events_parse_from_client_json() {
    let e: GameEvent = serde_json::from_str(r#"{"type":"drop_tile","tile_id":"x","slot":2}"#).unwrap();
    assert_eq!(e, GameEvent::DropTile { tile_id: "x".into(), slot: 2 });
    let e: GameEvent = serde_json::from_str(r#"{"type":"bingo_reset"}"#).unwrap();
    assert_eq!(e.name(), "bingo_reset");
  }
}
