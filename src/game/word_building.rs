//! Word building: drag shuffled letter tiles into positional slots.
//!
//! A correct drop locks its slot for the rest of the round; a wrong drop flashes and the tile
//! stays in the pool. Slots + pool always partition the word's tiles.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::Timings;
use crate::domain::{LetterTile, WordData};
use crate::timer::{TimerBook, TimerKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropOutcome {
  /// Locked slot, bad index or a tile that isn't in the pool.
  Ignored,
  /// Correct letter, slot locked, more to go.
  Placed,
  /// Correct letter and it completed the word.
  Solved,
  /// Wrong letter for that slot.
  Rejected,
}

/// Border colour the UI draws around the slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
  Neutral,
  Success,
  Error,
}

/// State for one target word.
#[derive(Clone, Debug, Serialize)]
pub struct WordRound {
  word: String,
  image: Option<String>,
  #[serde(skip)]
  target: Vec<String>,
  available: Vec<LetterTile>,
  slots: Vec<Option<LetterTile>>,
  locked: Vec<bool>,
  is_correct: Option<bool>,
  is_shaking: bool,
  show_success_popup: bool,
}

impl WordRound {
  pub fn new<R: Rng + ?Sized>(data: &WordData, rng: &mut R) -> Self {
    let mut available: Vec<LetterTile> = data
      .letters
      .iter()
      .enumerate()
      .map(|(i, l)| LetterTile::fresh(l, i))
      .collect();
    available.shuffle(rng);
    let target: Vec<String> = data.word.to_lowercase().chars().map(String::from).collect();
    let n = target.len();
    Self {
      word: data.word.clone(),
      image: data.image.clone(),
      target,
      available,
      slots: vec![None; n],
      locked: vec![false; n],
      is_correct: None,
      is_shaking: false,
      show_success_popup: false,
    }
  }

  pub fn drop_tile(&mut self, tile_id: &str, slot: usize, timers: &mut TimerBook, timings: &Timings) -> DropOutcome {
    if slot >= self.slots.len() || self.locked[slot] {
      return DropOutcome::Ignored;
    }
    let Some(pos) = self.available.iter().position(|t| t.id == tile_id) else {
      return DropOutcome::Ignored;
    };

    if self.available[pos].letter != self.target[slot] {
      debug!(target: "game", word = %self.word, slot, letter = %self.available[pos].letter, "Rejected tile");
      self.is_correct = Some(false);
      self.is_shaking = true;
      timers.schedule(TimerKind::ClearIncorrectFlash, timings.word_flash_ms);
      return DropOutcome::Rejected;
    }

    let tile = self.available.remove(pos);
    self.slots[slot] = Some(tile);
    self.locked[slot] = true;

    if self.is_solved() {
      self.is_correct = Some(true);
      self.is_shaking = false;
      timers.schedule(TimerKind::ShowSuccessPopup, timings.word_success_ms);
      DropOutcome::Solved
    } else {
      DropOutcome::Placed
    }
  }

  pub fn on_timer(&mut self, kind: TimerKind) {
    match kind {
      TimerKind::ShowSuccessPopup => self.show_success_popup = true,
      // A late flash-clear must not wipe a success verdict.
      TimerKind::ClearIncorrectFlash => {
        if self.is_correct == Some(false) {
          self.is_correct = None;
        }
        self.is_shaking = false;
      }
      _ => {}
    }
  }

  pub fn dismiss_success(&mut self) {
    self.show_success_popup = false;
  }

  /// Every slot filled with the right letter.
  pub fn is_solved(&self) -> bool {
    self.slots
      .iter()
      .zip(&self.target)
      .all(|(s, want)| s.as_ref().map_or(false, |t| &t.letter == want))
  }

  /// Per-slot error flags: a filled slot whose letter differs from the target.
  pub fn slot_errors(&self) -> Vec<bool> {
    self.slots
      .iter()
      .zip(&self.target)
      .map(|(s, want)| s.as_ref().map_or(false, |t| &t.letter != want))
      .collect()
  }

  pub fn feedback(&self) -> Feedback {
    match self.is_correct {
      Some(true) => Feedback::Success,
      Some(false) => Feedback::Error,
      None if self.slot_errors().into_iter().any(|e| e) => Feedback::Error,
      None => Feedback::Neutral,
    }
  }

  pub fn available(&self) -> &[LetterTile] { &self.available }
  pub fn slots(&self) -> &[Option<LetterTile>] { &self.slots }
  pub fn locked(&self) -> &[bool] { &self.locked }
  pub fn is_correct(&self) -> Option<bool> { self.is_correct }
  pub fn is_shaking(&self) -> bool { self.is_shaking }
  pub fn show_success_popup(&self) -> bool { self.show_success_popup }
}

/// Word-building game: a list of words and the round for the selected one.
#[derive(Clone, Debug, Serialize)]
pub struct WordBuilding {
  #[serde(skip)]
  words: Vec<WordData>,
  word_index: usize,
  word_count: usize,
  round: WordRound,
}

impl WordBuilding {
  /// Catalog validation guarantees `words` is non-empty.
  pub fn new<R: Rng + ?Sized>(words: Vec<WordData>, rng: &mut R) -> Self {
    let round = WordRound::new(&words[0], rng);
    Self { word_count: words.len(), words, word_index: 0, round }
  }

  pub fn round(&self) -> &WordRound { &self.round }
  pub fn round_mut(&mut self) -> &mut WordRound { &mut self.round }
  pub fn word_index(&self) -> usize { self.word_index }

  pub fn next_word<R: Rng + ?Sized>(&mut self, rng: &mut R, timers: &mut TimerBook) -> bool {
    if self.word_index + 1 >= self.words.len() {
      return false;
    }
    self.go_to(self.word_index + 1, rng, timers);
    true
  }

  pub fn prev_word<R: Rng + ?Sized>(&mut self, rng: &mut R, timers: &mut TimerBook) -> bool {
    if self.word_index == 0 {
      return false;
    }
    self.go_to(self.word_index - 1, rng, timers);
    true
  }

  fn go_to<R: Rng + ?Sized>(&mut self, index: usize, rng: &mut R, timers: &mut TimerBook) {
    timers.cancel_all();
    self.word_index = index;
    self.round = WordRound::new(&self.words[index], rng);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn data(word: &str) -> WordData {
    WordData { word: word.into(), letters: word.to_lowercase().chars().map(String::from).collect(), image: None }
  }

  fn tile_for(round: &WordRound, letter: &str) -> String {
    round.available().iter().find(|t| t.letter == letter).unwrap().id.clone()
  }

  fn all_ids(round: &WordRound) -> Vec<String> {
    let mut ids: Vec<String> = round.available().iter().map(|t| t.id.clone()).collect();
    ids.extend(round.slots().iter().flatten().map(|t| t.id.clone()));
    ids.sort();
    ids
  }

  #[test]
  fn cat_end_to_end() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut timers = TimerBook::new();
    let t = Timings::default();
    let mut round = WordRound::new(&data("cat"), &mut rng);

    let a = tile_for(&round, "a");
    assert_eq!(round.drop_tile(&a, 0, &mut timers, &t), DropOutcome::Rejected);
    assert!(round.slots()[0].is_none());
    assert_eq!(round.is_correct(), Some(false));
    assert!(round.is_shaking());
    let flash = timers.drain();
    assert_eq!(flash[0].kind, TimerKind::ClearIncorrectFlash);
    assert_eq!(flash[0].delay_ms, 600);
    assert!(timers.accept(&flash[0]));
    round.on_timer(flash[0].kind);
    assert_eq!(round.is_correct(), None);
    assert!(!round.is_shaking());

    let c = tile_for(&round, "c");
    assert_eq!(round.drop_tile(&c, 0, &mut timers, &t), DropOutcome::Placed);
    assert!(round.locked()[0]);
    assert_eq!(round.drop_tile(&a, 1, &mut timers, &t), DropOutcome::Placed);
    let tt = tile_for(&round, "t");
    assert_eq!(round.drop_tile(&tt, 2, &mut timers, &t), DropOutcome::Solved);
    assert!(round.is_solved());
    assert!(!round.show_success_popup());

    let popup = timers.drain();
    assert_eq!(popup[0].kind, TimerKind::ShowSuccessPopup);
    assert_eq!(popup[0].delay_ms, 300);
    assert!(timers.accept(&popup[0]));
    round.on_timer(popup[0].kind);
    assert!(round.show_success_popup());
    assert_eq!(round.feedback(), Feedback::Success);
  }

  #[test]
  fn locked_slots_never_change_and_tiles_are_conserved() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut timers = TimerBook::new();
    let t = Timings::default();
    let mut round = WordRound::new(&data("mutt"), &mut rng);
    let before = all_ids(&round);

    let first_t = tile_for(&round, "t");
    assert_eq!(round.drop_tile(&first_t, 2, &mut timers, &t), DropOutcome::Placed);
    let locked_id = round.slots()[2].as_ref().unwrap().id.clone();

    // Every remaining tile thrown at every slot, twice over.
    for _ in 0..2 {
      let ids: Vec<String> = round.available().iter().map(|t| t.id.clone()).collect();
      for id in ids {
        for slot in 0..4 {
          round.drop_tile(&id, slot, &mut timers, &t);
          assert_eq!(all_ids(&round), before);
        }
      }
    }
    assert_eq!(round.slots()[2].as_ref().unwrap().id, locked_id);
    assert!(round.is_solved());
  }

  #[test]
  fn uppercase_words_match_lowercase_tiles() {
    let mut rng = StdRng::seed_from_u64(1);
    let mut timers = TimerBook::new();
    let t = Timings::default();
    let mut round = WordRound::new(&data("BUG"), &mut rng);
    for (i, l) in ["b", "u", "g"].iter().enumerate() {
      let id = tile_for(&round, l);
      round.drop_tile(&id, i, &mut timers, &t);
    }
    assert!(round.is_solved());
  }

  #[test]
  fn never_solved_with_an_empty_slot() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut timers = TimerBook::new();
    let t = Timings::default();
    let mut round = WordRound::new(&data("top"), &mut rng);
    let id = tile_for(&round, "t");
    round.drop_tile(&id, 0, &mut timers, &t);
    let id = tile_for(&round, "p");
    round.drop_tile(&id, 2, &mut timers, &t);
    assert!(!round.is_solved());
    assert_eq!(round.feedback(), Feedback::Neutral);
  }

  #[test]
  fn stale_flash_clear_does_not_undo_success() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut timers = TimerBook::new();
    let t = Timings::default();
    let mut round = WordRound::new(&data("at"), &mut rng);
    let tid = tile_for(&round, "t");
    round.drop_tile(&tid, 0, &mut timers, &t);
    let aid = tile_for(&round, "a");
    round.drop_tile(&aid, 0, &mut timers, &t);
    round.drop_tile(&tid, 1, &mut timers, &t);
    for token in timers.drain() {
      if timers.accept(&token) {
        round.on_timer(token.kind);
      }
    }
    assert_eq!(round.is_correct(), Some(true));
    assert!(round.show_success_popup());
  }

  #[test]
  fn navigation_is_bounded_and_resets_the_round() {
    let mut rng = StdRng::seed_from_u64(9);
    let mut timers = TimerBook::new();
    let t = Timings::default();
    let mut game = WordBuilding::new(vec![data("cat"), data("fat")], &mut rng);
    assert!(!game.prev_word(&mut rng, &mut timers));

    let id = tile_for(game.round(), "c");
    game.round_mut().drop_tile(&id, 0, &mut timers, &t);
    let pending = timers.drain();
    let wrong = tile_for(game.round(), "t");
    game.round_mut().drop_tile(&wrong, 1, &mut timers, &t);
    let flash = timers.drain();

    assert!(game.next_word(&mut rng, &mut timers));
    assert_eq!(game.word_index(), 1);
    assert!(game.round().slots().iter().all(|s| s.is_none()));
    assert_eq!(game.round().available().len(), 3);
    assert_eq!(game.round().is_correct(), None);
    assert!(pending.iter().chain(&flash).all(|tok| !timers.accept(tok)));
    assert!(!game.next_word(&mut rng, &mut timers));
  }
}
