//! Auditory word assembly: fill every slot from a grapheme pool, then check the whole word.
//!
//! Unlike word building there is no per-slot correctness. Occupied slots swap their tile back
//! into the pool, and any verdict (right or wrong) ends with a full pool refresh.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::config::Timings;
use crate::domain::{AuditoryProcessingData, LetterTile};
use crate::timer::{TimerBook, TimerKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyOutcome {
  /// Bad slot, unknown tile, or a verdict is still on screen.
  Ignored,
  /// Placed; at least one slot still empty.
  Placed,
  Accepted,
  Rejected,
}

#[derive(Clone, Debug, Serialize)]
pub struct AuditoryAssembly {
  #[serde(skip)]
  letters: Vec<String>,
  #[serde(skip)]
  accepted: HashSet<String>,
  available: Vec<LetterTile>,
  slots: Vec<Option<LetterTile>>,
  is_correct: Option<bool>,
  is_shaking: bool,
  completed_words: usize,
}

impl AuditoryAssembly {
  pub fn new(data: &AuditoryProcessingData) -> Self {
    let letters: Vec<String> = data.letters.iter().map(|l| l.to_lowercase()).collect();
    let accepted = data.correct_words.iter().map(|w| w.to_lowercase()).collect();
    let mut this = Self {
      letters,
      accepted,
      available: Vec::new(),
      slots: vec![None; data.slot_count],
      is_correct: None,
      is_shaking: false,
      completed_words: 0,
    };
    this.refill();
    this
  }

  /// Fresh tiles (new ids) for the whole pool, empty slots.
  fn refill(&mut self) {
    self.available = self.letters.iter().enumerate().map(|(i, l)| LetterTile::fresh(l, i)).collect();
    self.slots.iter_mut().for_each(|s| *s = None);
  }

  pub fn drop_tile(&mut self, tile_id: &str, slot: usize, timers: &mut TimerBook, timings: &Timings) -> AssemblyOutcome {
    if slot >= self.slots.len() || self.is_correct.is_some() {
      return AssemblyOutcome::Ignored;
    }
    let Some(pos) = self.available.iter().position(|t| t.id == tile_id) else {
      return AssemblyOutcome::Ignored;
    };

    let tile = self.available.remove(pos);
    if let Some(previous) = self.slots[slot].replace(tile) {
      self.available.push(previous);
    }

    let Some(formed) = self.formed_word() else {
      return AssemblyOutcome::Placed;
    };

    if self.accepted.contains(&formed) {
      debug!(target: "game", %formed, "Auditory word accepted");
      self.is_correct = Some(true);
      timers.schedule(TimerKind::AuditoryAdvance, timings.auditory_correct_ms);
      AssemblyOutcome::Accepted
    } else {
      debug!(target: "game", %formed, "Auditory word rejected");
      self.is_correct = Some(false);
      self.is_shaking = true;
      timers.schedule(TimerKind::AuditoryRetry, timings.auditory_incorrect_ms);
      AssemblyOutcome::Rejected
    }
  }

  /// Lowercased concatenation, only once every slot is filled.
  pub fn formed_word(&self) -> Option<String> {
    self.slots
      .iter()
      .map(|s| s.as_ref().map(|t| t.letter.to_lowercase()))
      .collect::<Option<Vec<_>>>()
      .map(|parts| parts.concat())
  }

  pub fn on_timer(&mut self, kind: TimerKind) {
    match kind {
      TimerKind::AuditoryAdvance => {
        self.completed_words += 1;
        self.reset_verdict();
      }
      TimerKind::AuditoryRetry => self.reset_verdict(),
      _ => {}
    }
  }

  fn reset_verdict(&mut self) {
    self.refill();
    self.is_correct = None;
    self.is_shaking = false;
  }

  pub fn available(&self) -> &[LetterTile] { &self.available }
  pub fn slots(&self) -> &[Option<LetterTile>] { &self.slots }
  pub fn is_correct(&self) -> Option<bool> { self.is_correct }
  pub fn is_shaking(&self) -> bool { self.is_shaking }
  pub fn completed_words(&self) -> usize { self.completed_words }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fat_cat() -> AuditoryProcessingData {
    AuditoryProcessingData {
      letters: ["o", "t", "p", "c", "a", "f", "m", "s", "p"].iter().map(|s| s.to_string()).collect(),
      correct_words: ["cot", "pot", "cat", "top"].iter().map(|s| s.to_string()).collect(),
      slot_count: 3,
    }
  }

  fn id_of(game: &AuditoryAssembly, letter: &str) -> String {
    game.available().iter().find(|t| t.letter == letter).unwrap().id.clone()
  }

  fn place(game: &mut AuditoryAssembly, timers: &mut TimerBook, letters: &[(&str, usize)]) -> AssemblyOutcome {
    let t = Timings::default();
    let mut last = AssemblyOutcome::Ignored;
    for (letter, slot) in letters {
      let id = id_of(game, letter);
      last = game.drop_tile(&id, *slot, timers, &t);
    }
    last
  }

  #[test]
  fn cot_in_any_slot_order_is_accepted() {
    let mut timers = TimerBook::new();
    let mut game = AuditoryAssembly::new(&fat_cat());
    let out = place(&mut game, &mut timers, &[("t", 2), ("c", 0), ("o", 1)]);
    assert_eq!(out, AssemblyOutcome::Accepted);
    assert_eq!(game.is_correct(), Some(true));

    let tokens = timers.drain();
    assert_eq!(tokens[0].kind, TimerKind::AuditoryAdvance);
    assert_eq!(tokens[0].delay_ms, 1500);
    let old_ids: Vec<String> = game.available().iter().map(|t| t.id.clone()).collect();
    assert!(timers.accept(&tokens[0]));
    game.on_timer(tokens[0].kind);
    assert_eq!(game.completed_words(), 1);
    assert!(game.slots().iter().all(|s| s.is_none()));
    assert_eq!(game.available().len(), 9);
    assert!(game.available().iter().all(|t| !old_ids.contains(&t.id)));
  }

  #[test]
  fn cop_is_rejected_and_slots_clear_without_counting() {
    let mut timers = TimerBook::new();
    let mut game = AuditoryAssembly::new(&fat_cat());
    let out = place(&mut game, &mut timers, &[("c", 0), ("o", 1), ("p", 2)]);
    assert_eq!(out, AssemblyOutcome::Rejected);
    assert!(game.is_shaking());

    let tokens = timers.drain();
    assert_eq!(tokens[0].kind, TimerKind::AuditoryRetry);
    assert_eq!(tokens[0].delay_ms, 600);
    assert!(timers.accept(&tokens[0]));
    game.on_timer(tokens[0].kind);
    assert_eq!(game.completed_words(), 0);
    assert!(game.slots().iter().all(|s| s.is_none()));
    assert_eq!(game.is_correct(), None);
    assert!(!game.is_shaking());
  }

  #[test]
  fn validation_waits_for_every_slot() {
    let mut timers = TimerBook::new();
    let mut game = AuditoryAssembly::new(&fat_cat());
    assert_eq!(place(&mut game, &mut timers, &[("c", 0), ("o", 1)]), AssemblyOutcome::Placed);
    assert!(game.formed_word().is_none());
    assert!(timers.drain().is_empty());
  }

  #[test]
  fn occupied_slot_swaps_back_into_pool() {
    let mut timers = TimerBook::new();
    let mut game = AuditoryAssembly::new(&fat_cat());
    place(&mut game, &mut timers, &[("c", 0)]);
    let c_id = game.slots()[0].as_ref().unwrap().id.clone();
    place(&mut game, &mut timers, &[("m", 0)]);
    assert_eq!(game.slots()[0].as_ref().unwrap().letter, "m");
    assert!(game.available().iter().any(|t| t.id == c_id));
    assert_eq!(game.available().len(), 8);
  }

  #[test]
  fn matching_is_case_insensitive_for_multi_letter_graphemes() {
    let mut timers = TimerBook::new();
    let data = AuditoryProcessingData {
      letters: ["B", "e", "N", "zz", "u"].iter().map(|s| s.to_string()).collect(),
      correct_words: ["Ben", "buzz"].iter().map(|s| s.to_string()).collect(),
      slot_count: 3,
    };
    let mut game = AuditoryAssembly::new(&data);
    assert_eq!(place(&mut game, &mut timers, &[("b", 0), ("e", 1), ("n", 2)]), AssemblyOutcome::Accepted);

    let mut game = AuditoryAssembly::new(&data);
    assert_eq!(place(&mut game, &mut timers, &[("b", 0), ("u", 1), ("zz", 2)]), AssemblyOutcome::Accepted);
  }

  #[test]
  fn drops_are_ignored_while_a_verdict_shows() {
    let mut timers = TimerBook::new();
    let t = Timings::default();
    let mut game = AuditoryAssembly::new(&fat_cat());
    place(&mut game, &mut timers, &[("c", 0), ("o", 1), ("p", 2)]);
    let spare = game.available()[0].id.clone();
    assert_eq!(game.drop_tile(&spare, 0, &mut timers, &t), AssemblyOutcome::Ignored);
  }
}
