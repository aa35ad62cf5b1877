//! Deferred state changes with cancellation.
//!
//! Controllers never sleep. They ask the `TimerBook` to schedule a `Scheduled` token, the
//! session loop sleeps for `delay_ms` and hands the token back through `accept`. A token is
//! honoured only if:
//!   - the book's epoch hasn't moved since it was issued (navigation bumps the epoch), and
//!   - it is the newest token of its kind (re-scheduling a kind supersedes older ones).

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
  /// Word building: all slots locked, show the popup.
  ShowSuccessPopup,
  /// Word building: clear the incorrect flash / shake.
  ClearIncorrectFlash,
  /// Auditory: accepted word, refill pool and count it.
  AuditoryAdvance,
  /// Auditory: rejected word, refill pool.
  AuditoryRetry,
  /// Story: hide the "finished reading" indicator.
  ClearStorySuccess,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scheduled {
  pub kind: TimerKind,
  pub delay_ms: u64,
  epoch: u64,
  seq: u64,
}

impl Scheduled {
  pub fn delay(&self) -> Duration {
    Duration::from_millis(self.delay_ms)
  }
}

#[derive(Debug, Default)]
pub struct TimerBook {
  epoch: u64,
  next_seq: u64,
  latest: HashMap<TimerKind, u64>,
  outbox: Vec<Scheduled>,
}

impl TimerBook {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn schedule(&mut self, kind: TimerKind, delay_ms: u64) {
    self.next_seq += 1;
    self.latest.insert(kind, self.next_seq);
    self.outbox.push(Scheduled { kind, delay_ms, epoch: self.epoch, seq: self.next_seq });
  }

  /// Invalidate every token issued so far, including ones not yet drained.
  pub fn cancel_all(&mut self) {
    self.epoch += 1;
    self.latest.clear();
    self.outbox.clear();
  }

  /// True (once) if the token is still live. Consumes its slot.
  pub fn accept(&mut self, token: &Scheduled) -> bool {
    if token.epoch != self.epoch || self.latest.get(&token.kind) != Some(&token.seq) {
      return false;
    }
    self.latest.remove(&token.kind);
    true
  }

  /// Tokens scheduled since the last drain; the caller arms a real timer for each.
  pub fn drain(&mut self) -> Vec<Scheduled> {
    std::mem::take(&mut self.outbox)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn token_fires_once() {
    let mut book = TimerBook::new();
    book.schedule(TimerKind::ClearStorySuccess, 2000);
    let tokens = book.drain();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].delay(), Duration::from_millis(2000));
    assert!(book.accept(&tokens[0]));
    assert!(!book.accept(&tokens[0]));
  }

  #[test]
  fn navigation_invalidates_pending_tokens() {
    let mut book = TimerBook::new();
    book.schedule(TimerKind::AuditoryAdvance, 1500);
    let stale = book.drain();
    book.cancel_all();
    book.schedule(TimerKind::AuditoryAdvance, 1500);
    let fresh = book.drain();
    assert!(!book.accept(&stale[0]));
    assert!(book.accept(&fresh[0]));
  }

  #[test]
  fn newer_token_of_same_kind_supersedes() {
    let mut book = TimerBook::new();
    book.schedule(TimerKind::ClearIncorrectFlash, 600);
    book.schedule(TimerKind::ClearIncorrectFlash, 600);
    book.schedule(TimerKind::ShowSuccessPopup, 300);
    let tokens = book.drain();
    assert!(!book.accept(&tokens[0]));
    assert!(book.accept(&tokens[1]));
    assert!(book.accept(&tokens[2]));
  }

  #[test]
  fn cancel_drops_undrained_tokens() {
    let mut book = TimerBook::new();
    book.schedule(TimerKind::ShowSuccessPopup, 300);
    book.cancel_all();
    assert!(book.drain().is_empty());
    book.schedule(TimerKind::ShowSuccessPopup, 300);
    assert_eq!(book.drain().len(), 1);
  }
}
