//! Story reader: step through (sentence, image) pairs.

use serde::Serialize;

use crate::domain::Story;
use crate::timer::{TimerBook, TimerKind};

#[derive(Clone, Debug, Serialize)]
pub struct StoryReader {
  #[serde(skip)]
  story: Story,
  sentence_index: usize,
  sentence_count: usize,
  sentence: String,
  image: Option<String>,
  show_success: bool,
  /// How many times "next" was pressed on the last sentence.
  finished_count: u32,
}

impl StoryReader {
  pub fn new(story: Story) -> Self {
    let mut reader = Self {
      sentence_count: story.sentences.len(),
      story,
      sentence_index: 0,
      sentence: String::new(),
      image: None,
      show_success: false,
      finished_count: 0,
    };
    reader.sync_current();
    reader
  }

  fn sync_current(&mut self) {
    self.sentence = self.story.sentences.get(self.sentence_index).cloned().unwrap_or_default();
    self.image = self.story.images.get(self.sentence_index).filter(|s| !s.is_empty()).cloned();
  }

  /// Advance, or on the last sentence raise the success indicator without moving.
  pub fn next(&mut self, timers: &mut TimerBook, success_ms: u64) {
    if self.sentence_index + 1 < self.sentence_count {
      self.sentence_index += 1;
      self.show_success = false;
      self.sync_current();
    } else {
      self.show_success = true;
      self.finished_count += 1;
      timers.schedule(TimerKind::ClearStorySuccess, success_ms);
    }
  }

  pub fn prev(&mut self) -> bool {
    if self.sentence_index == 0 {
      return false;
    }
    self.sentence_index -= 1;
    self.show_success = false;
    self.sync_current();
    true
  }

  pub fn reset(&mut self) {
    self.sentence_index = 0;
    self.show_success = false;
    self.sync_current();
  }

  pub fn on_timer(&mut self, kind: TimerKind) {
    if kind == TimerKind::ClearStorySuccess {
      self.show_success = false;
    }
  }

  pub fn sentence_index(&self) -> usize { self.sentence_index }
  pub fn sentence(&self) -> &str { &self.sentence }
  pub fn show_success(&self) -> bool { self.show_success }
  pub fn finished_count(&self) -> u32 { self.finished_count }
}
