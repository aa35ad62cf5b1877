//! Word-list slideshow: one word per slide, clamped navigation.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct WordListSlideshow {
  words: Vec<String>,
  index: usize,
  /// The word on the current slide.
  word: Option<String>,
}

impl WordListSlideshow {
  pub fn new(words: Vec<String>) -> Self {
    let mut s = Self { words, index: 0, word: None };
    s.sync_current();
    s
  }

  fn sync_current(&mut self) {
    self.word = self.current().map(str::to_string);
  }

  pub fn current(&self) -> Option<&str> {
    self.words.get(self.index).map(String::as_str)
  }

  pub fn next(&mut self) -> bool {
    self.go_to(self.index + 1)
  }

  pub fn prev(&mut self) -> bool {
    match self.index.checked_sub(1) {
      Some(i) => self.go_to(i),
      None => false,
    }
  }

  /// Clamp into range; true if the slide changed.
  pub fn go_to(&mut self, index: usize) -> bool {
    let clamped = index.min(self.words.len().saturating_sub(1));
    let moved = clamped != self.index;
    self.index = clamped;
    self.sync_current();
    moved
  }

  pub fn reset(&mut self) {
    self.index = 0;
    self.sync_current();
  }

  pub fn index(&self) -> usize { self.index }
}
