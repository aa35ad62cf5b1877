//! Phoneme segmentation: one tick box per letter the student sounded out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sheet::Sheet;
use super::{AssessmentKind, AssessmentRecord, Collector, RecordContext};
use crate::domain::Variant;
use crate::error::AssessmentError;
use crate::seeds::SEGMENTATION_ITEMS;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SegmentationRecord {
  pub variant: Variant,
  pub student_id: Option<u64>,
  pub part: u8,
  pub target: String,
  pub per_letter_correct: Vec<bool>,
  #[serde(flatten)]
  pub metrics: SegmentationMetrics,
  pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SegmentationMetrics {
  pub sounded_count: usize,
  pub total_letters: usize,
  /// Rounded, 0 when there are no letters.
  pub accuracy_pct: u32,
  pub is_perfect: bool,
}

impl SegmentationMetrics {
  pub fn from_flags(flags: &[bool]) -> Self {
    let total_letters = flags.len();
    let sounded_count = flags.iter().filter(|f| **f).count();
    let accuracy_pct = if total_letters == 0 {
      0
    } else {
      (sounded_count as f64 / total_letters as f64 * 100.0).round() as u32
    };
    Self { sounded_count, total_letters, accuracy_pct, is_perfect: sounded_count == total_letters }
  }
}

fn blank(word: &str) -> Vec<bool> {
  vec![false; word.chars().count()]
}

#[derive(Clone, Debug, Serialize)]
pub struct SegmentationTest {
  rows: Sheet<Vec<bool>>,
}

impl SegmentationTest {
  pub fn new() -> Self {
    let items = SEGMENTATION_ITEMS
      .iter()
      .flat_map(|(part, words)| words.iter().map(move |w| (*part, w.to_string(), None, blank(w))));
    Self { rows: Sheet::new(items) }
  }

  /// Tick or untick one letter position.
  pub fn set_position(&mut self, prompt: &str, position: usize, correct: bool) -> Result<(), AssessmentError> {
    let flags = self.rows.input_mut(prompt)?;
    match flags.get_mut(position) {
      Some(flag) => {
        *flag = correct;
        Ok(())
      }
      None => Err(AssessmentError::UnknownPrompt(format!("{}[{}]", prompt, position))),
    }
  }

  pub fn metrics(&self, prompt: &str) -> Result<SegmentationMetrics, AssessmentError> {
    Ok(SegmentationMetrics::from_flags(&self.rows.get(prompt)?.input))
  }

  pub fn sheet(&self) -> &Sheet<Vec<bool>> {
    &self.rows
  }
}

impl Default for SegmentationTest {
  fn default() -> Self {
    Self::new()
  }
}

impl Collector for SegmentationTest {
  fn kind(&self) -> AssessmentKind {
    AssessmentKind::Segmentation
  }

  fn prompts(&self) -> Vec<&str> {
    self.rows.prompts()
  }

  fn record(&self, prompt: &str, ctx: &RecordContext) -> Result<AssessmentRecord, AssessmentError> {
    let row = self.rows.get(prompt)?;
    Ok(AssessmentRecord::Segmentation(SegmentationRecord {
      variant: ctx.variant,
      student_id: ctx.student_id,
      part: row.part,
      target: row.prompt.clone(),
      per_letter_correct: row.input.clone(),
      metrics: self.metrics(prompt)?,
      timestamp: ctx.timestamp,
    }))
  }

  fn mark_submitted(&mut self, prompts: &[&str]) {
    self.rows.mark_submitted(prompts);
  }

  fn reset(&mut self) {
    self.rows.reset_with(blank);
  }
}
