//! Blending: the teacher types the word the student blended from its sounds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sheet::Sheet;
use super::{AssessmentKind, AssessmentRecord, Collector, RecordContext};
use crate::domain::Variant;
use crate::error::AssessmentError;
use crate::seeds::BLENDING_ITEMS;
use crate::util::answers_match;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BlendingRecord {
  pub variant: Variant,
  pub student_id: Option<u64>,
  pub part: u8,
  pub target: String,
  pub response: String,
  pub is_exact_match: bool,
  pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BlendingTest {
  rows: Sheet<String>,
}

impl BlendingTest {
  pub fn new() -> Self {
    let items = BLENDING_ITEMS
      .iter()
      .flat_map(|(part, words)| words.iter().map(move |w| (*part, w.to_string(), None, String::new())));
    Self { rows: Sheet::new(items) }
  }

  pub fn sheet(&self) -> &Sheet<String> {
    &self.rows
  }
}

impl Default for BlendingTest {
  fn default() -> Self {
    Self::new()
  }
}

impl Collector for BlendingTest {
  fn kind(&self) -> AssessmentKind {
    AssessmentKind::Blending
  }

  fn prompts(&self) -> Vec<&str> {
    self.rows.prompts()
  }

  fn record(&self, prompt: &str, ctx: &RecordContext) -> Result<AssessmentRecord, AssessmentError> {
    let row = self.rows.get(prompt)?;
    Ok(AssessmentRecord::Blending(BlendingRecord {
      variant: ctx.variant,
      student_id: ctx.student_id,
      part: row.part,
      target: row.prompt.clone(),
      response: row.input.clone(),
      is_exact_match: answers_match(&row.prompt, &row.input),
      timestamp: ctx.timestamp,
    }))
  }

  fn set_response(&mut self, prompt: &str, response: &str) -> Result<(), AssessmentError> {
    *self.rows.input_mut(prompt)? = response.to_string();
    Ok(())
  }

  fn mark_submitted(&mut self, prompts: &[&str]) {
    self.rows.mark_submitted(prompts);
  }

  fn reset(&mut self) {
    self.rows.reset_with(|_| String::new());
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn untouched_rows_still_produce_records() {
    let mut t = BlendingTest::new();
    t.set_response("pig", "  PIG ").unwrap();
    let records = t.records(&RecordContext::now(Variant::Pretest, Some(3)));
    assert_eq!(records.len(), 15);

    let AssessmentRecord::Blending(pig) = &records[0] else { panic!("expected blending") };
    assert_eq!((pig.part, pig.target.as_str()), (1, "pig"));
    assert!(pig.is_exact_match);
    assert_eq!(pig.student_id, Some(3));

    let AssessmentRecord::Blending(frog) = &records[9] else { panic!("expected blending") };
    assert_eq!((frog.part, frog.response.as_str()), (2, ""));
    assert!(!frog.is_exact_match);
  }

  #[test]
  fn edits_to_unknown_words_fail() {
    let mut t = BlendingTest::new();
    assert!(matches!(t.set_response("dog", "dog"), Err(AssessmentError::UnknownPrompt(_))));
  }
}
