//! Auditory deletion: "say plum without the 'l'". Rows are keyed by base word.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sheet::Sheet;
use super::{AssessmentKind, AssessmentRecord, Collector, RecordContext};
use crate::domain::Variant;
use crate::error::AssessmentError;
use crate::seeds::DELETION_ITEMS;
use crate::util::answers_match;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DeletionRecord {
  pub variant: Variant,
  pub student_id: Option<u64>,
  pub part: u8,
  pub base_word: String,
  pub removed: String,
  pub prompt: String,
  pub response: String,
  pub expected: String,
  pub is_exact_match: bool,
  pub timestamp: DateTime<Utc>,
}

pub fn prompt_text(base: &str, removed: &str) -> String {
  format!("say {} w/o the '{}'", base, removed)
}

#[derive(Clone, Debug, Serialize)]
pub struct DeletionTest {
  rows: Sheet<String>,
}

impl DeletionTest {
  pub fn new() -> Self {
    let items = DELETION_ITEMS
      .iter()
      .map(|(part, base, removed, _)| (*part, base.to_string(), Some(prompt_text(base, removed)), String::new()));
    Self { rows: Sheet::new(items) }
  }

  pub fn sheet(&self) -> &Sheet<String> {
    &self.rows
  }
}

impl Default for DeletionTest {
  fn default() -> Self {
    Self::new()
  }
}

impl Collector for DeletionTest {
  fn kind(&self) -> AssessmentKind {
    AssessmentKind::Deletion
  }

  fn prompts(&self) -> Vec<&str> {
    self.rows.prompts()
  }

  fn record(&self, prompt: &str, ctx: &RecordContext) -> Result<AssessmentRecord, AssessmentError> {
    let row = self.rows.get(prompt)?;
    let (_, base, removed, expected) = DELETION_ITEMS
      .iter()
      .find(|(_, base, _, _)| *base == prompt)
      .ok_or_else(|| AssessmentError::UnknownPrompt(prompt.to_string()))?;
    Ok(AssessmentRecord::Deletion(DeletionRecord {
      variant: ctx.variant,
      student_id: ctx.student_id,
      part: row.part,
      base_word: base.to_string(),
      removed: removed.to_string(),
      prompt: prompt_text(base, removed),
      response: row.input.clone(),
      expected: expected.to_string(),
      is_exact_match: answers_match(expected, &row.input),
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

  fn record(t: &DeletionTest, base: &str) -> DeletionRecord {
    match t.record(base, &RecordContext::now(Variant::Pretest, None)).unwrap() {
      AssessmentRecord::Deletion(r) => r,
      other => panic!("unexpected record {:?}", other),
    }
  }

  #[test]
  fn expected_comes_from_the_table() {
    let mut t = DeletionTest::new();
    t.set_response("plum", " Pum").unwrap();
    let r = record(&t, "plum");
    assert_eq!(r.prompt, "say plum w/o the 'l'");
    assert_eq!(r.expected, "pum");
    assert_eq!(r.part, 3);
    assert!(r.is_exact_match);

    t.set_response("nest", "nest").unwrap();
    assert!(!record(&t, "nest").is_exact_match);
  }

  #[test]
  fn bulk_submit_includes_part_three() {
    let t = DeletionTest::new();
    let records = t.records(&RecordContext::now(Variant::Pretest, None));
    assert_eq!(records.len(), 10);
    assert!(records.iter().any(|r| matches!(r, AssessmentRecord::Deletion(d) if d.base_word == "lost")));
  }

  #[test]
  fn rows_carry_the_spoken_prompt() {
    let t = DeletionTest::new();
    assert_eq!(t.sheet().get("tog").unwrap().label.as_deref(), Some("say tog w/o the 'g'"));
  }
}
