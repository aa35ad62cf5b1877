//! Code knowledge: grapheme flashcards plus the teacher checklist.
//!
//! The student steps through the graphemes one card at a time and reads each aloud; the teacher
//! either types what was said or just marks it known (the checklist view, opened from
//! `teacher_url`). Known means marked, or typed exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::sheet::Sheet;
use super::{AssessmentKind, AssessmentRecord, Collector, RecordContext};
use crate::domain::Variant;
use crate::error::AssessmentError;
use crate::pages::PageRoute;
use crate::seeds::CODE_COLUMNS;
use crate::util::answers_match;

#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct CodeInput {
  pub response: String,
  pub marked: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CodeKnowledgeRecord {
  pub variant: Variant,
  pub student_id: Option<u64>,
  /// Display column, 1..=3.
  pub part: u8,
  pub grapheme: String,
  pub examples: String,
  pub response: String,
  pub is_exact_match: bool,
  pub known: bool,
  pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChecklistColumn {
  pub part: u8,
  pub label: &'static str,
  pub items: Vec<ChecklistItem>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChecklistItem {
  pub grapheme: &'static str,
  pub examples: &'static str,
}

pub fn column_label(part: u8) -> &'static str {
  match part {
    1 => "Consonants",
    2 => "Vowels and digraphs",
    _ => "Vowel teams",
  }
}

/// The read-only checklist layout served to the teacher view.
pub fn checklist() -> Vec<ChecklistColumn> {
  CODE_COLUMNS
    .iter()
    .zip(1u8..)
    .map(|(column, part)| ChecklistColumn {
      part,
      label: column_label(part),
      items: column.iter().map(|&(grapheme, examples)| ChecklistItem { grapheme, examples }).collect(),
    })
    .collect()
}

fn examples_for(grapheme: &str) -> &'static str {
  CODE_COLUMNS
    .iter()
    .flat_map(|c| c.iter())
    .find(|(g, _)| *g == grapheme)
    .map(|(_, e)| *e)
    .unwrap_or("")
}

fn is_known(grapheme: &str, input: &CodeInput) -> bool {
  input.marked || answers_match(grapheme, &input.response)
}

/// The card the student is looking at.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Flashcard {
  pub index: usize,
  pub grapheme: String,
  pub column: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct CodeKnowledgeTest {
  rows: Sheet<CodeInput>,
  known_count: usize,
  total: usize,
  current: Flashcard,
  teacher_url: String,
}

impl CodeKnowledgeTest {
  pub fn new(variant: Variant) -> Self {
    let items = CODE_COLUMNS.iter().zip(1u8..).flat_map(|(column, part)| {
      column
        .iter()
        .map(move |(g, examples)| (part, g.to_string(), Some(examples.to_string()), CodeInput::default()))
    });
    let rows = Sheet::new(items);
    let total = rows.rows().len();
    let mut test = Self {
      rows,
      known_count: 0,
      total,
      current: Flashcard { index: 0, grapheme: String::new(), column: column_label(1) },
      teacher_url: PageRoute::CodeTeacher { variant }.url(),
    };
    test.go_to(0);
    test
  }

  /// Clamp into `[0, total - 1]`; true if the card changed.
  pub fn go_to(&mut self, index: usize) -> bool {
    let clamped = index.min(self.total.saturating_sub(1));
    let moved = clamped != self.current.index;
    if let Some(row) = self.rows.rows().get(clamped) {
      self.current = Flashcard { index: clamped, grapheme: row.prompt.clone(), column: column_label(row.part) };
    }
    moved
  }

  pub fn next_card(&mut self) -> bool {
    self.go_to(self.current.index + 1)
  }

  pub fn prev_card(&mut self) -> bool {
    match self.current.index.checked_sub(1) {
      Some(i) => self.go_to(i),
      None => false,
    }
  }

  pub fn current(&self) -> &Flashcard {
    &self.current
  }

  pub fn set_known(&mut self, grapheme: &str, known: bool) -> Result<(), AssessmentError> {
    self.rows.input_mut(grapheme)?.marked = known;
    self.recount();
    Ok(())
  }

  pub fn select_all(&mut self) {
    self.rows.inputs_mut().for_each(|i| i.marked = true);
    self.recount();
  }

  pub fn is_known(&self, grapheme: &str) -> Result<bool, AssessmentError> {
    let row = self.rows.get(grapheme)?;
    Ok(is_known(&row.prompt, &row.input))
  }

  pub fn known_count(&self) -> usize {
    self.known_count
  }

  pub fn teacher_url(&self) -> &str {
    &self.teacher_url
  }

  fn recount(&mut self) {
    self.known_count = self.rows.rows().iter().filter(|r| is_known(&r.prompt, &r.input)).count();
  }
}

impl Collector for CodeKnowledgeTest {
  fn kind(&self) -> AssessmentKind {
    AssessmentKind::CodeKnowledge
  }

  fn prompts(&self) -> Vec<&str> {
    self.rows.prompts()
  }

  fn record(&self, prompt: &str, ctx: &RecordContext) -> Result<AssessmentRecord, AssessmentError> {
    let row = self.rows.get(prompt)?;
    Ok(AssessmentRecord::CodeKnowledge(CodeKnowledgeRecord {
      variant: ctx.variant,
      student_id: ctx.student_id,
      part: row.part,
      grapheme: row.prompt.clone(),
      examples: examples_for(&row.prompt).to_string(),
      response: row.input.response.clone(),
      is_exact_match: answers_match(&row.prompt, &row.input.response),
      known: is_known(&row.prompt, &row.input),
      timestamp: ctx.timestamp,
    }))
  }

  fn set_response(&mut self, prompt: &str, response: &str) -> Result<(), AssessmentError> {
    self.rows.input_mut(prompt)?.response = response.to_string();
    self.recount();
    Ok(())
  }

  fn mark_submitted(&mut self, prompts: &[&str]) {
    self.rows.mark_submitted(prompts);
  }

  fn reset(&mut self) {
    self.rows.reset_with(|_| CodeInput::default());
    self.recount();
    self.go_to(0);
  }
}
