//! One editable row per prompt, kept in definition order and looked up by prompt.

use serde::Serialize;

use crate::error::AssessmentError;

#[derive(Clone, Debug, Serialize)]
pub struct Row<I> {
  pub part: u8,
  pub prompt: String,
  /// What the teacher sees next to the prompt, when it differs from it.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  pub input: I,
  pub submitted: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(transparent)]
pub struct Sheet<I> {
  rows: Vec<Row<I>>,
}

impl<I> Sheet<I> {
  pub fn new(items: impl IntoIterator<Item = (u8, String, Option<String>, I)>) -> Self {
    let rows = items
      .into_iter()
      .map(|(part, prompt, label, input)| Row { part, prompt, label, input, submitted: false })
      .collect();
    Self { rows }
  }

  pub fn rows(&self) -> &[Row<I>] {
    &self.rows
  }

  pub fn get(&self, prompt: &str) -> Result<&Row<I>, AssessmentError> {
    self
      .rows
      .iter()
      .find(|r| r.prompt == prompt)
      .ok_or_else(|| AssessmentError::UnknownPrompt(prompt.to_string()))
  }

  pub fn input_mut(&mut self, prompt: &str) -> Result<&mut I, AssessmentError> {
    self
      .rows
      .iter_mut()
      .find(|r| r.prompt == prompt)
      .map(|r| &mut r.input)
      .ok_or_else(|| AssessmentError::UnknownPrompt(prompt.to_string()))
  }

  pub fn inputs_mut(&mut self) -> impl Iterator<Item = &mut I> {
    self.rows.iter_mut().map(|r| &mut r.input)
  }

  pub fn prompts(&self) -> Vec<&str> {
    self.rows.iter().map(|r| r.prompt.as_str()).collect()
  }

  pub fn mark_submitted(&mut self, prompts: &[&str]) {
    for row in self.rows.iter_mut().filter(|r| prompts.contains(&r.prompt.as_str())) {
      row.submitted = true;
    }
  }

  /// Fresh inputs and no submitted flags.
  pub fn reset_with(&mut self, fresh: impl Fn(&str) -> I) {
    for row in self.rows.iter_mut() {
      row.input = fresh(&row.prompt);
      row.submitted = false;
    }
  }

  pub fn submitted_count(&self) -> usize {
    self.rows.iter().filter(|r| r.submitted).count()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sheet() -> Sheet<String> {
    Sheet::new(["pig", "bug", "hat"].iter().map(|p| (1, p.to_string(), None, String::new())))
  }

  #[test]
  fn rows_keep_definition_order_and_reject_unknown_prompts() {
    let mut s = sheet();
    assert_eq!(s.prompts(), vec!["pig", "bug", "hat"]);
    *s.input_mut("bug").unwrap() = "bug".into();
    assert_eq!(s.get("bug").unwrap().input, "bug");
    assert_eq!(s.input_mut("dog").unwrap_err(), AssessmentError::UnknownPrompt("dog".into()));
  }

  #[test]
  fn reset_clears_inputs_and_submitted_flags() {
    let mut s = sheet();
    *s.input_mut("pig").unwrap() = "pig".into();
    s.mark_submitted(&["pig", "hat"]);
    assert_eq!(s.submitted_count(), 2);
    s.reset_with(|_| String::new());
    assert_eq!(s.submitted_count(), 0);
    assert!(s.rows().iter().all(|r| r.input.is_empty()));
  }
}
