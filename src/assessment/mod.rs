//! Assessment sessions: one per open pre-test / post-test screen.
//!
//! The session owns all four collectors and the active tab. Edits are synchronous; submissions
//! go through a `ResultSink` and only mark rows submitted once the sink says so. A failed batch
//! is kept verbatim so a retry resends identical records (same natural keys).

pub mod blending;
pub mod code_knowledge;
pub mod deletion;
pub mod segmentation;
pub mod sheet;
pub mod sink;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::domain::{Student, Variant};
use crate::error::AssessmentError;
use crate::pages::PageRoute;

use self::blending::{BlendingRecord, BlendingTest};
use self::code_knowledge::{CodeKnowledgeRecord, CodeKnowledgeTest};
use self::deletion::{DeletionRecord, DeletionTest};
use self::segmentation::{SegmentationRecord, SegmentationTest};
use self::sink::{deliver, Batch, ResultSink};

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
  #[default]
  Blending,
  Segmentation,
  Deletion,
  CodeKnowledge,
}

/// Who and when, stamped onto every record built in one submission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordContext {
  pub variant: Variant,
  pub student_id: Option<u64>,
  pub timestamp: DateTime<Utc>,
}

impl RecordContext {
  pub fn now(variant: Variant, student_id: Option<u64>) -> Self {
    Self { variant, student_id, timestamp: Utc::now() }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "assessment", rename_all = "snake_case")]
pub enum AssessmentRecord {
  Blending(BlendingRecord),
  Segmentation(SegmentationRecord),
  Deletion(DeletionRecord),
  CodeKnowledge(CodeKnowledgeRecord),
}

/// Natural key: (assessment, variant, student, prompt, timestamp).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordKey {
  pub kind: AssessmentKind,
  pub variant: Variant,
  pub student_id: Option<u64>,
  pub prompt: String,
  pub timestamp_ms: i64,
}

impl AssessmentRecord {
  pub fn kind(&self) -> AssessmentKind {
    match self {
      AssessmentRecord::Blending(_) => AssessmentKind::Blending,
      AssessmentRecord::Segmentation(_) => AssessmentKind::Segmentation,
      AssessmentRecord::Deletion(_) => AssessmentKind::Deletion,
      AssessmentRecord::CodeKnowledge(_) => AssessmentKind::CodeKnowledge,
    }
  }

  /// The row key the record was built from.
  pub fn prompt(&self) -> &str {
    match self {
      AssessmentRecord::Blending(r) => &r.target,
      AssessmentRecord::Segmentation(r) => &r.target,
      AssessmentRecord::Deletion(r) => &r.base_word,
      AssessmentRecord::CodeKnowledge(r) => &r.grapheme,
    }
  }

  pub fn variant(&self) -> Variant {
    match self {
      AssessmentRecord::Blending(r) => r.variant,
      AssessmentRecord::Segmentation(r) => r.variant,
      AssessmentRecord::Deletion(r) => r.variant,
      AssessmentRecord::CodeKnowledge(r) => r.variant,
    }
  }

  pub fn student_id(&self) -> Option<u64> {
    match self {
      AssessmentRecord::Blending(r) => r.student_id,
      AssessmentRecord::Segmentation(r) => r.student_id,
      AssessmentRecord::Deletion(r) => r.student_id,
      AssessmentRecord::CodeKnowledge(r) => r.student_id,
    }
  }

  pub fn timestamp(&self) -> DateTime<Utc> {
    match self {
      AssessmentRecord::Blending(r) => r.timestamp,
      AssessmentRecord::Segmentation(r) => r.timestamp,
      AssessmentRecord::Deletion(r) => r.timestamp,
      AssessmentRecord::CodeKnowledge(r) => r.timestamp,
    }
  }

  /// Exact match, perfect segmentation, or known grapheme.
  pub fn is_correct(&self) -> bool {
    match self {
      AssessmentRecord::Blending(r) => r.is_exact_match,
      AssessmentRecord::Segmentation(r) => r.metrics.is_perfect,
      AssessmentRecord::Deletion(r) => r.is_exact_match,
      AssessmentRecord::CodeKnowledge(r) => r.known,
    }
  }

  pub fn key(&self) -> RecordKey {
    RecordKey {
      kind: self.kind(),
      variant: self.variant(),
      student_id: self.student_id(),
      prompt: self.prompt().to_string(),
      timestamp_ms: self.timestamp().timestamp_millis(),
    }
  }
}

/// What every assessment tab offers the session.
pub trait Collector {
  fn kind(&self) -> AssessmentKind;

  /// Row keys in definition order, across all parts.
  fn prompts(&self) -> Vec<&str>;

  fn record(&self, prompt: &str, ctx: &RecordContext) -> Result<AssessmentRecord, AssessmentError>;

  /// One record per defined prompt, touched or not.
  fn records(&self, ctx: &RecordContext) -> Vec<AssessmentRecord> {
    self.prompts().into_iter().filter_map(|p| self.record(p, ctx).ok()).collect()
  }

  fn set_response(&mut self, _prompt: &str, _response: &str) -> Result<(), AssessmentError> {
    Err(AssessmentError::WrongTab { event: "set_response", tab: self.kind() })
  }

  fn mark_submitted(&mut self, prompts: &[&str]);

  fn reset(&mut self);
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssessmentEvent {
  SwitchTab { test: AssessmentKind },
  SetResponse { prompt: String, response: String },
  SetSegment { prompt: String, position: usize, correct: bool },
  SetKnown { grapheme: String, known: bool },
  SelectAllKnown,
  NextGrapheme,
  PrevGrapheme,
  GoToGrapheme { index: usize },
  ResetActive,
  SubmitOne { prompt: String },
  SubmitAll,
  RetrySubmit,
}

impl AssessmentEvent {
  pub fn name(&self) -> &'static str {
    match self {
      AssessmentEvent::SwitchTab { .. } => "switch_tab",
      AssessmentEvent::SetResponse { .. } => "set_response",
      AssessmentEvent::SetSegment { .. } => "set_segment",
      AssessmentEvent::SetKnown { .. } => "set_known",
      AssessmentEvent::SelectAllKnown => "select_all_known",
      AssessmentEvent::NextGrapheme => "next_grapheme",
      AssessmentEvent::PrevGrapheme => "prev_grapheme",
      AssessmentEvent::GoToGrapheme { .. } => "go_to_grapheme",
      AssessmentEvent::ResetActive => "reset_active",
      AssessmentEvent::SubmitOne { .. } => "submit_one",
      AssessmentEvent::SubmitAll => "submit_all",
      AssessmentEvent::RetrySubmit => "retry_submit",
    }
  }
}

/// Result of a handled event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reply {
  Updated,
  Submitted { count: usize },
}

#[derive(Debug, Serialize)]
pub struct AssessmentSession {
  variant: Variant,
  student_id: Option<u64>,
  student_name: Option<String>,
  /// Link back to this test page, student included.
  page_url: String,
  active: AssessmentKind,
  blending: BlendingTest,
  segmentation: SegmentationTest,
  deletion: DeletionTest,
  code_knowledge: CodeKnowledgeTest,
  retry_pending: bool,
  #[serde(skip)]
  failed: Option<Batch>,
}

impl AssessmentSession {
  pub fn new(variant: Variant, student_id: Option<u64>) -> Self {
    Self {
      variant,
      student_id,
      student_name: None,
      page_url: PageRoute::test_page(variant, student_id).url(),
      active: AssessmentKind::default(),
      blending: BlendingTest::new(),
      segmentation: SegmentationTest::new(),
      deletion: DeletionTest::new(),
      code_knowledge: CodeKnowledgeTest::new(variant),
      retry_pending: false,
      failed: None,
    }
  }

  /// A session for a roster student; the snapshot shows their name.
  pub fn for_student(variant: Variant, student: &Student) -> Self {
    Self { student_name: Some(student.name.clone()), ..Self::new(variant, Some(student.id)) }
  }

  pub fn variant(&self) -> Variant { self.variant }
  pub fn active(&self) -> AssessmentKind { self.active }
  pub fn blending(&self) -> &BlendingTest { &self.blending }
  pub fn segmentation(&self) -> &SegmentationTest { &self.segmentation }
  pub fn deletion(&self) -> &DeletionTest { &self.deletion }
  pub fn code_knowledge(&self) -> &CodeKnowledgeTest { &self.code_knowledge }

  fn collector(&self, kind: AssessmentKind) -> &dyn Collector {
    match kind {
      AssessmentKind::Blending => &self.blending,
      AssessmentKind::Segmentation => &self.segmentation,
      AssessmentKind::Deletion => &self.deletion,
      AssessmentKind::CodeKnowledge => &self.code_knowledge,
    }
  }

  fn collector_mut(&mut self, kind: AssessmentKind) -> &mut dyn Collector {
    match kind {
      AssessmentKind::Blending => &mut self.blending,
      AssessmentKind::Segmentation => &mut self.segmentation,
      AssessmentKind::Deletion => &mut self.deletion,
      AssessmentKind::CodeKnowledge => &mut self.code_knowledge,
    }
  }

  fn context(&self) -> RecordContext {
    RecordContext::now(self.variant, self.student_id)
  }

  fn clear_failed(&mut self) {
    self.failed = None;
    self.retry_pending = false;
  }

  /// Apply an edit, or build the batch a submit event asks for.
  pub fn apply(&mut self, event: AssessmentEvent) -> Result<Option<Batch>, AssessmentError> {
    let active = self.active;
    let wrong_tab = |event: &AssessmentEvent| AssessmentError::WrongTab { event: event.name(), tab: active };

    match event {
      AssessmentEvent::SwitchTab { test } => {
        for kind in [
          AssessmentKind::Blending,
          AssessmentKind::Segmentation,
          AssessmentKind::Deletion,
          AssessmentKind::CodeKnowledge,
        ] {
          self.collector_mut(kind).reset();
        }
        self.clear_failed();
        self.active = test;
      }
      AssessmentEvent::SetResponse { prompt, response } => {
        self.collector_mut(active).set_response(&prompt, &response)?;
      }
      AssessmentEvent::SetSegment { ref prompt, position, correct } => match active {
        AssessmentKind::Segmentation => self.segmentation.set_position(prompt, position, correct)?,
        _ => return Err(wrong_tab(&event)),
      },
      AssessmentEvent::SetKnown { ref grapheme, known } => match active {
        AssessmentKind::CodeKnowledge => self.code_knowledge.set_known(grapheme, known)?,
        _ => return Err(wrong_tab(&event)),
      },
      AssessmentEvent::SelectAllKnown => match active {
        AssessmentKind::CodeKnowledge => self.code_knowledge.select_all(),
        _ => return Err(wrong_tab(&event)),
      },
      AssessmentEvent::NextGrapheme | AssessmentEvent::PrevGrapheme | AssessmentEvent::GoToGrapheme { .. }
        if active != AssessmentKind::CodeKnowledge =>
      {
        return Err(wrong_tab(&event));
      }
      AssessmentEvent::NextGrapheme => {
        self.code_knowledge.next_card();
      }
      AssessmentEvent::PrevGrapheme => {
        self.code_knowledge.prev_card();
      }
      AssessmentEvent::GoToGrapheme { index } => {
        self.code_knowledge.go_to(index);
      }
      AssessmentEvent::ResetActive => {
        self.collector_mut(active).reset();
        self.clear_failed();
      }
      AssessmentEvent::SubmitOne { prompt } => {
        let ctx = self.context();
        return Ok(Some(Batch::One(self.collector(active).record(&prompt, &ctx)?)));
      }
      AssessmentEvent::SubmitAll => {
        let ctx = self.context();
        return Ok(Some(Batch::All(self.collector(active).records(&ctx))));
      }
      AssessmentEvent::RetrySubmit => {
        return self.failed.clone().map(Some).ok_or(AssessmentError::NothingToRetry);
      }
    }
    Ok(None)
  }

  /// Flag every row in the batch as submitted.
  pub fn mark_submitted(&mut self, batch: &Batch) {
    for kind in [
      AssessmentKind::Blending,
      AssessmentKind::Segmentation,
      AssessmentKind::Deletion,
      AssessmentKind::CodeKnowledge,
    ] {
      let prompts: Vec<String> = batch
        .records()
        .iter()
        .filter(|r| r.kind() == kind)
        .map(|r| r.prompt().to_string())
        .collect();
      if !prompts.is_empty() {
        let refs: Vec<&str> = prompts.iter().map(String::as_str).collect();
        self.collector_mut(kind).mark_submitted(&refs);
      }
    }
  }

  /// Apply an event end to end, delivering any resulting batch to `sink`.
  #[instrument(level = "debug", skip(self, event, sink), fields(event = event.name(), variant = %self.variant))]
  pub async fn handle(
    &mut self,
    event: AssessmentEvent,
    sink: &dyn ResultSink,
    timeout: Duration,
  ) -> Result<Reply, AssessmentError> {
    let Some(batch) = self.apply(event)? else {
      return Ok(Reply::Updated);
    };
    let count = batch.len();
    match deliver(sink, batch.clone(), timeout).await {
      Ok(()) => {
        self.mark_submitted(&batch);
        self.clear_failed();
        info!(target: "assessment", count, tab = ?self.active, student = ?self.student_id, "Submission accepted");
        Ok(Reply::Submitted { count })
      }
      Err(e) => {
        warn!(target: "assessment", count, error = %e, "Submission failed; rows left unsubmitted");
        self.failed = Some(batch);
        self.retry_pending = true;
        Err(e.into())
      }
    }
  }
}
