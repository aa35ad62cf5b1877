//! Where finished assessment records go.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::{AssessmentRecord, RecordKey};
use crate::domain::Variant;
use crate::error::SubmitError;

/// Persistence port for assessment results.
///
/// Implementations must be idempotent by `AssessmentRecord::key`: the session resends the
/// exact same records when a submission is retried.
#[async_trait]
pub trait ResultSink: Send + Sync {
  async fn submit_one(&self, record: AssessmentRecord) -> Result<(), SubmitError>;

  async fn submit_all(&self, records: Vec<AssessmentRecord>) -> Result<(), SubmitError>;
}

/// One submission: a single row, or a whole assessment.
#[derive(Clone, Debug, PartialEq)]
pub enum Batch {
  One(AssessmentRecord),
  All(Vec<AssessmentRecord>),
}

impl Batch {
  pub fn records(&self) -> &[AssessmentRecord] {
    match self {
      Batch::One(r) => std::slice::from_ref(r),
      Batch::All(rs) => rs,
    }
  }

  pub fn len(&self) -> usize {
    self.records().len()
  }
}

/// Hand a batch to the sink, giving up after `timeout`.
#[instrument(level = "debug", skip(sink, batch), fields(records = batch.len()))]
pub async fn deliver(sink: &dyn ResultSink, batch: Batch, timeout: Duration) -> Result<(), SubmitError> {
  let fut = async move {
    match batch {
      Batch::One(r) => sink.submit_one(r).await,
      Batch::All(rs) => sink.submit_all(rs).await,
    }
  };
  match tokio::time::timeout(timeout, fut).await {
    Ok(result) => result,
    Err(_) => {
      warn!(target: "assessment", timeout_ms = timeout.as_millis() as u64, "Result sink timed out");
      Err(SubmitError::Timeout(timeout.as_millis() as u64))
    }
  }
}

#[derive(Debug, Default)]
struct LedgerInner {
  records: Vec<AssessmentRecord>,
  keys: HashSet<RecordKey>,
}

/// In-memory ledger: logs each record and drops resubmissions of the same key.
#[derive(Debug, Default)]
pub struct ResultLedger {
  inner: RwLock<LedgerInner>,
}

impl ResultLedger {
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns how many records were new.
  async fn store(&self, records: Vec<AssessmentRecord>) -> usize {
    let mut inner = self.inner.write().await;
    let mut added = 0;
    for record in records {
      if !inner.keys.insert(record.key()) {
        debug!(target: "assessment", kind = ?record.kind(), prompt = %record.prompt(), "Duplicate record ignored");
        continue;
      }
      info!(
        target: "assessment",
        kind = ?record.kind(),
        variant = %record.variant(),
        student = ?record.student_id(),
        prompt = %record.prompt(),
        correct = record.is_correct(),
        "Result recorded"
      );
      inner.records.push(record);
      added += 1;
    }
    added
  }

  /// Records in arrival order, optionally for one variant.
  pub async fn list(&self, variant: Option<Variant>) -> Vec<AssessmentRecord> {
    let inner = self.inner.read().await;
    inner
      .records
      .iter()
      .filter(|r| variant.map_or(true, |v| r.variant() == v))
      .cloned()
      .collect()
  }

  pub async fn len(&self) -> usize {
    self.inner.read().await.records.len()
  }
}

#[async_trait]
impl ResultSink for ResultLedger {
  async fn submit_one(&self, record: AssessmentRecord) -> Result<(), SubmitError> {
    self.store(vec![record]).await;
    Ok(())
  }

  async fn submit_all(&self, records: Vec<AssessmentRecord>) -> Result<(), SubmitError> {
    let total = records.len();
    let added = self.store(records).await;
    info!(target: "assessment", total, added, "Bulk submission stored");
    Ok(())
  }
}
