//! Student roster: create, list by name, look up by id.
//!
//! Lives in memory; when a `roster_path` is configured every change is written through to a
//! JSON file (temp file + rename) and the file is read back on startup.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::domain::{Grade, NewStudent, Student};
use crate::error::StoreError;
use crate::seeds::seed_student_names;

const MAX_NAME_CHARS: usize = 255;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RosterFile {
  next_id: u64,
  students: Vec<Student>,
}

#[derive(Debug)]
pub struct StudentStore {
  inner: RwLock<RosterFile>,
  path: Option<PathBuf>,
}

impl StudentStore {
  pub fn in_memory() -> Self {
    Self { inner: RwLock::new(RosterFile { next_id: 1, students: Vec::new() }), path: None }
  }

  /// Open the roster at `path` (missing file means empty), or an in-memory one.
  #[instrument(level = "info")]
  pub async fn open(path: Option<PathBuf>) -> Result<Self, StoreError> {
    let Some(path) = path else {
      info!(target: "roster", "Roster kept in memory");
      return Ok(Self::in_memory());
    };
    let file = match tokio::fs::read_to_string(&path).await {
      Ok(raw) => {
        let mut file: RosterFile = serde_json::from_str(&raw)?;
        let max_id = file.students.iter().map(|s| s.id).max().unwrap_or(0);
        file.next_id = file.next_id.max(max_id + 1);
        file
      }
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => RosterFile { next_id: 1, students: Vec::new() },
      Err(e) => return Err(e.into()),
    };
    info!(target: "roster", path = %path.display(), students = file.students.len(), "Roster loaded");
    Ok(Self { inner: RwLock::new(file), path: Some(path) })
  }

  /// Insert the demo names if the roster is empty. Returns how many were added.
  pub async fn seed_demo(&self) -> Result<usize, StoreError> {
    if !self.inner.read().await.students.is_empty() {
      return Ok(0);
    }
    let mut added = 0;
    for (i, name) in seed_student_names().iter().enumerate() {
      let grade = Grade::ALL[i % 3].to_string();
      self.create(NewStudent { name: name.to_string(), grade }).await?;
      added += 1;
    }
    info!(target: "roster", added, "Seeded demo roster");
    Ok(added)
  }

  #[instrument(level = "debug", skip(self, new), fields(grade = %new.grade))]
  pub async fn create(&self, new: NewStudent) -> Result<Student, StoreError> {
    let name = new.name.trim();
    if name.is_empty() {
      return Err(StoreError::Validation("name is required".into()));
    }
    if name.chars().count() > MAX_NAME_CHARS {
      return Err(StoreError::Validation(format!("name must be at most {} characters", MAX_NAME_CHARS)));
    }
    let grade: Grade = new.grade.parse().map_err(StoreError::Validation)?;

    let mut inner = self.inner.write().await;
    let student = Student { id: inner.next_id, name: name.to_string(), grade, created_at: Utc::now() };
    inner.students.push(student.clone());
    inner.next_id += 1;

    if let Some(path) = &self.path {
      if let Err(e) = write_file(path, &inner).await {
        warn!(target: "roster", error = %e, "Roster write failed; rolling back");
        inner.students.pop();
        inner.next_id -= 1;
        return Err(e);
      }
    }
    info!(target: "roster", id = student.id, grade = %student.grade, "Student created");
    Ok(student)
  }

  /// Everyone, by name (case-insensitive) then id.
  pub async fn list(&self) -> Vec<Student> {
    let mut students = self.inner.read().await.students.clone();
    students.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then(a.id.cmp(&b.id)));
    students
  }

  pub async fn get(&self, id: u64) -> Result<Student, StoreError> {
    self
      .inner
      .read()
      .await
      .students
      .iter()
      .find(|s| s.id == id)
      .cloned()
      .ok_or(StoreError::NotFound(id))
  }
}

async fn write_file(path: &Path, file: &RosterFile) -> Result<(), StoreError> {
  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent).await?;
  }
  let json = serde_json::to_string_pretty(file)?;
  let tmp = path.with_extension("json.tmp");
  tokio::fs::write(&tmp, json).await?;
  tokio::fs::rename(&tmp, path).await?;
  Ok(())
}
