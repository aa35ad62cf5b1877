//! Named page routes. All of them serve the SPA's index.html; this enum only builds links.

use serde::Serialize;

use crate::domain::Variant;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageRoute {
  Home,
  Dashboard,
  PreTest { student: Option<u64> },
  PostTest { student: Option<u64> },
  Games,
  /// Teacher answer key for a game family; no variant means the page default.
  AnswerKey { game: String, variant: Option<Variant> },
  /// Teacher-only grapheme checklist, opened in its own tab.
  CodeTeacher { variant: Variant },
}

#[derive(Serialize)]
struct Query<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  game: Option<&'a str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  variant: Option<Variant>,
  #[serde(skip_serializing_if = "Option::is_none")]
  student: Option<u64>,
}

impl PageRoute {
  /// One route per registered path, parameters left empty.
  pub fn registered() -> [PageRoute; 7] {
    [
      PageRoute::Home,
      PageRoute::Dashboard,
      PageRoute::PreTest { student: None },
      PageRoute::PostTest { student: None },
      PageRoute::Games,
      PageRoute::AnswerKey { game: String::new(), variant: None },
      PageRoute::CodeTeacher { variant: Variant::default() },
    ]
  }

  pub fn path(&self) -> &'static str {
    match self {
      PageRoute::Home => "/",
      PageRoute::Dashboard => "/dashboard",
      PageRoute::PreTest { .. } => "/pre-test",
      PageRoute::PostTest { .. } => "/post-test",
      PageRoute::Games => "/games",
      PageRoute::AnswerKey { .. } => "/games/answer-key",
      PageRoute::CodeTeacher { .. } => "/tests/code/teacher",
    }
  }

  fn query(&self) -> Query<'_> {
    let none = Query { game: None, variant: None, student: None };
    match self {
      PageRoute::PreTest { student } | PageRoute::PostTest { student } => Query { student: *student, ..none },
      PageRoute::AnswerKey { game, variant } => Query { game: Some(game), variant: *variant, ..none },
      PageRoute::CodeTeacher { variant } => Query { variant: Some(*variant), ..none },
      PageRoute::Home | PageRoute::Dashboard | PageRoute::Games => none,
    }
  }

  /// Path plus percent-encoded query string.
  pub fn url(&self) -> String {
    // Only strings, unit enums and integers go in, which always encode.
    match serde_urlencoded::to_string(self.query()) {
      Ok(q) if !q.is_empty() => format!("{}?{}", self.path(), q),
      _ => self.path().to_string(),
    }
  }

  /// The test page for a variant, optionally preselecting a student.
  pub fn test_page(variant: Variant, student: Option<u64>) -> Self {
    match variant {
      Variant::Pretest => PageRoute::PreTest { student },
      Variant::Posttest => PageRoute::PostTest { student },
    }
  }
}
