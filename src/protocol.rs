//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Client-to-server WebSocket messages are `GameEvent` and `AssessmentEvent` themselves.

use serde::{Deserialize, Serialize};

use crate::assessment::code_knowledge::ChecklistColumn;
use crate::assessment::{AssessmentRecord, AssessmentSession};
use crate::domain::{AnswerKey, Student, Variant};
use crate::game::{GameSession, WordFeedback};
use crate::pages::PageRoute;

/// Messages the server sends on `/ws/games`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerGameMessage<'a> {
    State {
        session: &'a GameSession,
        #[serde(skip_serializing_if = "Option::is_none")]
        word_feedback: Option<WordFeedback>,
    },
    Error {
        message: String,
    },
}

impl<'a> ServerGameMessage<'a> {
    pub fn state(session: &'a GameSession) -> Self {
        ServerGameMessage::State { session, word_feedback: session.word_feedback() }
    }
}

/// Messages the server sends on `/ws/assessment`.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerAssessmentMessage<'a> {
    State {
        session: &'a AssessmentSession,
    },
    Submitted {
        count: usize,
        session: &'a AssessmentSession,
    },
    SubmitFailed {
        message: String,
        retryable: bool,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct AssessmentWsQuery {
    pub variant: Option<String>,
    pub student: Option<u64>,
}

// ---------- HTTP DTOs ----------

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnswerKeyQuery {
    pub game: Option<String>,
    pub variant: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnswerKeyOut {
    pub variant: Variant,
    #[serde(flatten)]
    pub key: AnswerKey,
    /// Where the page's "back" link goes.
    pub games_url: String,
}

#[derive(Debug, Deserialize)]
pub struct VariantQuery {
    pub variant: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CodeChecklistOut {
    pub variant: Variant,
    pub total: usize,
    pub columns: Vec<ChecklistColumn>,
}

/// Roster entry plus the links that open each test for this student.
#[derive(Debug, Serialize)]
pub struct StudentOut {
    #[serde(flatten)]
    pub student: Student,
    pub pre_test_url: String,
    pub post_test_url: String,
}

impl From<Student> for StudentOut {
    fn from(student: Student) -> Self {
        let id = Some(student.id);
        Self {
            pre_test_url: PageRoute::test_page(Variant::Pretest, id).url(),
            post_test_url: PageRoute::test_page(Variant::Posttest, id).url(),
            student,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultsQuery {
    pub variant: Option<Variant>,
}

#[derive(Debug, Serialize)]
pub struct ResultsOut {
    pub count: usize,
    pub records: Vec<AssessmentRecord>,
}
