//! WebSocket upgrade + session loops. Each connection owns one session; every client event is
//! parsed as JSON, applied, and answered with a single JSON message. Game timers are armed as
//! sleeping tasks that post their token back into the loop.
//!
//! The loops run over the socket's split halves so they can be driven by any stream/sink pair.

use std::fmt;
use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    Query, State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::assessment::{AssessmentEvent, AssessmentSession, Reply};
use crate::domain::Variant;
use crate::game::{GameEvent, GameSession};
use crate::protocol::{AssessmentWsQuery, ServerAssessmentMessage, ServerGameMessage};
use crate::state::AppState;
use crate::timer::Scheduled;
use crate::util::trunc_for_log;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_games_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "phonics_backend", "Games WebSocket upgrade requested");
  ws.on_upgrade(move |socket: WebSocket| {
    let (outgoing, incoming) = socket.split();
    run_games(incoming, outgoing, state)
  })
}

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_assessment_upgrade(
  ws: WebSocketUpgrade,
  State(state): State<Arc<AppState>>,
  Query(q): Query<AssessmentWsQuery>,
) -> impl IntoResponse {
  let variant = Variant::from_query(q.variant.as_deref());
  info!(target: "phonics_backend", %variant, student = ?q.student, "Assessment WebSocket upgrade requested");
  ws.on_upgrade(move |socket: WebSocket| {
    let (outgoing, incoming) = socket.split();
    run_assessment(incoming, outgoing, state, variant, q.student)
  })
}

/// Serialize and send; false once the socket is unusable.
async fn send_json<S, T>(out: &mut S, msg: &T) -> bool
where
  S: Sink<Message> + Unpin,
  S::Error: fmt::Display,
  T: Serialize,
{
  let text = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  });
  match out.send(Message::Text(text)).await {
    Ok(()) => true,
    Err(e) => {
      error!(target: "phonics_backend", error = %e, "WS send error");
      false
    }
  }
}

fn arm_timers(session: &mut GameSession, tx: &mpsc::UnboundedSender<Scheduled>) {
  for token in session.take_timers() {
    let tx = tx.clone();
    tokio::spawn(async move {
      tokio::time::sleep(token.delay()).await;
      // Receiver gone means the socket closed; nothing to do.
      let _ = tx.send(token);
    });
  }
}

#[instrument(level = "info", skip_all)]
async fn run_games<St, Si, E>(mut incoming: St, mut outgoing: Si, state: Arc<AppState>)
where
  St: Stream<Item = Result<Message, E>> + Unpin,
  Si: Sink<Message> + Unpin,
  Si::Error: fmt::Display,
{
  info!(target: "game", "Games WebSocket connected");
  let mut session = GameSession::new(state.catalog.clone(), state.config.timings, StdRng::from_entropy());
  let (timer_tx, mut timer_rx) = mpsc::unbounded_channel::<Scheduled>();
  let opened = Instant::now();

  if !send_json(&mut outgoing, &ServerGameMessage::state(&session)).await {
    return;
  }

  loop {
    tokio::select! {
      frame = incoming.next() => {
        let Some(Ok(msg)) = frame else { break };
        match msg {
          Message::Text(txt) => {
            let failure = match serde_json::from_str::<GameEvent>(&txt) {
              Ok(event) => {
                debug!(target: "game", event = event.name(), "WS received");
                let now_ms = opened.elapsed().as_millis() as u64;
                match session.apply(event, now_ms) {
                  Ok(()) => {
                    arm_timers(&mut session, &timer_tx);
                    None
                  }
                  Err(e) => {
                    warn!(target: "game", error = %e, "Event rejected");
                    Some(e.to_string())
                  }
                }
              }
              Err(e) => Some(format!("Invalid JSON: {} in {}", e, trunc_for_log(&txt, 80))),
            };
            let sent = match failure {
              None => send_json(&mut outgoing, &ServerGameMessage::state(&session)).await,
              Some(message) => send_json(&mut outgoing, &ServerGameMessage::Error { message }).await,
            };
            if !sent {
              break;
            }
          }
          Message::Ping(payload) => { let _ = outgoing.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
      Some(token) = timer_rx.recv() => {
        if session.fire(&token) {
          debug!(target: "game", kind = ?token.kind, game_type = ?session.active().game_type(), "Timer fired");
          if !send_json(&mut outgoing, &ServerGameMessage::state(&session)).await {
            break;
          }
        }
      }
    }
  }
  let (category, game) = session.selection();
  info!(target: "game", category, game, "Games WebSocket disconnected");
}

#[instrument(level = "info", skip(incoming, outgoing, state))]
async fn run_assessment<St, Si, E>(
  mut incoming: St,
  mut outgoing: Si,
  state: Arc<AppState>,
  variant: Variant,
  student: Option<u64>,
) where
  St: Stream<Item = Result<Message, E>> + Unpin,
  Si: Sink<Message> + Unpin,
  Si::Error: fmt::Display,
{
  let mut session = match student {
    None => AssessmentSession::new(variant, None),
    Some(id) => match state.roster.get(id).await {
      Ok(student) => AssessmentSession::for_student(variant, &student),
      Err(e) => {
        warn!(target: "assessment", error = %e, "Assessment opened for unknown student");
        send_json(&mut outgoing, &ServerAssessmentMessage::Error { message: e.to_string() }).await;
        let _ = outgoing.send(Message::Close(None)).await;
        return;
      }
    },
  };
  info!(target: "assessment", %variant, ?student, "Assessment WebSocket connected");

  if !send_json(&mut outgoing, &ServerAssessmentMessage::State { session: &session }).await {
    return;
  }

  while let Some(Ok(msg)) = incoming.next().await {
    match msg {
      Message::Text(txt) => {
        let sent = match serde_json::from_str::<AssessmentEvent>(&txt) {
          Ok(event) => {
            debug!(target: "assessment", event = event.name(), "WS received");
            match session.handle(event, state.sink(), state.submit_timeout()).await {
              Ok(Reply::Updated) => send_json(&mut outgoing, &ServerAssessmentMessage::State { session: &session }).await,
              Ok(Reply::Submitted { count }) => {
                send_json(&mut outgoing, &ServerAssessmentMessage::Submitted { count, session: &session }).await
              }
              Err(e) if e.is_retryable() => {
                let msg = ServerAssessmentMessage::SubmitFailed { message: e.to_string(), retryable: true };
                send_json(&mut outgoing, &msg).await
              }
              Err(e) => send_json(&mut outgoing, &ServerAssessmentMessage::Error { message: e.to_string() }).await,
            }
          }
          Err(e) => {
            let message = format!("Invalid JSON: {} in {}", e, trunc_for_log(&txt, 80));
            send_json(&mut outgoing, &ServerAssessmentMessage::Error { message }).await
          }
        };
        if !sent {
          break;
        }
      }
      Message::Ping(payload) => { let _ = outgoing.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "assessment", variant = %session.variant(), tab = ?session.active(), "Assessment WebSocket disconnected");
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
  use serde_json::{json, Value};

  use crate::config::AppConfig;
  use crate::domain::NewStudent;

  type Inbound = UnboundedSender<Result<Message, axum::Error>>;

  fn app_state() -> Arc<AppState> {
    Arc::new(AppState::in_memory(AppConfig::default()).unwrap())
  }

  fn send(tx: &Inbound, event: Value) {
    tx.unbounded_send(Ok(Message::Text(event.to_string()))).unwrap();
  }

  async fn next_json(rx: &mut UnboundedReceiver<Message>) -> Value {
    match rx.next().await {
      Some(Message::Text(txt)) => serde_json::from_str(&txt).unwrap(),
      other => panic!("expected a text frame, got {:?}", other),
    }
  }

  #[tokio::test(start_paused = true)]
  async fn rejected_tile_flash_clears_in_a_second_push() {
    let (in_tx, in_rx): (Inbound, _) = unbounded();
    let (out_tx, mut out_rx) = unbounded();
    let task = tokio::spawn(run_games(in_rx, out_tx, app_state()));

    let first = next_json(&mut out_rx).await;
    assert_eq!(first["type"], "state");
    let round = &first["session"]["active"]["round"];
    assert_eq!(round["word"], "cat");
    let wrong = round["available"].as_array().unwrap().iter().find(|t| t["letter"] == "a").unwrap()["id"].clone();

    send(&in_tx, json!({ "type": "drop_tile", "tile_id": wrong, "slot": 0 }));
    let rejected = next_json(&mut out_rx).await;
    assert_eq!(rejected["word_feedback"]["border"], "error");
    assert_eq!(rejected["session"]["active"]["round"]["is_shaking"], true);

    let cleared = next_json(&mut out_rx).await;
    assert_eq!(cleared["type"], "state");
    assert_eq!(cleared["word_feedback"]["border"], "neutral");
    assert_eq!(cleared["session"]["active"]["round"]["is_shaking"], false);

    drop(in_tx);
    task.await.unwrap();
  }

  #[tokio::test]
  async fn bad_game_events_get_error_replies() {
    let (in_tx, in_rx): (Inbound, _) = unbounded();
    let (out_tx, mut out_rx) = unbounded();
    let task = tokio::spawn(run_games(in_rx, out_tx, app_state()));
    next_json(&mut out_rx).await;

    in_tx.unbounded_send(Ok(Message::Text("not json".into()))).unwrap();
    let reply = next_json(&mut out_rx).await;
    assert_eq!(reply["type"], "error");
    assert!(reply["message"].as_str().unwrap().starts_with("Invalid JSON"));

    send(&in_tx, json!({ "type": "next_sentence" }));
    assert_eq!(next_json(&mut out_rx).await["message"], "'next_sentence' does not apply to a WordBuilding game");

    drop(in_tx);
    task.await.unwrap();
  }

  #[tokio::test]
  async fn unknown_student_gets_one_error_then_close() {
    let (_in_tx, in_rx): (Inbound, _) = unbounded();
    let (out_tx, mut out_rx) = unbounded();
    run_assessment(in_rx, out_tx, app_state(), Variant::Pretest, Some(404)).await;

    let reply = next_json(&mut out_rx).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["message"], "student 404 not found");
    assert!(matches!(out_rx.next().await, Some(Message::Close(None))));
    assert!(out_rx.next().await.is_none());
  }

  #[tokio::test]
  async fn student_session_submits_through_the_ledger() {
    let state = app_state();
    let student = state.roster.create(NewStudent { name: "Ana".into(), grade: "Grade 1".into() }).await.unwrap();
    let (in_tx, in_rx): (Inbound, _) = unbounded();
    let (out_tx, mut out_rx) = unbounded();
    let task = tokio::spawn(run_assessment(in_rx, out_tx, state.clone(), Variant::Posttest, Some(student.id)));

    let opened = next_json(&mut out_rx).await;
    assert_eq!(opened["session"]["student_name"], "Ana");

    send(&in_tx, json!({ "type": "set_response", "prompt": "pig", "response": "pig" }));
    assert_eq!(next_json(&mut out_rx).await["type"], "state");
    send(&in_tx, json!({ "type": "submit_one", "prompt": "pig" }));
    let submitted = next_json(&mut out_rx).await;
    assert_eq!(submitted["type"], "submitted");
    assert_eq!(submitted["count"], 1);
    send(&in_tx, json!({ "type": "retry_submit" }));
    assert_eq!(next_json(&mut out_rx).await["message"], "no failed submission to retry");

    drop(in_tx);
    task.await.unwrap();
    let stored = state.ledger.list(Some(Variant::Posttest)).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].student_id(), Some(student.id));
  }
}
