//! HTTP + WebSocket API
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get session status
//! - DELETE /session/{id} - End session
//! - POST /session/{id}/capture - Tap to capture
//! - POST /session/{id}/verify - Tap verify
//! - POST /session/{id}/save - Tap save
//! - POST /session/{id}/cancel - Cancel in-flight transition
//! - GET /session/{id}/card - ID card (after save)
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::AppConfig;
use crate::core::{RandomSampler, ScreenNavigator, Sequencer, SystemClock};
use crate::types::{Alert, IdCard, Operation, Screen, SequencerError, SequencerOutput};

/// Session state
pub struct Session {
    pub id: String,
    pub sequencer: Sequencer,
    pub navigator: ScreenNavigator,
    pub update_tx: broadcast::Sender<SequencerOutput>,
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, Session>>,
    pub config: AppConfig,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
}

/// Session status response
#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub screen: Screen,
    pub status_text: String,
    pub detail_text: String,
    #[serde(flatten)]
    pub output: SequencerOutput,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Error body for rejected requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
}

#[derive(Debug)]
pub enum ApiError {
    SessionNotFound,
    CardLocked,
    Rejected(SequencerError),
}

impl From<SequencerError> for ApiError {
    fn from(err: SequencerError) -> Self {
        ApiError::Rejected(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    code: "SESSION_NOT_FOUND".to_string(),
                    message: "session not found".to_string(),
                    alert: None,
                },
            ),
            ApiError::CardLocked => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    code: "CARD_LOCKED".to_string(),
                    message: "save face data before viewing the card".to_string(),
                    alert: None,
                },
            ),
            ApiError::Rejected(err) => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    code: err.reason().code().to_string(),
                    message: err.to_string(),
                    alert: Some(err.alert()),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Create the API router
pub fn create_router(config: AppConfig) -> Router {
    let state = Arc::new(AppState {
        sessions: RwLock::new(HashMap::new()),
        config,
    });

    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/capture", post(capture))
        .route("/session/:id/verify", post(verify))
        .route("/session/:id/save", post(save))
        .route("/session/:id/cancel", post(cancel))
        .route("/session/:id/card", get(get_card))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(State(state): State<Arc<AppState>>) -> Json<NewSessionResponse> {
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);
    let navigator = ScreenNavigator::new();

    let session = Session {
        id: session_id.clone(),
        sequencer: Sequencer::simulated(
            state.config.sequencer.clone(),
            SystemClock::new(),
            RandomSampler,
            navigator.clone(),
        ),
        navigator,
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);
    tracing::info!(session = %session_id, "Session created");

    Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
    })
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionStatusResponse>, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(ApiError::SessionNotFound)?;

    let output = session.sequencer.current_output();
    Ok(Json(SessionStatusResponse {
        session_id: session.id.clone(),
        screen: session.navigator.current(),
        status_text: output.status_text().to_string(),
        detail_text: output.detail_text().to_string(),
        output,
    }))
}

/// End a session. In-flight effects are dropped and live streams close.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.remove(&id).ok_or(ApiError::SessionNotFound)?;
    tracing::info!(session = %id, state = %session.sequencer.state(), "Session ended");
    Ok(StatusCode::NO_CONTENT)
}

async fn capture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SequencerOutput>, ApiError> {
    run_operation(state, id, Operation::Capture).await
}

async fn verify(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SequencerOutput>, ApiError> {
    run_operation(state, id, Operation::Verify).await
}

async fn save(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SequencerOutput>, ApiError> {
    run_operation(state, id, Operation::Save).await
}

async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SequencerOutput>, ApiError> {
    run_operation(state, id, Operation::Cancel).await
}

/// Apply an operation, broadcast its output and start firing its effects
async fn run_operation(
    state: Arc<AppState>,
    id: String,
    operation: Operation,
) -> Result<Json<SequencerOutput>, ApiError> {
    let output = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(ApiError::SessionNotFound)?;

        let output = match operation {
            Operation::Capture => session.sequencer.begin_capture(),
            Operation::Verify => session.sequencer.verify(),
            Operation::Save => session.sequencer.save(),
            Operation::Cancel => session.sequencer.cancel(),
        }?;
        let _ = session.update_tx.send(output.clone());
        output
    };

    if output.busy {
        tokio::spawn(drive_session(state, id));
    }
    Ok(Json(output))
}

/// Sleep until each pending effect is due, fire it and broadcast the result
async fn drive_session(state: Arc<AppState>, id: String) {
    loop {
        let wait = {
            let sessions = state.sessions.read().await;
            match sessions.get(&id).and_then(|s| s.sequencer.time_until_next()) {
                Some(wait) => wait,
                None => return,
            }
        };
        tokio::time::sleep(wait).await;

        let mut sessions = state.sessions.write().await;
        let session = match sessions.get_mut(&id) {
            Some(session) => session,
            None => return,
        };
        for output in session.sequencer.poll() {
            tracing::debug!(session = %id, state = %output.state, reason = output.reason.code(), "Effect fired");
            let _ = session.update_tx.send(output);
        }
    }
}

/// Get the ID card once the session has navigated to it
async fn get_card(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<IdCard>, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(ApiError::SessionNotFound)?;

    if session.navigator.current() != Screen::IdInfo {
        return Err(ApiError::CardLocked);
    }
    Ok(Json(state.config.card.clone()))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or(ApiError::SessionNotFound)?;
    let rx = session.update_tx.subscribe();
    drop(sessions);

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward updates until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<SequencerOutput>) {
    let (mut sender, mut receiver) = socket.split();
    loop {
        tokio::select! {
            update = rx.recv() => match update {
                Ok(output) => {
                    let json = serde_json::to_string(&output).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "WebSocket client lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Generate session ID
fn generate_session_id() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("session_{:x}_{}", nanos as u64, seq)
}

/// Run the API server
pub async fn run_server(addr: &str, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(config);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API listening");
    println!("facecap API running on {}", addr);
    println!("  POST /session/new          - Create session");
    println!("  GET  /session/:id          - Get status");
    println!("  DELETE /session/:id        - End session");
    println!("  POST /session/:id/capture  - Tap to capture");
    println!("  POST /session/:id/verify   - Tap verify");
    println!("  POST /session/:id/save     - Tap save");
    println!("  POST /session/:id/cancel   - Cancel in-flight step");
    println!("  GET  /session/:id/card     - ID card (after save)");
    println!("  WS   /ws/:id               - Live updates");
    println!("  GET  /health               - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
