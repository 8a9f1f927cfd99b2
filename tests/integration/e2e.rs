//! End-to-end integration tests for the Surfcoach client.
//!
//! These tests drive the real `HttpClient` and `LifecycleController`
//! against an in-process axum mock of the analysis backend: multipart
//! upload, fixed-cadence polling to a terminal state, error normalization
//! and the follow-up chat.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use surfcoach_client::{CoachApi, HttpClient, SessionStatus, VideoUpload};
use surfcoach_session::{
    ChatSession, LifecycleController, LifecycleState, Phase, PollerConfig, SendOutcome,
    ANALYSIS_FAILED_MESSAGE,
};

/// Poll cadence short enough for real-time tests.
fn fast_config() -> PollerConfig {
    PollerConfig {
        initial_delay: Duration::from_millis(10),
        poll_interval: Duration::from_millis(10),
    }
}

/// What the mock saw in an upload request.
#[derive(Debug, Default, Clone)]
struct UploadRecord {
    filename: Option<String>,
    video_bytes: usize,
    surfer_name: Option<String>,
    skill_level: Option<String>,
}

/// Scripted in-process backend.
///
/// Session lookups consume the queued responses in order; the last one
/// repeats once the queue is down to a single entry.
#[derive(Clone)]
struct MockBackend {
    session_responses: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    chat_override: Arc<Mutex<Option<(StatusCode, Option<Value>)>>>,
    create_override: Arc<Mutex<Option<(StatusCode, Value)>>>,
    uploads: Arc<Mutex<Vec<UploadRecord>>>,
    chat_messages: Arc<Mutex<Vec<String>>>,
    healthy: Arc<AtomicBool>,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            session_responses: Arc::new(Mutex::new(VecDeque::new())),
            chat_override: Arc::new(Mutex::new(None)),
            create_override: Arc::new(Mutex::new(None)),
            uploads: Arc::new(Mutex::new(Vec::new())),
            chat_messages: Arc::new(Mutex::new(Vec::new())),
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }

    fn queue_session(&self, status: StatusCode, body: Value) -> &Self {
        self.session_responses
            .lock()
            .unwrap()
            .push_back((status, body));
        self
    }

    fn override_create(&self, status: StatusCode, body: Value) {
        *self.create_override.lock().unwrap() = Some((status, body));
    }

    fn override_chat(&self, status: StatusCode, body: Option<Value>) {
        *self.chat_override.lock().unwrap() = Some((status, body));
    }

    fn set_unhealthy(&self) {
        self.healthy.store(false, Ordering::SeqCst);
    }

    fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }

    fn chat_messages(&self) -> Vec<String> {
        self.chat_messages.lock().unwrap().clone()
    }
}

async fn handle_create(State(backend): State<MockBackend>, mut multipart: Multipart) -> Response {
    if let Some((status, body)) = backend.create_override.lock().unwrap().take() {
        return (status, Json(body)).into_response();
    }

    let mut record = UploadRecord::default();
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name().unwrap_or("") {
            "video" => {
                record.filename = field.file_name().map(str::to_string);
                record.video_bytes = field.bytes().await.unwrap().len();
            }
            "surfer_name" => record.surfer_name = Some(field.text().await.unwrap()),
            "skill_level" => record.skill_level = Some(field.text().await.unwrap()),
            _ => {}
        }
    }
    let filename = record.filename.clone().unwrap_or_default();
    backend.uploads.lock().unwrap().push(record);

    (
        StatusCode::ACCEPTED,
        Json(summary_json("s1", "pending", &filename)),
    )
        .into_response()
}

async fn handle_get_session(
    State(backend): State<MockBackend>,
    Path(_id): Path<String>,
) -> Response {
    let mut queue = backend.session_responses.lock().unwrap();
    let (status, body) = if queue.len() > 1 {
        queue.pop_front().unwrap()
    } else {
        queue
            .front()
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, json!({"detail": "Session not found"})))
    };
    (status, Json(body)).into_response()
}

async fn handle_chat(
    State(backend): State<MockBackend>,
    Path(_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        backend.chat_messages.lock().unwrap().push(message.to_string());
    }

    if let Some((status, body)) = backend.chat_override.lock().unwrap().take() {
        return match body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        };
    }

    Json(json!({
        "reply": "Bend your knees more.",
        "timestamp": "2026-08-01T10:05:00Z"
    }))
    .into_response()
}

async fn handle_health(State(backend): State<MockBackend>) -> Response {
    if backend.healthy.load(Ordering::SeqCst) {
        Json(json!({"status": "ok", "version": "1.0.0"})).into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

async fn spawn_backend(backend: MockBackend) -> SocketAddr {
    let app = Router::new()
        .route("/api/v1/sessions/", post(handle_create))
        .route("/api/v1/sessions/:id", get(handle_get_session))
        .route("/api/v1/sessions/:id/chat", post(handle_chat))
        .route("/api/v1/health", get(handle_health))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn summary_json(session_id: &str, status: &str, filename: &str) -> Value {
    json!({
        "session_id": session_id,
        "status": status,
        "created_at": "2026-08-01T10:00:00Z",
        "video_filename": filename,
        "surfer_name": null,
        "skill_level": null
    })
}

fn report_json(session_id: &str) -> Value {
    json!({
        "session_id": session_id,
        "status": "completed",
        "total_frames": 300,
        "analyzed_frames": 280,
        "skipped_frames": 20,
        "video_duration_sec": 12.5,
        "video_fps": 24.0,
        "aggregated_errors": [{
            "metric": "shoulder_tilt",
            "severity": "high",
            "avg_measured_value": 28.4,
            "ideal_min": 0.0,
            "ideal_max": 15.0,
            "avg_deviation": 13.4,
            "max_deviation": 21.0,
            "frame_count": 120,
            "total_frames_analyzed": 280,
            "frequency_pct": 42.9,
            "first_timestamp_sec": 1.2,
            "last_timestamp_sec": 9.8,
            "duration_sec": 8.6,
            "worst_frame_number": 150,
            "worst_timestamp_sec": 6.2,
            "worst_measured_value": 36.0,
            "clip_path": null,
            "thumbnail_path": null
        }],
        "coaching_feedback": "Keep your shoulders level through the bottom turn.",
        "created_at": "2026-08-01T10:00:00Z",
        "processing_time_sec": 42.1
    })
}

async fn temp_video(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    tokio::fs::write(&path, b"fake mp4 payload").await.unwrap();
    path
}

fn client_for(addr: SocketAddr) -> HttpClient {
    HttpClient::new(format!("http://{addr}")).unwrap()
}

#[tokio::test]
async fn full_flow_upload_poll_complete() {
    let backend = MockBackend::new();
    backend
        .queue_session(StatusCode::OK, summary_json("s1", "processing", "wave.mp4"))
        .queue_session(StatusCode::OK, summary_json("s1", "processing", "wave.mp4"))
        .queue_session(StatusCode::OK, report_json("s1"));
    let addr = spawn_backend(backend.clone()).await;
    let client = client_for(addr);

    client.health_check().await.unwrap();

    let video = temp_video("surfcoach-e2e-full.mp4").await;
    let summary = client
        .create_session(
            VideoUpload::new(&video)
                .with_surfer_name("Kai")
                .with_skill_level("intermediate"),
        )
        .await
        .unwrap();
    assert_eq!(summary.session_id, "s1");
    assert_eq!(summary.status, SessionStatus::Pending);

    // The multipart form carried the file and both optional fields.
    let uploads = backend.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(
        uploads[0].filename.as_deref(),
        Some("surfcoach-e2e-full.mp4")
    );
    assert_eq!(uploads[0].video_bytes, b"fake mp4 payload".len());
    assert_eq!(uploads[0].surfer_name.as_deref(), Some("Kai"));
    assert_eq!(uploads[0].skill_level.as_deref(), Some("intermediate"));

    let api: Arc<dyn CoachApi> = Arc::new(client);
    let controller = LifecycleController::with_config(api, fast_config());
    let mut updates = controller.subscribe();

    controller.session_created("s1").await.unwrap();

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|state| state.phase() == Phase::Results),
    )
    .await
    .expect("analysis should reach results")
    .unwrap()
    .clone();

    let report = state.report().expect("results carries the report");
    assert_eq!(report.session_id, "s1");
    assert_eq!(report.aggregated_errors.len(), 1);

    // The stored report renders end to end.
    let markdown = surfcoach_report::MarkdownGenerator::new(report).generate();
    assert!(markdown.contains("# Surf Technique Report: s1"));
    assert!(markdown.contains("Shoulder Tilt"));
    assert!(markdown.contains("Keep your shoulders level through the bottom turn."));
}

#[tokio::test]
async fn failed_analysis_returns_to_upload_with_fixed_message() {
    let backend = MockBackend::new();
    backend
        .queue_session(StatusCode::OK, summary_json("s1", "processing", "wave.mp4"))
        .queue_session(StatusCode::OK, summary_json("s1", "failed", "wave.mp4"));
    let addr = spawn_backend(backend).await;
    let client = client_for(addr);

    let api: Arc<dyn CoachApi> = Arc::new(client);
    let controller = LifecycleController::with_config(api, fast_config());
    let mut updates = controller.subscribe();

    controller.session_created("s1").await.unwrap();

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|state| state.phase() == Phase::Upload && state.error().is_some()),
    )
    .await
    .expect("flow should fail")
    .unwrap()
    .clone();

    assert_eq!(state.error(), Some(ANALYSIS_FAILED_MESSAGE));
}

#[tokio::test]
async fn poll_transport_failure_surfaces_detail() {
    let backend = MockBackend::new();
    backend
        .queue_session(StatusCode::OK, summary_json("s1", "processing", "wave.mp4"))
        .queue_session(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"detail": "analysis backend crashed"}),
        );
    let addr = spawn_backend(backend).await;
    let client = client_for(addr);

    let api: Arc<dyn CoachApi> = Arc::new(client);
    let controller = LifecycleController::with_config(api, fast_config());
    let mut updates = controller.subscribe();

    controller.session_created("s1").await.unwrap();

    let state = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|state| state.error().is_some()),
    )
    .await
    .expect("flow should fail")
    .unwrap()
    .clone();

    assert_eq!(state.error(), Some("analysis backend crashed"));
    assert!(matches!(state, LifecycleState::Upload { .. }));
}

#[tokio::test]
async fn upload_rejection_detail_is_surfaced_verbatim() {
    let backend = MockBackend::new();
    backend.override_create(
        StatusCode::PAYLOAD_TOO_LARGE,
        json!({"detail": "file too large"}),
    );
    let addr = spawn_backend(backend).await;
    let client = client_for(addr);

    let video = temp_video("surfcoach-e2e-large.mp4").await;
    let err = client
        .create_session(VideoUpload::new(&video))
        .await
        .unwrap_err();

    assert_eq!(err.message(), "file too large");
    assert!(!err.is_validation());
}

#[tokio::test]
async fn chat_error_without_body_is_synthesized() {
    let backend = MockBackend::new();
    backend.override_chat(StatusCode::INTERNAL_SERVER_ERROR, None);
    let addr = spawn_backend(backend).await;
    let client = client_for(addr);

    let api: Arc<dyn CoachApi> = Arc::new(client);
    let chat = ChatSession::new(api, "s1");

    let outcome = chat.send("How was my stance?").await;
    assert_eq!(
        outcome,
        SendOutcome::Failed {
            message: "Chat failed (500)".to_string()
        }
    );

    // The user's question stays in the history after the failure.
    let messages = chat.messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "How was my stance?");
}

#[tokio::test]
async fn chat_round_trip_appends_reply() {
    let backend = MockBackend::new();
    let addr = spawn_backend(backend.clone()).await;
    let client = client_for(addr);

    let api: Arc<dyn CoachApi> = Arc::new(client);
    let chat = ChatSession::new(api, "s1");

    let outcome = chat.send("  How do I fix my stance?  ").await;
    assert_eq!(
        outcome,
        SendOutcome::Answered {
            reply: "Bend your knees more.".to_string()
        }
    );

    // The backend received the trimmed message.
    assert_eq!(backend.chat_messages(), vec!["How do I fix my stance?"]);

    let messages = chat.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "Bend your knees more.");
}

#[tokio::test]
async fn healthy_backend_passes_health_check() {
    let backend = MockBackend::new();
    let addr = spawn_backend(backend).await;
    let client = client_for(addr);

    client.health_check().await.unwrap();
}

#[tokio::test]
async fn unhealthy_backend_fails_health_check() {
    let backend = MockBackend::new();
    backend.set_unhealthy();
    let addr = spawn_backend(backend).await;
    let client = client_for(addr);

    let err = client.health_check().await.unwrap_err();
    assert_eq!(err.message(), "Health check failed (503)");
}
