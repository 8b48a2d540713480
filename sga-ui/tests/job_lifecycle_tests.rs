//! End-to-end job lifecycle tests against an in-process mock of the
//! analysis service.
//!
//! The mock serves the real wire contract over a loopback socket: multipart
//! submission, an SSE progress feed, and a JSON result fetch. Each test
//! drives the controller through submit/run/acknowledge and asserts on the
//! surface state the interpreter painted.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use sga_common::api::AnalysisOptions;
use sga_common::Error;
use sga_ui::client::AnalysisClient;
use sga_ui::controller::{JobController, JobOutcome};
use sga_ui::normalize::MarkerPosition;
use sga_ui::surface::DisplaySurface;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
enum SubmitMode {
    #[default]
    Accept,
    Reject(&'static str),
    AcceptWithoutJobId,
}

/// Scripted mock of the analysis service.
#[derive(Debug, Default)]
struct MockService {
    /// Raw SSE body returned by the progress endpoint.
    feed: String,
    /// JSON body returned by the result endpoint; `None` answers 500.
    result: Option<serde_json::Value>,
    submit_mode: SubmitMode,
    submissions: AtomicUsize,
    result_fetches: AtomicUsize,
    progress_opens: Mutex<Vec<String>>,
    seen_fields: Mutex<Vec<(String, String)>>,
}

async fn submit_handler(
    State(state): State<Arc<MockService>>,
    mut multipart: Multipart,
) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "score_file" {
            let bytes = field.bytes().await.unwrap_or_default();
            state
                .seen_fields
                .lock()
                .unwrap()
                .push((name, format!("{} bytes", bytes.len())));
        } else {
            let value = field.text().await.unwrap_or_default();
            state.seen_fields.lock().unwrap().push((name, value));
        }
    }

    match &state.submit_mode {
        SubmitMode::Reject(message) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
        SubmitMode::AcceptWithoutJobId => Json(json!({})).into_response(),
        SubmitMode::Accept => {
            let n = state.submissions.fetch_add(1, Ordering::SeqCst) + 1;
            Json(json!({ "job_id": format!("job-{}", n) })).into_response()
        }
    }
}

async fn progress_handler(
    State(state): State<Arc<MockService>>,
    Path(job_id): Path<String>,
) -> Response {
    state.progress_opens.lock().unwrap().push(job_id);
    (
        [(header::CONTENT_TYPE, "text/event-stream")],
        state.feed.clone(),
    )
        .into_response()
}

async fn result_handler(
    State(state): State<Arc<MockService>>,
    Path(_job_id): Path<String>,
) -> Response {
    state.result_fetches.fetch_add(1, Ordering::SeqCst);
    match &state.result {
        Some(body) => Json(body.clone()).into_response(),
        None => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn spawn_service(state: Arc<MockService>) -> String {
    let app = Router::new()
        .route("/api/analyze", post(submit_handler))
        .route("/api/progress/:job_id", get(progress_handler))
        .route("/api/result/:job_id", get(result_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serialize events into the SSE framing the service uses.
fn sse_feed(events: &[serde_json::Value]) -> String {
    events
        .iter()
        .map(|event| format!("data: {}\n\n", event))
        .collect()
}

/// Surface double recording the latest value written to each slot.
#[derive(Debug, Default)]
struct RecordingSurface {
    percents: BTreeMap<String, u8>,
    status: Vec<String>,
    elapsed: Option<(u64, u64)>,
    markers: BTreeMap<String, MarkerPosition>,
    all_complete: usize,
}

impl DisplaySurface for RecordingSurface {
    fn set_channel_percent(&mut self, channel: &str, pct: u8) {
        self.percents.insert(channel.to_string(), pct);
    }
    fn set_channel_label(&mut self, _channel: &str, _text: &str) {}
    fn mark_complete(&mut self, _channel: &str) {}
    fn mark_all_complete(&mut self) {
        self.all_complete += 1;
    }
    fn set_status_text(&mut self, text: &str) {
        self.status.push(text.to_string());
    }
    fn set_elapsed(&mut self, minutes: u64, seconds: u64) {
        self.elapsed = Some((minutes, seconds));
    }
    fn set_marker(&mut self, channel: &str, position: MarkerPosition) {
        self.markers.insert(channel.to_string(), position);
    }
}

const ALL_CHANNELS: [&str; 9] = [
    "range",
    "key",
    "articulation",
    "rhythm",
    "dynamics",
    "availability",
    "tempo",
    "duration",
    "meter",
];

fn default_options() -> AnalysisOptions {
    AnalysisOptions::new(false, false, false, 2.0).unwrap()
}

async fn submitted_controller(
    url: String,
    options: &AnalysisOptions,
) -> JobController {
    let mut controller = JobController::new(AnalysisClient::new(url).unwrap());
    controller
        .submit("score.musicxml", b"<score-partwise/>".to_vec(), options)
        .await
        .unwrap();
    controller
}

#[tokio::test]
async fn test_full_job_lifecycle() {
    let state = Arc::new(MockService {
        feed: sse_feed(&[
            json!({"type":"observed","analyzer":"range","idx":3,"total":10,"grade":2}),
            json!({"type":"analyzer","analyzer":"key_range"}),
            json!({"type":"analyzer","analyzer":"tempo_duration"}),
            json!({"type":"done"}),
        ]),
        result: Some(json!({"result":{
            "total_measures": 16,
            "confidences": {"tempo": null, "key": 0.87},
            "analysis_notes": {
                "key": {"measure": 4},
                "tempo": [{"measure": 1}, {"measure": "x"}],
                "meter": {"meter_data": {"a": {"measure": 2}, "b": {"measure": 8}}},
            },
        }})),
        ..Default::default()
    });
    let url = spawn_service(state.clone()).await;

    let options = default_options();
    let mut controller = submitted_controller(url, &options).await;
    assert_eq!(controller.job_handle().unwrap().as_str(), "job-1");

    let mut surface = RecordingSurface::default();
    let outcome = controller.run(&mut surface).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed);

    // Done forces every channel slot to 100%, observed or not
    for channel in ALL_CHANNELS {
        assert_eq!(surface.percents[channel], 100, "channel {}", channel);
    }
    assert_eq!(surface.all_complete, 1);
    assert_eq!(surface.status.last().unwrap(), "Done.");
    assert!(surface.elapsed.is_some());

    // The result is fetched exactly once, after completion
    assert_eq!(state.result_fetches.load(Ordering::SeqCst), 1);

    assert!(controller.can_acknowledge());
    let applied = controller
        .acknowledge(&mut surface)
        .expect("stored result applies");

    assert_eq!(surface.markers["tempo"], MarkerPosition::Absent);
    assert_eq!(surface.markers["key"], MarkerPosition::At(0.87));
    assert_eq!(applied.total_measures, Some(16.0));
    // key 4, tempo 1 (the non-finite entry dropped), meter 2 and 8
    assert_eq!(applied.ticks.len(), 4);

    // Options crossed the wire in their string encoding
    let fields = state.seen_fields.lock().unwrap().clone();
    assert!(fields.contains(&("target_only".to_string(), "false".to_string())));
    assert!(fields.contains(&("strings_only".to_string(), "false".to_string())));
    assert!(fields.contains(&("full_grade_analysis".to_string(), "false".to_string())));
    assert!(fields.contains(&("target_grade".to_string(), "2".to_string())));
}

#[tokio::test]
async fn test_submission_rejected_with_service_message() {
    let state = Arc::new(MockService {
        submit_mode: SubmitMode::Reject("No score file provided."),
        ..Default::default()
    });
    let url = spawn_service(state).await;

    let mut controller = JobController::new(AnalysisClient::new(url).unwrap());
    let err = controller
        .submit("score.musicxml", Vec::new(), &default_options())
        .await
        .unwrap_err();

    match err {
        Error::Submission(message) => assert_eq!(message, "No score file provided."),
        other => panic!("expected submission error, got {:?}", other),
    }
    // The job never started
    assert!(controller.job_handle().is_none());
}

#[tokio::test]
async fn test_submission_without_job_id_fails() {
    let state = Arc::new(MockService {
        submit_mode: SubmitMode::AcceptWithoutJobId,
        ..Default::default()
    });
    let url = spawn_service(state).await;

    let mut controller = JobController::new(AnalysisClient::new(url).unwrap());
    let err = controller
        .submit("score.musicxml", Vec::new(), &default_options())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Submission(_)));
    assert!(controller.job_handle().is_none());
}

#[tokio::test]
async fn test_stream_disconnect_freezes_displayed_state() {
    // Feed ends after partial progress, with no terminal event
    let state = Arc::new(MockService {
        feed: sse_feed(&[
            json!({"type":"observed","analyzer":"range","idx":3,"total":10,"grade":2}),
            json!({"type":"analyzer","analyzer":"key_range"}),
        ]),
        result: Some(json!({"result":{}})),
        ..Default::default()
    });
    let url = spawn_service(state.clone()).await;

    let options = default_options();
    let mut controller = submitted_controller(url, &options).await;
    let mut surface = RecordingSurface::default();

    let err = controller.run(&mut surface).await.unwrap_err();
    assert!(matches!(err, Error::Stream(_)));

    assert_eq!(surface.status.last().unwrap(), "Connection lost.");
    // Range was already at 30%, so the completion event did not snap it;
    // the error froze it exactly as last observed
    assert_eq!(surface.percents["range"], 30);

    // No completion, no result fetch, nothing to acknowledge
    assert_eq!(state.result_fetches.load(Ordering::SeqCst), 0);
    assert!(!controller.can_acknowledge());
    assert!(controller.acknowledge(&mut surface).is_none());
}

#[tokio::test]
async fn test_composite_completion_snaps_untouched_channels() {
    // tempo and duration received zero observed events before their
    // combined pass completed
    let state = Arc::new(MockService {
        feed: sse_feed(&[json!({"type":"analyzer","analyzer":"tempo_duration"})]),
        ..Default::default()
    });
    let url = spawn_service(state).await;

    let options = default_options();
    let mut controller = submitted_controller(url, &options).await;
    let mut surface = RecordingSurface::default();

    // The feed ends without Done, so run reports a stream error; the
    // snapshot at that point is what matters here
    let _ = controller.run(&mut surface).await;

    assert_eq!(surface.percents["tempo"], 100);
    assert_eq!(surface.percents["duration"], 100);
}

#[tokio::test]
async fn test_result_fetch_failure_leaves_nothing_to_apply() {
    let state = Arc::new(MockService {
        feed: sse_feed(&[json!({"type":"done"})]),
        result: None,
        ..Default::default()
    });
    let url = spawn_service(state.clone()).await;

    let options = default_options();
    let mut controller = submitted_controller(url, &options).await;
    let mut surface = RecordingSurface::default();

    // The job itself completes; only the result fetch fails
    let outcome = controller.run(&mut surface).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed);
    assert_eq!(state.result_fetches.load(Ordering::SeqCst), 1);

    // The acknowledge action exists but has nothing to apply
    assert!(controller.can_acknowledge());
    assert!(controller.acknowledge(&mut surface).is_none());
    assert!(surface.markers.is_empty());
}

#[tokio::test]
async fn test_resubmission_supersedes_previous_job() {
    let state = Arc::new(MockService {
        feed: sse_feed(&[json!({"type":"done"})]),
        result: Some(json!({"result":{}})),
        ..Default::default()
    });
    let url = spawn_service(state.clone()).await;

    let options = default_options();
    let mut controller = JobController::new(AnalysisClient::new(url).unwrap());

    let first = controller
        .submit("score.musicxml", b"<score-partwise/>".to_vec(), &options)
        .await
        .unwrap();
    let second = controller
        .submit("score.musicxml", b"<score-partwise/>".to_vec(), &options)
        .await
        .unwrap();
    assert_ne!(first, second);
    assert_eq!(controller.job_handle(), Some(&second));

    let mut surface = RecordingSurface::default();
    let outcome = controller.run(&mut surface).await.unwrap();
    assert_eq!(outcome, JobOutcome::Completed);

    // Only the current job's stream was ever consumed
    let opens = state.progress_opens.lock().unwrap().clone();
    assert_eq!(opens, vec!["job-2".to_string()]);
}
