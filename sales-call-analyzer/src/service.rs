use axum::{
    Extension, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, Request, State, multipart::MultipartError,
    },
    http::{HeaderValue, StatusCode, header},
    middleware::{Next, from_fn},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::{
    config::Settings,
    controller::{Upload, WorkflowController},
    models::{AnalysisKind, SessionResponse},
    render::{PageView, render_page},
    runtime::AgentRuntime,
    session::{InMemorySessionStore, SessionStore},
};

pub const SESSION_COOKIE: &str = "sales_session";

type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, kind: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "kind": kind
        })),
    )
}

/// Browser session id resolved by [`session_middleware`].
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

#[derive(Clone)]
pub struct AppState {
    pub controller: WorkflowController,
    pub max_upload_bytes: usize,
}

pub fn create_app(settings: &Settings) -> Router {
    let runtime = AgentRuntime::initialize(settings);
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    build_router(AppState {
        controller: WorkflowController::new(store, Arc::new(runtime)),
        max_upload_bytes: settings.max_upload_bytes(),
    })
}

pub fn build_router(app_state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(app_state.max_upload_bytes);
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/upload", post(upload_transcript))
        .route("/analyze/{kind}", post(analyze))
        .route("/api/session", get(get_session_state))
        .layer(body_limit)
        .layer(from_fn(session_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Attach a session id from the cookie, issuing a new cookie on first visit.
async fn session_middleware(mut request: Request, next: Next) -> Response {
    let existing = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(session_from_cookie_header);

    let (session_id, is_new) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };

    request
        .extensions_mut()
        .insert(SessionId(session_id.clone()));

    let span = tracing::info_span!("http_request", session_id = %session_id);
    let mut response = next.run(request).instrument(span).await;

    if is_new {
        let cookie = format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => error!("Failed to build session cookie: {}", e),
        }
    }
    response
}

fn session_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && Uuid::parse_str(value).is_ok()).then(|| value.to_string())
    })
}

async fn index(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> Html<String> {
    let session = state.controller.state(&session_id).await;
    let runtime = state.controller.runtime();
    Html(render_page(&PageView {
        state: &session,
        setup: &runtime.setup,
        setup_ok: runtime.base_setup_ok(),
        salesperson: &runtime.salesperson,
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn upload_transcript(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    info!(
        "Upload received: {} ({} bytes)",
        upload.file_name,
        upload.bytes.len()
    );

    state.controller.upload(&session_id, upload).await;
    Ok(Redirect::to("/"))
}

fn multipart_error(e: MultipartError) -> ApiError {
    error!("Invalid multipart body: {}", e);
    let status = e.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return (status, Json(json!({ "error": "Uploaded file is too large" })));
    }
    bad_request_error("Invalid multipart body")
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("transcript") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("transcript.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(Upload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(bad_request_error("Missing 'transcript' file field"))
}

async fn analyze(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
    Path(kind): Path<String>,
) -> Result<Redirect, ApiError> {
    let kind: AnalysisKind = kind
        .parse()
        .map_err(|e: String| not_found_error(&e, &kind))?;

    state.controller.analyze(&session_id, kind).await;
    Ok(Redirect::to("/"))
}

async fn get_session_state(
    State(state): State<AppState>,
    Extension(SessionId(session_id)): Extension<SessionId>,
) -> impl IntoResponse {
    let session = state.controller.state(&session_id).await;
    let transcript_chars = session
        .transcript
        .as_ref()
        .map(|t| t.text.chars().count())
        .unwrap_or(0);

    Json(SessionResponse {
        session_id,
        setup_ok: state.controller.runtime().base_setup_ok(),
        has_transcript: session.transcript.is_some(),
        transcript_chars,
        action_items: session.action_items.map(|r| r.text),
        follow_up_email: session.follow_up_email.map(|r| r.text),
        processing_action_items: session.processing_action_items,
        processing_email: session.processing_email,
        notices: session.notices,
    })
}
