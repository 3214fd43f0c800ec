//! REST API: sessions, uploads, view/filter controls, clear-all and the goal calculator.
//!
//! Each browser tab owns one [`ExpSession`] held in memory by id. Sessions idle for longer than
//! the configured threshold are removed by [`AppData::sweep_idle`].

use crate::backend::{ExtractionBackend, UploadedImage, IMAGES_FIELD};
use crate::error::{ProcessingError, UploadError};
use crate::logic::{
    complete_upload, format_exp, goal_progress, map_backend_response, parse_exp_amount, snapshot,
    snapshot_of, SkippedRecord,
};
use crate::models::{ExpSession, SessionError, SessionId, SessionSnapshot, ViewKind};
use actix_multipart::Multipart;
use actix_web::{
    delete, get, post, put,
    web::{self, Data, Json, Path, Query},
    HttpResponse, Responder,
};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Per-session entry: session data + last activity time (for auto-cleanup).
pub struct SessionEntry {
    pub session: ExpSession,
    pub last_activity: Instant,
}

impl SessionEntry {
    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

/// Shared server state: every live session plus the extraction backend.
pub struct AppData {
    pub sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    pub backend: Arc<dyn ExtractionBackend>,
}

impl AppData {
    pub fn new(backend: Arc<dyn ExtractionBackend>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            backend,
        }
    }

    /// Register a new empty session and return its first snapshot.
    pub fn create_session(&self) -> Result<SessionSnapshot, UploadError> {
        let session = ExpSession::new();
        let snap = snapshot(&session);
        let mut g = self.sessions.write().map_err(|_| UploadError::Lock)?;
        g.insert(
            session.id,
            SessionEntry {
                session,
                last_activity: Instant::now(),
            },
        );
        log::info!("Created session {}", snap.id);
        Ok(snap)
    }

    /// Drop sessions untouched for `idle` or longer. Sessions with an upload in flight are kept.
    /// Returns how many were removed.
    pub fn sweep_idle(&self, idle: Duration) -> usize {
        let mut g = match self.sessions.write() {
            Ok(guard) => guard,
            Err(_) => return 0,
        };
        let before = g.len();
        g.retain(|_, entry| entry.session.is_uploading() || entry.last_activity.elapsed() < idle);
        before - g.len()
    }

    /// Run `f` against one session under the write lock, refreshing its activity time.
    pub fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut ExpSession) -> Result<T, SessionError>,
    ) -> Result<T, UploadError> {
        let mut g = self.sessions.write().map_err(|_| UploadError::Lock)?;
        let entry = g.get_mut(&id).ok_or(SessionError::NotFound)?;
        entry.touch();
        Ok(f(&mut entry.session)?)
    }
}

type AppState = Data<AppData>;

/// Snapshot after an upload, plus the records the mapper had to leave out.
#[derive(Debug, Serialize)]
pub struct UploadReport {
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
    pub skipped_records: Vec<SkippedRecord>,
}

/// Process one upload batch for a session.
///
/// The session is claimed before the backend call and released in the same critical section
/// that applies the batch, so a second upload or a clear-all for the same session fails with
/// [`SessionError::UploadInProgress`] until the batch has landed. No lock is held
/// while waiting on the backend. Any failure leaves both views exactly as they were.
pub async fn run_upload(
    data: &AppData,
    id: SessionId,
    images: Vec<UploadedImage>,
) -> Result<UploadReport, UploadError> {
    if images.is_empty() {
        return Err(ProcessingError::NoImages.into());
    }
    let count = images.len();
    data.with_session(id, |s| s.begin_upload())?;
    log::info!("Session {}: sending {} image(s) for extraction", id, count);

    let result = match data.backend.extract(images).await {
        Ok(raw) => map_backend_response(&raw),
        Err(e) => Err(e),
    };

    let outcome = data.with_session(id, |s| {
        Ok(complete_upload(s, result).map(|batch| UploadReport {
            snapshot: snapshot(s),
            skipped_records: batch.skipped,
        }))
    })?;
    outcome.map_err(|e| {
        log::error!("Session {}: batch failed: {}", id, e);
        UploadError::from(e)
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Path segment: session id (e.g. /api/sessions/{id})
#[derive(Deserialize)]
struct SessionPath {
    id: SessionId,
}

/// One-off rendering options for GET; the stored view and filter are not changed.
#[derive(Deserialize)]
struct ViewQuery {
    view: Option<ViewKind>,
    q: Option<String>,
}

#[derive(Deserialize)]
struct SetViewBody {
    view: ViewKind,
}

#[derive(Deserialize)]
struct SetFilterBody {
    #[serde(default)]
    term: String,
}

#[derive(Deserialize)]
struct ClearBody {
    #[serde(default)]
    confirm: bool,
}

#[derive(Deserialize)]
struct GoalQuery {
    #[serde(default)]
    current: String,
    #[serde(default)]
    goal: String,
}

#[derive(Serialize)]
struct GoalResult {
    needed: f64,
    needed_text: String,
    percentage: f64,
    /// Percentage clamped to 100 for progress bars.
    progress: f64,
}

#[derive(Serialize)]
struct GoalResponse {
    current: f64,
    goal: f64,
    result: Option<GoalResult>,
}

fn error_response(err: &UploadError) -> HttpResponse {
    let body = serde_json::json!({ "error": err.to_string() });
    match err {
        UploadError::Lock => HttpResponse::InternalServerError().json(body),
        UploadError::Session(SessionError::NotFound) => HttpResponse::NotFound().json(body),
        UploadError::Session(SessionError::UploadInProgress) => HttpResponse::Conflict().json(body),
        UploadError::Session(SessionError::ConfirmationRequired)
        | UploadError::Processing(ProcessingError::NoImages) => HttpResponse::BadRequest().json(body),
        UploadError::Processing(_) => HttpResponse::BadGateway().json(body),
    }
}

fn respond<T: Serialize>(result: Result<T, UploadError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "exp-ledger",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Create a new session (client stores the id for subsequent requests).
#[post("/api/sessions")]
async fn api_create_session(state: AppState) -> HttpResponse {
    respond(state.create_session())
}

/// Get the active view of a session, or another view/term for this request only.
#[get("/api/sessions/{id}")]
async fn api_get_session(state: AppState, path: Path<SessionPath>, query: Query<ViewQuery>) -> HttpResponse {
    let query = query.into_inner();
    respond(state.with_session(path.id, |s| {
        let view = query.view.unwrap_or(s.active_view);
        let term = query.q.as_deref().unwrap_or(s.filter.as_str());
        Ok(snapshot_of(s, view, term))
    }))
}

/// Upload one batch of screenshots (multipart, files under `images`).
#[post("/api/sessions/{id}/uploads")]
async fn api_upload(state: AppState, path: Path<SessionPath>, mut payload: Multipart) -> HttpResponse {
    let images = match read_images(&mut payload).await {
        Ok(images) => images,
        Err(msg) => return HttpResponse::BadRequest().json(serde_json::json!({ "error": msg })),
    };
    respond(run_upload(&state, path.id, images).await)
}

/// Switch between the session and cumulative views.
#[put("/api/sessions/{id}/view")]
async fn api_set_view(state: AppState, path: Path<SessionPath>, body: Json<SetViewBody>) -> HttpResponse {
    respond(state.with_session(path.id, |s| {
        s.set_view(body.view);
        Ok(snapshot(s))
    }))
}

/// Set the nickname filter.
#[put("/api/sessions/{id}/filter")]
async fn api_set_filter(state: AppState, path: Path<SessionPath>, body: Json<SetFilterBody>) -> HttpResponse {
    let term = body.into_inner().term;
    respond(state.with_session(path.id, |s| {
        s.set_filter(term);
        Ok(snapshot(s))
    }))
}

/// Clear the nickname filter.
#[delete("/api/sessions/{id}/filter")]
async fn api_clear_filter(state: AppState, path: Path<SessionPath>) -> HttpResponse {
    respond(state.with_session(path.id, |s| {
        s.clear_filter();
        Ok(snapshot(s))
    }))
}

/// Clear all session and cumulative data. Requires `{ "confirm": true }`.
#[post("/api/sessions/{id}/clear")]
async fn api_clear_all(state: AppState, path: Path<SessionPath>, body: Option<Json<ClearBody>>) -> HttpResponse {
    let confirmed = body.map(|b| b.confirm).unwrap_or(false);
    respond(state.with_session(path.id, |s| {
        s.clear_all(confirmed)?;
        log::info!("Session {}: cleared all data", s.id);
        Ok(snapshot(s))
    }))
}

/// How much EXP is left to reach a goal, e.g. `?current=19B&goal=20B`.
#[get("/api/goal")]
async fn api_goal(query: Query<GoalQuery>) -> HttpResponse {
    let current = parse_exp_amount(&query.current);
    let goal = parse_exp_amount(&query.goal);
    let result = goal_progress(current, goal).map(|p| GoalResult {
        needed: p.needed,
        needed_text: format_exp(p.needed),
        percentage: p.percentage,
        progress: p.percentage.min(100.0),
    });
    HttpResponse::Ok().json(GoalResponse { current, goal, result })
}

/// Collect every file sent under the `images` field. Other fields are ignored.
async fn read_images(payload: &mut Multipart) -> Result<Vec<UploadedImage>, String> {
    let mut images = Vec::new();
    while let Some(mut field) = payload.try_next().await.map_err(|e| e.to_string())? {
        let (name, filename) = {
            let cd = field.content_disposition();
            (
                cd.get_name().map(str::to_string),
                cd.get_filename().map(str::to_string),
            )
        };
        let content_type = field.content_type().map(|m| m.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(|e| e.to_string())? {
            bytes.extend_from_slice(&chunk);
        }

        match (name.as_deref(), filename) {
            (Some(IMAGES_FIELD), Some(filename)) if !filename.is_empty() => images.push(UploadedImage {
                filename,
                content_type,
                bytes,
            }),
            _ => {}
        }
    }
    Ok(images)
}

/// Register every route on an actix `App`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(api_health)
        .service(favicon)
        .service(api_create_session)
        .service(api_get_session)
        .service(api_upload)
        .service(api_set_view)
        .service(api_set_filter)
        .service(api_clear_filter)
        .service(api_clear_all)
        .service(api_goal);
}
