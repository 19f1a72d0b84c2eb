use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{
        Html, IntoResponse, Response,
        sse::{Event, Sse},
    },
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::Settings;
use crate::editor::{CellEditor, CommitOutcome, CommitTrigger, EditError};
use crate::grid::{Grid, GridError};
use crate::notify::{DeferredLinkOpener, Notification, Notifier};
use crate::remote::{DocumentService, HttpDocumentService};
use crate::row::{Column, DISPLAY_COLUMNS, Row, RowKey};
use crate::views::{PageView, ViewId, ViewRegistry, lock};
use crate::workflow::SaveOutcome;

const PAGE: &str = include_str!("./static/index.html");
const VIEW_PLACEHOLDER: &str = "__VIEW_ID__";

pub struct AppState {
    service: Arc<dyn DocumentService>,
    views: Mutex<ViewRegistry>,
}

impl AppState {
    pub fn new(service: Arc<dyn DocumentService>) -> Self {
        AppState {
            service,
            views: Mutex::new(ViewRegistry::default()),
        }
    }

    /// Register a page view over `grid` and return its id.
    pub fn open_view(&self, grid: Grid) -> ViewId {
        let view = PageView::new(grid, self.service.clone());
        let id = lock(&self.views).insert(view);
        info!(view = %id, "view opened");
        id
    }

    pub fn view(&self, id: &ViewId) -> Result<Arc<PageView>, ApiError> {
        lock(&self.views)
            .get(id)
            .ok_or_else(|| ApiError::UnknownView(id.clone()))
    }

    pub fn view_count(&self) -> usize {
        lock(&self.views).len()
    }
}

#[derive(Serialize)]
struct ColumnInfo {
    title: &'static str,
    #[serde(rename = "dataIndex")]
    data_index: &'static str,
    editable: bool,
}

#[derive(Serialize)]
struct TableResponse {
    columns: Vec<ColumnInfo>,
    rows: Vec<Row>,
    saving: bool,
}

#[derive(Deserialize)]
struct CellRequest {
    key: RowKey,
    column: Column,
}

#[derive(Deserialize)]
struct CommitRequest {
    key: RowKey,
    column: Column,
    value: Option<String>,
    trigger: CommitTrigger,
}

#[derive(Serialize)]
struct SaveResult {
    #[serde(flatten)]
    outcome: SaveOutcome,
    open_url: Option<String>,
}

/// What the save stream carries: each notification as it is raised, then
/// the outcome.
enum SaveEvent {
    Notification(Notification),
    Finished(SaveResult),
}

impl SaveEvent {
    fn into_sse(self) -> Result<Event, axum::Error> {
        match self {
            SaveEvent::Notification(n) => Event::default().event("notification").json_data(n),
            SaveEvent::Finished(result) => Event::default().event("outcome").json_data(result),
        }
    }
}

/// Forwards notifications to the page while the save is still running.
struct StreamNotifier(mpsc::UnboundedSender<SaveEvent>);

impl Notifier for StreamNotifier {
    fn notify(&self, notification: Notification) {
        if self.0.send(SaveEvent::Notification(notification)).is_err() {
            debug!("page left before a save notification was delivered");
        }
    }
}

/// Errors the JSON API reports to the page.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("unknown view {0}")]
    UnknownView(ViewId),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, editing) = match &self {
            ApiError::Edit(EditError::Required(_)) => (StatusCode::UNPROCESSABLE_ENTITY, true),
            ApiError::Edit(EditError::NotEditable(_)) => (StatusCode::BAD_REQUEST, false),
            ApiError::Edit(EditError::Grid(GridError::UnknownRow(_))) => {
                (StatusCode::NOT_FOUND, false)
            }
            ApiError::UnknownView(_) => (StatusCode::NOT_FOUND, false),
        };
        (
            status,
            Json(serde_json::json!({
                "error": self.to_string(),
                "editing": editing,
            })),
        )
            .into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_page))
        .route("/api/views/:view/table", get(get_table))
        .route("/api/views/:view/cell/activate", post(activate_cell))
        .route("/api/views/:view/cell/commit", post(commit_cell))
        .route("/api/views/:view/cell/cancel", post(cancel_cell))
        .route("/api/views/:view/save", post(save_table))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let service = Arc::new(HttpDocumentService::new(settings.remote_base_url.clone()));
    let app_state = Arc::new(AppState::new(service));
    let app = router(app_state);

    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;
    info!(
        "Listening on http://{} (documents via {})",
        settings.bind_addr, settings.remote_base_url
    );
    axum::serve(listener, app).await?;

    Ok(())
}

/// Every page load gets a freshly generated table of its own.
async fn serve_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = state.open_view(Grid::generate());
    Html(PAGE.replace(VIEW_PLACEHOLDER, view.as_str()))
}

async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(view): Path<ViewId>,
) -> Result<Json<TableResponse>, ApiError> {
    let view = state.view(&view)?;
    let columns = DISPLAY_COLUMNS
        .iter()
        .map(|&column| ColumnInfo {
            title: column.title(),
            data_index: column.data_index(),
            editable: column.is_editable(),
        })
        .collect();

    Ok(Json(TableResponse {
        columns,
        rows: view.rows(),
        saving: view.workflow().is_saving(),
    }))
}

async fn activate_cell(
    State(state): State<Arc<AppState>>,
    Path(view): Path<ViewId>,
    Json(req): Json<CellRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let view = state.view(&view)?;
    let grid = view.grid();
    if grid.get(&req.key).is_none() {
        return Err(EditError::from(GridError::UnknownRow(req.key)).into());
    }

    let mut editors = view.editors();
    let editor = match editors.entry((req.key.clone(), req.column)) {
        Entry::Occupied(e) => e.into_mut(),
        Entry::Vacant(e) => e.insert(CellEditor::new(req.key.clone(), req.column)?),
    };
    let draft = editor.activate(&grid)?.to_string();

    Ok(Json(serde_json::json!({
        "key": req.key,
        "column": req.column,
        "value": draft,
        "editing": true,
    })))
}

async fn commit_cell(
    State(state): State<Arc<AppState>>,
    Path(view): Path<ViewId>,
    Json(req): Json<CommitRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let view = state.view(&view)?;
    if !req.column.is_editable() {
        return Err(EditError::NotEditable(req.column).into());
    }

    let mut grid = view.grid();
    let mut editors = view.editors();
    let Some(editor) = editors.get_mut(&(req.key.clone(), req.column)) else {
        return Ok(Json(serde_json::json!({ "committed": false })));
    };

    if let Some(value) = req.value {
        editor.input(value);
    }
    match editor.commit(req.trigger, &mut grid)? {
        CommitOutcome::Applied(row) => Ok(Json(serde_json::json!({
            "committed": true,
            "row": row,
        }))),
        CommitOutcome::Idle => Ok(Json(serde_json::json!({ "committed": false }))),
    }
}

async fn cancel_cell(
    State(state): State<Arc<AppState>>,
    Path(view): Path<ViewId>,
    Json(req): Json<CellRequest>,
) -> Result<StatusCode, ApiError> {
    let view = state.view(&view)?;
    if let Some(editor) = view.editors().get_mut(&(req.key, req.column)) {
        editor.cancel();
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Streams the save as server-sent events.
///
/// `notification` events arrive as the workflow raises them; a final
/// `outcome` event carries the result and the link to open. A save that is
/// already running answers 409 with a plain JSON body.
async fn save_table(
    State(state): State<Arc<AppState>>,
    Path(view): Path<ViewId>,
) -> Result<Response, ApiError> {
    let view = state.view(&view)?;
    if view.workflow().is_saving() {
        let busy = SaveResult {
            outcome: SaveOutcome::Busy,
            open_url: None,
        };
        return Ok((StatusCode::CONFLICT, Json(busy)).into_response());
    }

    let rows = view.rows();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let notifier = StreamNotifier(tx.clone());
        let opener = DeferredLinkOpener::new();
        let outcome = view.workflow().save(&rows, &notifier, &opener).await;
        let finished = SaveResult {
            outcome,
            open_url: opener.take(),
        };
        if tx.send(SaveEvent::Finished(finished)).is_err() {
            debug!("page left before the save finished");
        }
    });

    let events = UnboundedReceiverStream::new(rx).map(SaveEvent::into_sse);
    Ok(Sse::new(events).into_response())
}
