//! Axum router and all HTTP handlers for ldy-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Handlers are thin: decode, call the desk, publish an
//! event when something changed, encode.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::{Stream, StreamExt};
use ldy_core::{barcode, LaundryError, OrderFilter};
use ldy_schemas::NewOrder;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::info;
use uuid::Uuid;

use crate::{
    api_types::{
        AddBatchOrderRequest, AdvanceBatchRequest, CreateBatchRequest, ErrorResponse,
        HealthResponse, OpenSlotRequest, SeedDayRequest, SetSlotActiveRequest, SignInRequest,
        SlotsQuery, TransitionRequest,
    },
    state::{uptime_secs, AppState, BusMsg},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/stream", get(stream))
        .route("/v1/users/sign-in", post(sign_in))
        .route("/v1/users/:id/notifications", get(user_notifications))
        .route("/v1/users/:id/schedule", get(user_schedule))
        .route("/v1/notifications/:id/read", post(notification_read))
        .route("/v1/slots", get(slots_list).post(slots_open))
        .route("/v1/slots/seed", post(slots_seed))
        .route("/v1/slots/:id/reserve", post(slot_reserve))
        .route("/v1/slots/:id/active", post(slot_set_active))
        .route("/v1/orders", get(orders_search).post(order_create))
        .route("/v1/orders/stats", get(orders_stats))
        .route("/v1/orders/lookup/:token", get(order_lookup))
        .route("/v1/orders/:id", get(order_get))
        .route("/v1/orders/:id/status", post(order_transition))
        .route("/v1/barcodes/:token", get(barcode_image))
        .route("/v1/batches", get(batches_list).post(batch_create))
        .route("/v1/batches/:id", get(batch_get))
        .route("/v1/batches/:id/orders", post(batch_add_order))
        .route("/v1/batches/:id/status", post(batch_advance))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// HTTP status for each error kind.
pub fn status_for(err: &LaundryError) -> StatusCode {
    match err {
        LaundryError::Validation(_) => StatusCode::BAD_REQUEST,
        LaundryError::ItemLimit { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        LaundryError::CapacityExceeded { .. } => StatusCode::CONFLICT,
        LaundryError::NotFound { .. } => StatusCode::NOT_FOUND,
        LaundryError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub(crate) struct ApiError(LaundryError);

impl From<LaundryError> for ApiError {
    fn from(err: LaundryError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
                kind: self.0.kind().to_string(),
                category: self.0.category().to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service.to_string(),
            version: st.build.version.to_string(),
            uptime_secs: uptime_secs(),
            config_hash: st.config_hash.clone(),
        }),
    )
}

// ---------------------------------------------------------------------------
// Users and notifications
// ---------------------------------------------------------------------------

pub(crate) async fn sign_in(
    State(st): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = st.desk.sign_in(&req.phone_number, req.role).await?;
    Ok(Json(user))
}

pub(crate) async fn user_notifications(
    State(st): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.notifications_for(user_id).await?))
}

pub(crate) async fn user_schedule(
    State(st): State<Arc<AppState>>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.schedule_for_user(user_id).await?))
}

pub(crate) async fn notification_read(
    State(st): State<Arc<AppState>>,
    Path(notification_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    st.desk.mark_notification_read(notification_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// Never fails on store errors; an unreachable store lists no slots.
pub(crate) async fn slots_list(
    State(st): State<Arc<AppState>>,
    Query(q): Query<SlotsQuery>,
) -> impl IntoResponse {
    Json(st.desk.list_available_slots(q.date).await)
}

pub(crate) async fn slots_open(
    State(st): State<Arc<AppState>>,
    Json(req): Json<OpenSlotRequest>,
) -> ApiResult<impl IntoResponse> {
    let capacity = req
        .max_capacity
        .unwrap_or(st.desk.rules().default_capacity);
    let slot = st.desk.open_slot(req.date, &req.time_range, capacity).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

pub(crate) async fn slots_seed(
    State(st): State<Arc<AppState>>,
    Json(req): Json<SeedDayRequest>,
) -> ApiResult<impl IntoResponse> {
    let created = st.desk.seed_day(req.date).await?;
    info!(date = %req.date, created = created.len(), "slots/seed");
    Ok(Json(created))
}

pub(crate) async fn slot_reserve(
    State(st): State<Arc<AppState>>,
    Path(slot_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.reserve(slot_id).await?))
}

pub(crate) async fn slot_set_active(
    State(st): State<Arc<AppState>>,
    Path(slot_id): Path<Uuid>,
    Json(req): Json<SetSlotActiveRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.set_slot_active(slot_id, req.is_active).await?))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

pub(crate) async fn order_create(
    State(st): State<Arc<AppState>>,
    Json(req): Json<NewOrder>,
) -> ApiResult<impl IntoResponse> {
    let order = st.desk.create_order(req).await?;
    st.publish(BusMsg::OrderStatus {
        order_id: order.id,
        barcode: order.barcode.clone(),
        status: order.status,
    });
    Ok((StatusCode::CREATED, Json(order)))
}

pub(crate) async fn orders_search(
    State(st): State<Arc<AppState>>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.search_orders(&filter).await?))
}

pub(crate) async fn orders_stats(State(st): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.dashboard_stats().await?))
}

pub(crate) async fn order_lookup(
    State(st): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.find_by_barcode_or_id(&token).await?))
}

pub(crate) async fn order_get(
    State(st): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.get_order(order_id).await?))
}

pub(crate) async fn order_transition(
    State(st): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<TransitionRequest>,
) -> ApiResult<impl IntoResponse> {
    let order = st
        .desk
        .transition(order_id, req.status, req.slot_note, req.feedback)
        .await?;
    st.publish(BusMsg::OrderStatus {
        order_id: order.id,
        barcode: order.barcode.clone(),
        status: order.status,
    });
    Ok(Json(order))
}

// ---------------------------------------------------------------------------
// GET /v1/barcodes/:token
// ---------------------------------------------------------------------------

/// Plain PBM bitmap of the token. Any text renders; nothing is looked up.
pub(crate) async fn barcode_image(Path(token): Path<String>) -> Response {
    let img = barcode::render_barcode(&token);
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("image/x-portable-bitmap"),
    );
    (StatusCode::OK, headers, img.to_pbm()).into_response()
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

pub(crate) async fn batch_create(
    State(st): State<Arc<AppState>>,
    Json(req): Json<CreateBatchRequest>,
) -> ApiResult<impl IntoResponse> {
    let batch = st.desk.create_batch(&req.name).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

pub(crate) async fn batches_list(State(st): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.list_batches().await?))
}

pub(crate) async fn batch_get(
    State(st): State<Arc<AppState>>,
    Path(batch_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.get_batch(batch_id).await?))
}

pub(crate) async fn batch_add_order(
    State(st): State<Arc<AppState>>,
    Path(batch_id): Path<Uuid>,
    Json(req): Json<AddBatchOrderRequest>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(st.desk.add_order(batch_id, req.order_id).await?))
}

pub(crate) async fn batch_advance(
    State(st): State<Arc<AppState>>,
    Path(batch_id): Path<Uuid>,
    Json(req): Json<AdvanceBatchRequest>,
) -> ApiResult<impl IntoResponse> {
    let report = st.desk.advance_batch(batch_id, req.status).await?;

    st.publish(BusMsg::BatchStatus {
        batch_id,
        status: report.batch.status,
        transitioned: report.transitioned.len(),
        failed: report.failed.len(),
    });
    for failure in &report.failed {
        st.publish(BusMsg::LogLine {
            level: "WARN".to_string(),
            msg: format!(
                "batch {batch_id}: order {} not moved: {}",
                failure.order_id, failure.error
            ),
        });
    }
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(m.event_name()).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
