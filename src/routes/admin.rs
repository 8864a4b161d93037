use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use axum_valid::Valid;

use crate::{
    dto::admin::{
        ActionResponse, CelebrationResponse, ConnectResponse, StartCountdownRequest,
        StartCountdownResponse,
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Operator commands driving the countdown, the celebration and the feed.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/countdown/start", post(start_countdown))
        .route("/admin/celebration/activate", post(activate_celebration))
        .route("/admin/celebration/deactivate", post(deactivate_celebration))
        .route("/admin/feed/connect", post(connect_feed))
        .route("/admin/session/teardown", post(teardown_session))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Start the countdown. Ignored while one is already running.
#[utoipa::path(
    post,
    path = "/admin/countdown/start",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = StartCountdownRequest,
    responses(
        (status = 200, description = "Countdown state after the request", body = StartCountdownResponse),
        (status = 400, description = "Duration out of range"),
        (status = 409, description = "Session torn down")
    )
)]
pub async fn start_countdown(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<StartCountdownRequest>>,
) -> Result<Json<StartCountdownResponse>, AppError> {
    let response = session_service::start_countdown(&state, payload.duration_secs).await?;
    Ok(Json(response))
}

/// Celebrate the current leader now.
#[utoipa::path(
    post,
    path = "/admin/celebration/activate",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses(
        (status = 200, description = "Celebration state", body = CelebrationResponse),
        (status = 409, description = "Session torn down")
    )
)]
pub async fn activate_celebration(
    State(state): State<SharedState>,
) -> Result<Json<CelebrationResponse>, AppError> {
    Ok(Json(session_service::activate_celebration(&state).await?))
}

/// Close the celebration.
#[utoipa::path(
    post,
    path = "/admin/celebration/deactivate",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses(
        (status = 200, description = "Celebration state", body = CelebrationResponse),
        (status = 409, description = "Session torn down")
    )
)]
pub async fn deactivate_celebration(
    State(state): State<SharedState>,
) -> Result<Json<CelebrationResponse>, AppError> {
    Ok(Json(session_service::deactivate_celebration(&state).await?))
}

/// Open a new feed connection attempt, superseding any pending one.
#[utoipa::path(
    post,
    path = "/admin/feed/connect",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses(
        (status = 200, description = "Connection attempt started", body = ConnectResponse),
        (status = 409, description = "Feed already live or closed")
    )
)]
pub async fn connect_feed(
    State(state): State<SharedState>,
) -> Result<Json<ConnectResponse>, AppError> {
    Ok(Json(session_service::connect(&state).await?))
}

/// Close the feed, cancel the countdown and clear the registry.
#[utoipa::path(
    post,
    path = "/admin/session/teardown",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses((status = 200, description = "Session torn down", body = ActionResponse))
)]
pub async fn teardown_session(State(state): State<SharedState>) -> Json<ActionResponse> {
    Json(session_service::teardown(&state).await)
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    let expected = state.admin_token().lock().await.clone();

    match expected {
        Some(token) if token == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".into())),
        None => Err(AppError::Unauthorized(
            "no admin SSE stream is connected".into(),
        )),
    }
}
