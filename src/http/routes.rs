//! HTTP route definitions

use axum::{
    extract::{Extension, Path, State},
    http::{header, HeaderName, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{
    ActionSubmission, CombatantId, MatchError, PlayerView, SubmitError, TurnResult,
};
use crate::http::middleware::{require_session, CurrentSession, SESSION_HEADER};
use crate::util::time::uptime_secs;

/// Slack on top of the worst-case agent decision time
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // CORS configuration - support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static(SESSION_HEADER)]);

    // A request may wait on every agent attempt
    let request_timeout = state.config.agent_timeout * (state.config.agent_max_retries + 1)
        + REQUEST_TIMEOUT_SLACK;

    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/games", post(create_game_handler));

    // Session routes
    let session_routes = Router::new()
        .route("/games/:id", get(game_handler).delete(delete_handler))
        .route("/games/:id/start", post(start_handler))
        .route("/games/:id/action", post(action_handler))
        .layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_matches: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_matches: state.registry.active_matches(),
    })
}

// ============================================================================
// Game endpoints
// ============================================================================

#[derive(Deserialize)]
struct CreateGameRequest {
    player_name: String,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct CreateGameResponse {
    match_id: Uuid,
    session_token: Uuid,
    combatant: CombatantId,
    state: PlayerView,
}

async fn create_game_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<CreateGameResponse>), AppError> {
    let created = state.registry.create_match(&req.player_name, req.seed)?;
    let view = state.registry.view(&created.match_id, created.combatant)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateGameResponse {
            match_id: created.match_id,
            session_token: created.session_token,
            combatant: created.combatant,
            state: view,
        }),
    ))
}

#[derive(Serialize)]
struct GameResponse {
    state: PlayerView,
}

/// The session must belong to the match in the path
fn authorize(current: &CurrentSession, match_id: Uuid) -> Result<CombatantId, AppError> {
    if current.session.match_id == match_id {
        Ok(current.session.combatant)
    } else {
        Err(AppError::Unauthorized)
    }
}

async fn game_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<GameResponse>, AppError> {
    let combatant = authorize(&current, id)?;
    let view = state.registry.view(&id, combatant)?;
    Ok(Json(GameResponse { state: view }))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentSession>,
) -> Result<StatusCode, AppError> {
    authorize(&current, id)?;
    if state.remove_match(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::GameNotFound)
    }
}

async fn start_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<GameResponse>, AppError> {
    let combatant = authorize(&current, id)?;
    state.registry.start(&id)?;
    let view = state.registry.view(&id, combatant)?;
    Ok(Json(GameResponse { state: view }))
}

#[derive(Serialize)]
struct ActionResponse {
    /// Present once every living combatant has acted and the turn resolved
    turn_result: Option<TurnResult>,
    state: PlayerView,
}

async fn action_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(current): Extension<CurrentSession>,
    Json(submission): Json<ActionSubmission>,
) -> Result<Json<ActionResponse>, AppError> {
    let combatant = authorize(&current, id)?;
    if !state.submit_limiter.check(&current.token) {
        return Err(AppError::RateLimited);
    }

    let handle = state.registry.get(&id).ok_or(AppError::GameNotFound)?;
    handle
        .lock()
        .submit(combatant, submission)
        .map_err(MatchError::from)?;

    state.agents.run_turn(&handle).await;

    let (turn_result, view) = {
        let mut controller = handle.lock();
        let turn_result = if controller.all_submitted() {
            Some(controller.resolve_turn()?)
        } else {
            None
        };
        (turn_result, controller.view(combatant)?)
    };

    if let Some(result) = &turn_result {
        info!(match_id = %id, turn = result.turn, "Turn resolved via action request");
    }

    Ok(Json(ActionResponse {
        turn_result,
        state: view,
    }))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Player name must be 1-16 characters")]
    InvalidName,

    #[error("Invalid or missing session")]
    Unauthorized,

    #[error("Game not found")]
    GameNotFound,

    #[error("{0}")]
    NotYourTurn(String),

    #[error("You are eliminated")]
    PlayerDead,

    #[error("Too many requests")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidName => "INVALID_NAME",
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::GameNotFound => "GAME_NOT_FOUND",
            AppError::NotYourTurn(_) => "NOT_YOUR_TURN",
            AppError::PlayerDead => "PLAYER_DEAD",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidName | AppError::NotYourTurn(_) | AppError::PlayerDead => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::GameNotFound => StatusCode::NOT_FOUND,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MatchError> for AppError {
    fn from(e: MatchError) -> Self {
        match e {
            MatchError::NotFound(_) => AppError::GameNotFound,
            MatchError::UnknownSession => AppError::Unauthorized,
            MatchError::InvalidName => AppError::InvalidName,
            MatchError::WrongPhase { .. } => AppError::NotYourTurn(e.to_string()),
            MatchError::Submit(SubmitError::WrongPhase(_)) => AppError::NotYourTurn(e.to_string()),
            MatchError::Submit(SubmitError::Eliminated(_)) => AppError::PlayerDead,
            MatchError::Submit(SubmitError::UnknownCombatant(_)) | MatchError::UnknownCombatant(_) => {
                AppError::Unauthorized
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if let AppError::Internal(msg) = &self {
            error!(error = %msg, "Request failed");
        }

        let body = serde_json::json!({
            "error": true,
            "code": self.code(),
            "message": self.to_string(),
        });

        (self.status(), Json(body)).into_response()
    }
}
