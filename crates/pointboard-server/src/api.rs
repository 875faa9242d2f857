use std::time::Instant;

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use pointboard_shared::types::{HistoryRecord, HistoryStats, Pagination, RankedUser, User, UserId};

use crate::error::ServiceError;
use crate::service::{ClaimOutcome, Leaderboard};
use crate::ws;

#[derive(Clone)]
pub struct AppState {
    pub leaderboard: Leaderboard,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(leaderboard: Leaderboard) -> Self {
        Self {
            leaderboard,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health_check))
        .route("/api/users", get(list_users).post(add_user))
        .route("/api/users/:id", get(get_user).delete(deactivate_user))
        .route("/api/points/claim", post(claim_points))
        .route("/api/points/history", get(points_history))
        .route("/api/points/stats", get(points_stats))
        .route("/ws", get(ws::ws_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    observers: usize,
}

#[derive(Serialize)]
struct ListUsersResponse {
    success: bool,
    count: usize,
    data: Vec<RankedUser>,
}

#[derive(Deserialize)]
struct AddUserRequest {
    name: String,
}

#[derive(Serialize)]
struct UserCreatedResponse {
    success: bool,
    data: User,
    message: &'static str,
}

#[derive(Serialize)]
struct UserDataResponse {
    success: bool,
    data: User,
}

#[derive(Serialize)]
struct MessageResponse {
    success: bool,
    message: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaimRequest {
    user_id: Uuid,
}

#[derive(Serialize)]
struct ClaimResponse {
    success: bool,
    data: ClaimOutcome,
    message: String,
}

#[derive(Deserialize)]
struct HistoryParams {
    page: Option<u32>,
    limit: Option<u32>,
}

#[derive(Serialize)]
struct HistoryResponse {
    success: bool,
    data: Vec<HistoryRecord>,
    pagination: Pagination,
}

#[derive(Serialize)]
struct StatsResponse {
    success: bool,
    data: HistoryStats,
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Point Ranking System API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "users": "/api/users",
            "points": "/api/points",
            "health": "/api/health",
            "ws": "/ws",
        },
    }))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        observers: state.leaderboard.updates().subscriber_count(),
    })
}

async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ListUsersResponse>, ServiceError> {
    let data = state.leaderboard.list_users().await?;
    Ok(Json(ListUsersResponse {
        success: true,
        count: data.len(),
        data,
    }))
}

async fn add_user(
    State(state): State<AppState>,
    Json(req): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), ServiceError> {
    let user = state.leaderboard.add_user(&req.name).await?;

    info!(user = %user.name, "user created via API");

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            success: true,
            data: user,
            message: "User created successfully",
        }),
    ))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDataResponse>, ServiceError> {
    let user = state.leaderboard.get_user(UserId(id)).await?;
    Ok(Json(UserDataResponse {
        success: true,
        data: user,
    }))
}

async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ServiceError> {
    let user = state.leaderboard.deactivate_user(UserId(id)).await?;

    info!(user = %user.name, "user deactivated via API");

    Ok(Json(MessageResponse {
        success: true,
        message: "User deactivated successfully",
    }))
}

async fn claim_points(
    State(state): State<AppState>,
    Json(req): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, ServiceError> {
    let outcome = state.leaderboard.claim_points(UserId(req.user_id)).await?;

    let message = format!(
        "{} points awarded to {}!",
        outcome.points_awarded, outcome.user.name
    );

    Ok(Json(ClaimResponse {
        success: true,
        data: outcome,
        message,
    }))
}

async fn points_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ServiceError> {
    let page = state
        .leaderboard
        .history(params.page.unwrap_or(1), params.limit.unwrap_or(50))
        .await?;

    Ok(Json(HistoryResponse {
        success: true,
        data: page.records,
        pagination: page.pagination,
    }))
}

async fn points_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ServiceError> {
    let data = state.leaderboard.stats().await?;
    Ok(Json(StatsResponse {
        success: true,
        data,
    }))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
