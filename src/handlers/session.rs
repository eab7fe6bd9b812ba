// src/handlers/session.rs

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UnlockPayload {
    #[schema(example = "2912")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatus {
    pub unlocked: bool,
}

// POST /api/session/unlock
#[utoipa::path(
    post,
    path = "/api/session/unlock",
    tag = "Session",
    request_body = UnlockPayload,
    responses(
        (status = 200, description = "Sessão desbloqueada; coleções carregadas", body = SessionStatus),
        (status = 401, description = "Senha incorreta")
    )
)]
pub async fn unlock(
    State(app_state): State<AppState>,
    Json(payload): Json<UnlockPayload>,
) -> Result<Json<SessionStatus>, AppError> {
    if !app_state.gate.unlock(&payload.password) {
        return Err(AppError::InvalidSecret);
    }
    // Senha certa: carga inicial e inscrições em tempo real
    app_state.store.activate().await;
    Ok(Json(SessionStatus { unlocked: true }))
}

// POST /api/session/lock
#[utoipa::path(
    post,
    path = "/api/session/lock",
    tag = "Session",
    responses(
        (status = 200, description = "Sessão bloqueada", body = SessionStatus)
    )
)]
pub async fn lock(State(app_state): State<AppState>) -> Json<SessionStatus> {
    app_state.store.deactivate().await;
    app_state.gate.lock();
    Json(SessionStatus { unlocked: false })
}

// GET /api/session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    responses(
        (status = 200, description = "Estado atual do portão", body = SessionStatus)
    )
)]
pub async fn status(State(app_state): State<AppState>) -> Json<SessionStatus> {
    Json(SessionStatus {
        unlocked: app_state.gate.is_unlocked(),
    })
}
