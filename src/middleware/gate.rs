// src/middleware/gate.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState};

// Bloqueia todas as rotas de inventário enquanto a senha não foi aceita
pub async fn gate_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !app_state.gate.is_unlocked() {
        return Err(AppError::Locked);
    }
    Ok(next.run(request).await)
}
