// src/handlers/logs.rs

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{inventory::Floor, log::LogEntry},
    services::query_service::{self, Dashboard, FloorTotal, LogFilter, ALL_FILTER},
};

#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "History",
    params(LogFilter),
    responses(
        (status = 200, description = "Últimos registros do histórico, mais novos primeiro", body = Vec<LogEntry>)
    )
)]
pub async fn list_logs(
    State(app_state): State<AppState>,
    Query(filter): Query<LogFilter>,
) -> Json<Vec<LogEntry>> {
    let logs = app_state.store.logs().await;
    Json(filter.apply(&logs))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Andar (`1층`, `지하1층`...) ou `전체`
    pub floor: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "History",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Totais por categoria, opcionalmente por andar", body = Dashboard),
        (status = 400, description = "Andar desconhecido")
    )
)]
pub async fn dashboard(
    State(app_state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let floor = match query.floor.as_deref() {
        None | Some(ALL_FILTER) | Some("") => None,
        Some(raw) => Some(raw.parse::<Floor>()?),
    };

    let categories = app_state.store.categories().await;
    let items = app_state.store.items().await;
    Ok(Json(query_service::dashboard(&categories, &items, floor)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FloorBreakdownQuery {
    pub category: String,
}

#[utoipa::path(
    get,
    path = "/api/dashboard/floors",
    tag = "History",
    params(FloorBreakdownQuery),
    responses(
        (status = 200, description = "Unidades da categoria em cada andar", body = Vec<FloorTotal>)
    )
)]
pub async fn floor_breakdown(
    State(app_state): State<AppState>,
    Query(query): Query<FloorBreakdownQuery>,
) -> Json<Vec<FloorTotal>> {
    let items = app_state.store.items().await;
    Json(query_service::floor_totals(&items, &query.category))
}
