// src/handlers/categories.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        inventory::{Category, CategoryFields, Floor, COLOR_PALETTE, ICON_OPTIONS},
        log::PRESET_MANAGERS,
    },
};

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses(
        (status = 200, description = "Categorias na ordem de exibição", body = Vec<Category>)
    )
)]
pub async fn list_categories(State(app_state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(app_state.store.categories().await))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CategoryFields,
    responses(
        (status = 201, description = "Categoria criada no fim da ordem", body = Category),
        (status = 400, description = "Nome vazio"),
        (status = 409, description = "Nome já existe")
    )
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CategoryFields>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.inventory_service.add_category(payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

// Renomear também renomeia os itens que usam o nome antigo
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    request_body = CategoryFields,
    params(
        ("id" = Uuid, Path, description = "ID da categoria")
    ),
    responses(
        (status = 200, description = "Categoria atualizada", body = Category),
        (status = 404, description = "Categoria não encontrada"),
        (status = 409, description = "Nome já existe")
    )
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryFields>,
) -> Result<impl IntoResponse, AppError> {
    let category = app_state.inventory_service.edit_category(id, payload).await?;
    Ok((StatusCode::OK, Json(category)))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(
        ("id" = Uuid, Path, description = "ID da categoria")
    ),
    responses(
        (status = 204, description = "Categoria excluída"),
        (status = 404, description = "Categoria não encontrada"),
        (status = 409, description = "Categoria ainda possui itens")
    )
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.inventory_service.delete_category(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Opções fixas dos formulários
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormOptions {
    pub floors: Vec<Floor>,
    pub icons: Vec<String>,
    pub colors: Vec<String>,
    pub managers: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/options",
    tag = "Categories",
    responses(
        (status = 200, description = "Andares, ícones, cores e responsáveis pré-definidos", body = FormOptions)
    )
)]
pub async fn form_options() -> Json<FormOptions> {
    Json(FormOptions {
        floors: Floor::ALL.to_vec(),
        icons: ICON_OPTIONS.map(String::from).to_vec(),
        colors: COLOR_PALETTE.map(String::from).to_vec(),
        managers: PRESET_MANAGERS.map(String::from).to_vec(),
    })
}
