// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::inventory::{
        DeleteRequest, Item, ItemFields, ItemView, OutboundPreview, OutboundRequest,
    },
    services::query_service::ItemFilter,
};

// ---
// Handler: list_items (lê do cache, com filtros opcionais)
// ---
#[utoipa::path(
    get,
    path = "/api/items",
    tag = "Inventory",
    params(ItemFilter),
    responses(
        (status = 200, description = "Itens em cache, mais antigos primeiro, com o visual da categoria", body = Vec<ItemView>),
        (status = 401, description = "Sessão bloqueada")
    )
)]
pub async fn list_items(
    State(app_state): State<AppState>,
    Query(filter): Query<ItemFilter>,
) -> Result<impl IntoResponse, AppError> {
    let items = filter.apply(&app_state.store.items().await);
    let views = app_state.store.item_views(items).await;
    Ok((StatusCode::OK, Json(views)))
}

// ---
// Handler: create_item (entrada)
// ---
#[utoipa::path(
    post,
    path = "/api/items",
    tag = "Inventory",
    request_body = ItemFields,
    responses(
        (status = 201, description = "Item cadastrado e entrada registrada", body = Item),
        (status = 400, description = "Nome vazio ou quantidade negativa"),
        (status = 401, description = "Sessão bloqueada")
    )
)]
pub async fn create_item(
    State(app_state): State<AppState>,
    Json(payload): Json<ItemFields>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.inventory_service.register_item(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[utoipa::path(
    put,
    path = "/api/items/{id}",
    tag = "Inventory",
    request_body = ItemFields,
    params(
        ("id" = Uuid, Path, description = "ID do item")
    ),
    responses(
        (status = 200, description = "Item atualizado", body = Item),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ItemFields>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.inventory_service.edit_item(id, payload).await?;
    Ok((StatusCode::OK, Json(item)))
}

// ---
// Handler: outbound_item (saída / entrega)
// ---
#[utoipa::path(
    post,
    path = "/api/items/{id}/outbound",
    tag = "Inventory",
    request_body = OutboundRequest,
    params(
        ("id" = Uuid, Path, description = "ID do item")
    ),
    responses(
        (status = 200, description = "Saída registrada; item com o saldo restante", body = Item),
        (status = 400, description = "Quantidade fora de [1, estoque]"),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn outbound_item(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<OutboundRequest>,
) -> Result<impl IntoResponse, AppError> {
    let item = app_state.inventory_service.outbound(id, payload).await?;
    Ok((StatusCode::OK, Json(item)))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PreviewQuery {
    /// Quantidade digitada no formulário
    pub quantity: i32,
}

// Ajuste do formulário de saída: [1, estoque]
#[utoipa::path(
    get,
    path = "/api/items/{id}/outbound-preview",
    tag = "Inventory",
    params(
        ("id" = Uuid, Path, description = "ID do item"),
        PreviewQuery
    ),
    responses(
        (status = 200, description = "Quantidade ajustada e saldo restante", body = OutboundPreview),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn outbound_preview(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<OutboundPreview>, AppError> {
    let item = app_state
        .store
        .item(id)
        .await
        .ok_or(AppError::ItemNotFound(id))?;
    Ok(Json(OutboundPreview::new(query.quantity, item.total)))
}

#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    tag = "Inventory",
    request_body(content = DeleteRequest, description = "Motivo e responsável (opcional)"),
    params(
        ("id" = Uuid, Path, description = "ID do item")
    ),
    responses(
        (status = 204, description = "Item excluído"),
        (status = 404, description = "Item não encontrado")
    )
)]
pub async fn delete_item(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<DeleteRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    app_state.inventory_service.delete_item(id, request).await?;
    Ok(StatusCode::NO_CONTENT)
}
