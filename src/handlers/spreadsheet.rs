// src/handlers/spreadsheet.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::AppError,
    config::AppState,
    services::spreadsheet_service::{ExportFile, HISTORY_SHEET, INVENTORY_SHEET},
};

fn download(file: ExportFile) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
}

// ---
// Handler: export_sheet (`inventory` ou `history`)
// ---
#[utoipa::path(
    get,
    path = "/api/export/{sheet}",
    tag = "Spreadsheet",
    params(
        ("sheet" = String, Path, description = "`inventory` ou `history`")
    ),
    responses(
        (status = 200, description = "Arquivo da planilha", content_type = "text/csv"),
        (status = 404, description = "Planilha desconhecida ou histórico vazio")
    )
)]
pub async fn export_sheet(
    State(app_state): State<AppState>,
    Path(sheet): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let wanted = match sheet.as_str() {
        "inventory" => INVENTORY_SHEET,
        "history" => HISTORY_SHEET,
        _ => return Err(AppError::SheetNotFound(sheet)),
    };

    let items = app_state.store.items().await;
    let logs = app_state.store.logs().await;
    let today = chrono::Local::now().date_naive();

    let file = app_state
        .spreadsheet_service
        .export(&items, &logs, today)?
        .into_iter()
        .find(|file| file.sheet_name == wanted)
        // Sem histórico, a planilha de histórico não existe
        .ok_or_else(|| AppError::SheetNotFound(wanted.to_string()))?;

    Ok(download(file))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImportParams {
    /// Nome do arquivo enviado, gravado no histórico
    #[serde(rename = "fileName")]
    pub file_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub imported: usize,
}

// ---
// Handler: import_items (corpo = arquivo da planilha)
// ---
#[utoipa::path(
    post,
    path = "/api/items/import",
    tag = "Spreadsheet",
    params(ImportParams),
    request_body(content = String, content_type = "text/csv", description = "Primeira planilha, com cabeçalhos"),
    responses(
        (status = 201, description = "Itens importados em lote", body = ImportResponse),
        (status = 400, description = "Planilha vazia ou inválida")
    )
)]
pub async fn import_items(
    State(app_state): State<AppState>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state.spreadsheet_service.parse_import(&body)?;
    let inserted = app_state
        .inventory_service
        .import_items(&params.file_name, rows)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ImportResponse {
            imported: inserted.len(),
        }),
    ))
}
