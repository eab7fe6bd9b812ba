// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Quantidade de saída fora de [1, estoque atual]
    #[error("Quantidade inválida: {requested} (estoque atual: {available})")]
    InvalidQuantity { requested: i32, available: i32 },

    #[error("Item não encontrado: {0}")]
    ItemNotFound(Uuid),

    #[error("Categoria não encontrada: {0}")]
    CategoryNotFound(Uuid),

    #[error("Já existe uma categoria chamada '{0}'")]
    CategoryNameAlreadyExists(String),

    #[error("A categoria '{name}' ainda possui {count} item(ns)")]
    CategoryInUse { name: String, count: usize },

    #[error("Planilha sem linhas para importar")]
    EmptyImport,

    #[error("Planilha inválida: {0}")]
    SpreadsheetParse(String),

    #[error("Planilha não encontrada: {0}")]
    SheetNotFound(String),

    #[error("Local desconhecido: {0}")]
    InvalidFloor(String),

    #[error("Senha incorreta")]
    InvalidSecret,

    #[error("Sessão bloqueada")]
    Locked,

    // Falha reportada pelo colaborador de armazenamento (fora do sqlx)
    #[error("Erro de armazenamento: {0}")]
    Storage(String),

    #[error("Erro ao gravar o marcador de sessão: {0}")]
    SessionMarker(#[from] std::io::Error),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidQuantity { .. }
            | AppError::EmptyImport
            | AppError::SpreadsheetParse(_)
            | AppError::InvalidFloor(_)
            | AppError::CsvError(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidSecret | AppError::Locked => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::ItemNotFound(_)
            | AppError::CategoryNotFound(_)
            | AppError::SheetNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::CategoryNameAlreadyExists(_) | AppError::CategoryInUse { .. } => {
                (StatusCode::CONFLICT, self.to_string())
            }

            // Storage, DatabaseError, SessionMarker e InternalServerError viram 500.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
