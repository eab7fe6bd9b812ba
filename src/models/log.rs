// src/models/log.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const PRESET_MANAGERS: [&str; 2] = ["이건", "박광성"];
pub const DEFAULT_MANAGER: &str = "이건";
// Registrado no histórico quando o formulário chega sem responsável
pub const UNASSIGNED_MANAGER: &str = "미지정";
pub const SYSTEM_MANAGER: &str = "시스템";

// --- Tipo de movimentação do histórico ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "log_type")]
pub enum LogType {
    #[serde(rename = "입고")]
    #[sqlx(rename = "입고")]
    Inbound,
    #[serde(rename = "출고")]
    #[sqlx(rename = "출고")]
    Outbound,
    #[serde(rename = "수정")]
    #[sqlx(rename = "수정")]
    Edit,
    #[serde(rename = "삭제")]
    #[sqlx(rename = "삭제")]
    Delete,
    #[serde(rename = "업로드")]
    #[sqlx(rename = "업로드")]
    Upload,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Inbound => "입고",
            LogType::Outbound => "출고",
            LogType::Edit => "수정",
            LogType::Delete => "삭제",
            LogType::Upload => "업로드",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- HISTÓRICO (somente inserção) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub log_type: LogType,
    pub manager: String,
    // Cópia do nome no momento da ação, não uma referência viva
    pub item_name: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    pub log_type: LogType,
    pub manager: String,
    pub item_name: String,
    pub detail: String,
}

// --- Tipos de saída ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum OutboundType {
    #[default]
    #[serde(rename = "납품")]
    Delivery,
    #[serde(rename = "대여")]
    Rental,
    #[serde(rename = "반출")]
    Removal,
    #[serde(rename = "폐기")]
    Disposal,
    #[serde(rename = "기타")]
    Other,
}

impl fmt::Display for OutboundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutboundType::Delivery => "납품",
            OutboundType::Rental => "대여",
            OutboundType::Removal => "반출",
            OutboundType::Disposal => "폐기",
            OutboundType::Other => "기타",
        })
    }
}

// --- Motivos de exclusão ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum DeleteReason {
    #[default]
    #[serde(rename = "오류등록")]
    RegisteredInError,
    #[serde(rename = "고장")]
    Broken,
    #[serde(rename = "파손")]
    Damaged,
    #[serde(rename = "납품")]
    Delivered,
}

impl fmt::Display for DeleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DeleteReason::RegisteredInError => "오류등록",
            DeleteReason::Broken => "고장",
            DeleteReason::Damaged => "파손",
            DeleteReason::Delivered => "납품",
        })
    }
}
