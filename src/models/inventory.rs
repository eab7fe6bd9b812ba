// src/models/inventory.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    models::log::{DeleteReason, OutboundType, DEFAULT_MANAGER},
};

pub const DEFAULT_CATEGORY_ICON: &str = "📦";
// Cor usada para itens cuja categoria não existe mais
pub const FALLBACK_CATEGORY_COLOR: &str = "#94A3B8";
pub const COLOR_PALETTE: [&str; 8] = [
    "#0EA5E9", "#EF4444", "#22C55E", "#F97316", "#A855F7", "#14B8A6", "#EC4899", "#EAB308",
];
pub const ICON_OPTIONS: [&str; 18] = [
    "📦", "🔌", "🖱", "⌨", "🎙", "📷", "🔊", "💡", "🛠", "🔧", "🖨", "📱", "🗂", "🔋", "📡", "🎯",
    "🖇", "🔩",
];

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O nome é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

// --- 1. Andares ---
// Tabela 'items' guarda o andar como o enum 'floor' do Postgres.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "floor")]
pub enum Floor {
    #[serde(rename = "지하1층")]
    #[sqlx(rename = "지하1층")]
    Basement1,
    #[default]
    #[serde(rename = "1층")]
    #[sqlx(rename = "1층")]
    First,
    #[serde(rename = "2층")]
    #[sqlx(rename = "2층")]
    Second,
    #[serde(rename = "3층")]
    #[sqlx(rename = "3층")]
    Third,
    #[serde(rename = "4층")]
    #[sqlx(rename = "4층")]
    Fourth,
}

impl Floor {
    pub const ALL: [Floor; 5] = [
        Floor::Basement1,
        Floor::First,
        Floor::Second,
        Floor::Third,
        Floor::Fourth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Floor::Basement1 => "지하1층",
            Floor::First => "1층",
            Floor::Second => "2층",
            Floor::Third => "3층",
            Floor::Fourth => "4층",
        }
    }
}

impl fmt::Display for Floor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Floor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Floor::ALL
            .into_iter()
            .find(|floor| floor.as_str() == trimmed)
            .ok_or_else(|| AppError::InvalidFloor(s.to_string()))
    }
}

// --- 2. Itens (equipamentos) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    // Referência "fraca": nome da categoria, não o id
    pub category: String,
    pub name: String,
    pub spec: String,
    pub serial: String,
    pub total: i32,
    pub location: Floor,
    pub manager: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn fields(&self) -> ItemFields {
        ItemFields {
            category: self.category.clone(),
            name: self.name.clone(),
            spec: self.spec.clone(),
            serial: self.serial.clone(),
            total: self.total,
            location: self.location,
            manager: self.manager.clone(),
            note: self.note.clone(),
        }
    }
}

/// Campos editáveis de um item. Usado tanto no cadastro (entrada) quanto na edição
/// e na importação de planilha.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemFields {
    #[schema(example = "케이블")]
    pub category: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "HDMI 케이블 2m")]
    pub name: String,

    pub spec: String,
    pub serial: String,

    #[validate(range(min = 0, message = "A quantidade não pode ser negativa."))]
    pub total: i32,

    pub location: Floor,
    pub manager: String,
    pub note: String,
}

impl Default for ItemFields {
    fn default() -> Self {
        Self {
            category: String::new(),
            name: String::new(),
            spec: String::new(),
            serial: String::new(),
            total: 0,
            location: Floor::default(),
            manager: DEFAULT_MANAGER.to_string(),
            note: String::new(),
        }
    }
}

// --- 3. Categorias ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub sort_order: i32,
}

impl Category {
    /// Como exibir um item cuja categoria não tem registro (referência órfã).
    pub fn placeholder(name: &str) -> Self {
        Self {
            id: Uuid::nil(),
            name: name.to_string(),
            icon: DEFAULT_CATEGORY_ICON.to_string(),
            color: FALLBACK_CATEGORY_COLOR.to_string(),
            sort_order: i32::MAX,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryFields {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "케이블")]
    pub name: String,
    #[schema(example = "🔌")]
    pub icon: String,
    #[schema(example = "#0EA5E9")]
    pub color: String,
}

impl CategoryFields {
    /// Preenche ícone e cor vazios: ícone padrão e a primeira cor da paleta ainda
    /// não usada por outra categoria.
    pub fn with_defaults(mut self, existing: &[Category]) -> Self {
        if self.icon.trim().is_empty() {
            self.icon = DEFAULT_CATEGORY_ICON.to_string();
        }
        if self.color.trim().is_empty() {
            self.color = COLOR_PALETTE
                .iter()
                .find(|color| !existing.iter().any(|c| c.color == **color))
                .unwrap_or(&COLOR_PALETTE[0])
                .to_string();
        }
        self
    }
}

/// Resultado da edição de categoria: a categoria gravada e quantos itens
/// foram renomeados em cascata.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryUpdate {
    pub category: Category,
    pub renamed_items: u64,
}

// --- 4. Pedidos de saída e exclusão ---
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRequest {
    #[serde(default)]
    pub out_type: OutboundType,

    // Cliente / destino
    #[serde(default)]
    pub client: String,

    #[schema(example = 3)]
    pub quantity: i32,

    #[serde(default = "default_manager")]
    pub manager: String,

    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    #[serde(default)]
    pub reason: DeleteReason,

    #[serde(default = "default_manager")]
    pub manager: String,
}

impl Default for DeleteRequest {
    fn default() -> Self {
        Self {
            reason: DeleteReason::default(),
            manager: default_manager(),
        }
    }
}

fn default_manager() -> String {
    DEFAULT_MANAGER.to_string()
}

/// Ajusta a quantidade pedida ao intervalo aceito pelo formulário: [1, total].
pub fn clamp_outbound_quantity(requested: i32, total: i32) -> i32 {
    requested.max(1).min(total.max(1))
}

/// Prévia do formulário de saída: a quantidade já ajustada e o saldo que sobraria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPreview {
    pub quantity: i32,
    pub available: i32,
    pub remaining: i32,
}

impl OutboundPreview {
    pub fn new(requested: i32, available: i32) -> Self {
        let quantity = clamp_outbound_quantity(requested, available);
        Self {
            quantity,
            available,
            remaining: available - quantity,
        }
    }
}

// --- 5. Item com o visual da categoria ---
// Categorias sem registro aparecem com o ícone e a cor padrão.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub category_icon: String,
    pub category_color: String,
}

impl ItemView {
    pub fn new(item: Item, categories: &[Category]) -> Self {
        let display = categories
            .iter()
            .find(|category| category.name == item.category)
            .cloned()
            .unwrap_or_else(|| Category::placeholder(&item.category));
        Self {
            item,
            category_icon: display.icon,
            category_color: display.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, color: &str) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            icon: "🔌".to_string(),
            color: color.to_string(),
            sort_order: 0,
        }
    }

    #[test]
    fn floor_parses_korean_labels() {
        assert_eq!("지하1층".parse::<Floor>().unwrap(), Floor::Basement1);
        assert_eq!(" 3층 ".parse::<Floor>().unwrap(), Floor::Third);
        assert!(matches!(
            "5층".parse::<Floor>(),
            Err(AppError::InvalidFloor(_))
        ));
    }

    #[test]
    fn floor_serializes_as_label() {
        let json = serde_json::to_string(&Floor::Fourth).unwrap();
        assert_eq!(json, "\"4층\"");
    }

    #[test]
    fn blank_item_name_is_rejected() {
        let fields = ItemFields {
            name: "   ".to_string(),
            ..ItemFields::default()
        };
        assert!(fields.validate().is_err());
    }

    #[test]
    fn negative_total_is_rejected() {
        let fields = ItemFields {
            name: "HDMI 케이블".to_string(),
            total: -1,
            ..ItemFields::default()
        };
        let errors = fields.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("total"));
    }

    #[test]
    fn category_defaults_pick_first_unused_color() {
        let existing = vec![category("케이블", "#0EA5E9"), category("마우스", "#EF4444")];
        let fields = CategoryFields {
            name: "카메라".to_string(),
            ..CategoryFields::default()
        }
        .with_defaults(&existing);

        assert_eq!(fields.icon, DEFAULT_CATEGORY_ICON);
        assert_eq!(fields.color, "#22C55E");
    }

    #[test]
    fn category_defaults_fall_back_to_first_color_when_palette_is_used_up() {
        let existing: Vec<Category> = COLOR_PALETTE
            .iter()
            .map(|color| category("x", color))
            .collect();
        let fields = CategoryFields {
            name: "기타".to_string(),
            ..CategoryFields::default()
        }
        .with_defaults(&existing);

        assert_eq!(fields.color, COLOR_PALETTE[0]);
    }

    #[test]
    fn outbound_quantity_is_clamped_to_stock() {
        assert_eq!(clamp_outbound_quantity(0, 5), 1);
        assert_eq!(clamp_outbound_quantity(9, 5), 5);
        assert_eq!(clamp_outbound_quantity(3, 5), 3);
    }

    #[test]
    fn outbound_preview_clamps_and_reports_remaining() {
        let preview = OutboundPreview::new(9, 5);
        assert_eq!(preview, OutboundPreview { quantity: 5, available: 5, remaining: 0 });
        assert_eq!(OutboundPreview::new(2, 5).remaining, 3);
    }

    #[test]
    fn item_view_falls_back_to_placeholder_look() {
        let item = Item {
            id: Uuid::new_v4(),
            category: "사라진 카테고리".into(),
            name: "HDMI".into(),
            spec: String::new(),
            serial: String::new(),
            total: 1,
            location: Floor::First,
            manager: "이건".into(),
            note: String::new(),
            created_at: chrono::Utc::now(),
        };
        let known = ItemView::new(
            Item { category: "케이블".into(), ..item.clone() },
            &[category("케이블", "#0EA5E9")],
        );
        assert_eq!(known.category_icon, "🔌");
        assert_eq!(known.category_color, "#0EA5E9");

        let orphan = ItemView::new(item, &[category("케이블", "#0EA5E9")]);
        assert_eq!(orphan.category_icon, DEFAULT_CATEGORY_ICON);
        assert_eq!(orphan.category_color, FALLBACK_CATEGORY_COLOR);
    }
}
