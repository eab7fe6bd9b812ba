// src/services/query_service.rs
//
// Filtros e agregados das telas de estoque, histórico e painel.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{
    inventory::{Category, Floor, Item},
    log::LogEntry,
};

// Valor de filtro que significa "sem filtro"
pub const ALL_FILTER: &str = "전체";

fn active(filter: &Option<String>) -> Option<&str> {
    filter
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != ALL_FILTER)
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemFilter {
    pub category: Option<String>,
    pub floor: Option<String>,
    pub q: Option<String>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        let category_ok = active(&self.category).is_none_or(|c| item.category == c);
        let floor_ok = active(&self.floor).is_none_or(|f| item.location.as_str() == f);
        let query_ok = match active(&self.q) {
            None => true,
            Some(q) => {
                let q = q.to_lowercase();
                contains_ci(&item.name, &q)
                    || contains_ci(&item.spec, &q)
                    || contains_ci(&item.serial, &q)
            }
        };
        category_ok && floor_ok && query_ok
    }

    pub fn apply(&self, items: &[Item]) -> Vec<Item> {
        items.iter().filter(|item| self.matches(item)).cloned().collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogFilter {
    #[serde(rename = "type")]
    pub log_type: Option<String>,
    pub q: Option<String>,
}

impl LogFilter {
    pub fn matches(&self, log: &LogEntry) -> bool {
        let type_ok = active(&self.log_type).is_none_or(|t| log.log_type.as_str() == t);
        let query_ok = match active(&self.q) {
            None => true,
            Some(q) => {
                let q = q.to_lowercase();
                contains_ci(&log.item_name, &q)
                    || contains_ci(&log.detail, &q)
                    || contains_ci(&log.manager, &q)
            }
        };
        type_ok && query_ok
    }

    pub fn apply(&self, logs: &[LogEntry]) -> Vec<LogEntry> {
        logs.iter().filter(|log| self.matches(log)).cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStat {
    pub category: Category,
    pub count: usize,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FloorTotal {
    pub floor: Floor,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub floor: Option<Floor>,
    pub item_count: usize,
    pub unit_total: i64,
    pub categories: Vec<CategoryStat>,
}

/// Quantidade de itens e unidades por categoria (na ordem das categorias),
/// só as que têm ao menos um item.
pub fn category_stats(categories: &[Category], items: &[Item]) -> Vec<CategoryStat> {
    categories
        .iter()
        .filter_map(|category| {
            let matching: Vec<&Item> =
                items.iter().filter(|item| item.category == category.name).collect();
            if matching.is_empty() {
                return None;
            }
            Some(CategoryStat {
                category: category.clone(),
                count: matching.len(),
                total: matching.iter().map(|item| i64::from(item.total)).sum(),
            })
        })
        .collect()
}

/// Unidades de uma categoria em cada andar.
pub fn floor_totals(items: &[Item], category: &str) -> Vec<FloorTotal> {
    Floor::ALL
        .into_iter()
        .map(|floor| FloorTotal {
            floor,
            total: items
                .iter()
                .filter(|item| item.category == category && item.location == floor)
                .map(|item| i64::from(item.total))
                .sum(),
        })
        .collect()
}

pub fn dashboard(categories: &[Category], items: &[Item], floor: Option<Floor>) -> Dashboard {
    let scoped: Vec<Item> = match floor {
        Some(floor) => items.iter().filter(|item| item.location == floor).cloned().collect(),
        None => items.to_vec(),
    };
    Dashboard {
        floor,
        item_count: scoped.len(),
        unit_total: scoped.iter().map(|item| i64::from(item.total)).sum(),
        categories: category_stats(categories, &scoped),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(name: &str, category: &str, location: Floor, total: i32) -> Item {
        Item {
            id: Uuid::new_v4(),
            category: category.into(),
            name: name.into(),
            spec: "USB-C".into(),
            serial: "AB-100".into(),
            total,
            location,
            manager: "이건".into(),
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    fn category(name: &str, sort_order: i32) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            icon: "🔌".into(),
            color: "#0EA5E9".into(),
            sort_order,
        }
    }

    #[test]
    fn item_filter_treats_all_as_no_filter() {
        let items = vec![
            item("HDMI", "케이블", Floor::First, 5),
            item("Mouse", "입력장치", Floor::Second, 2),
        ];
        let filter = ItemFilter { category: Some(ALL_FILTER.into()), ..Default::default() };
        assert_eq!(filter.apply(&items).len(), 2);
    }

    #[test]
    fn item_filter_searches_name_spec_and_serial_case_insensitively() {
        let items = vec![item("HDMI", "케이블", Floor::First, 5)];
        for q in ["hdmi", "usb-c", "ab-1"] {
            let filter = ItemFilter { q: Some(q.into()), ..Default::default() };
            assert_eq!(filter.apply(&items).len(), 1, "query {q}");
        }
        let filter = ItemFilter { q: Some("dp".into()), ..Default::default() };
        assert!(filter.apply(&items).is_empty());
    }

    #[test]
    fn item_filter_combines_category_and_floor() {
        let items = vec![
            item("HDMI", "케이블", Floor::First, 5),
            item("DP", "케이블", Floor::Third, 1),
        ];
        let filter = ItemFilter {
            category: Some("케이블".into()),
            floor: Some("3층".into()),
            q: None,
        };
        let found = filter.apply(&items);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "DP");
    }

    #[test]
    fn log_filter_matches_type_and_text() {
        let log = LogEntry {
            id: Uuid::new_v4(),
            log_type: crate::models::log::LogType::Outbound,
            manager: "박광성".into(),
            item_name: "HDMI".into(),
            detail: "유형: 납품 / 거래처: - / 수량: 1개 출고 (잔여 4개)".into(),
            created_at: Utc::now(),
        };
        let logs = vec![log];

        let by_type = LogFilter { log_type: Some("출고".into()), q: None };
        assert_eq!(by_type.apply(&logs).len(), 1);

        let wrong_type = LogFilter { log_type: Some("삭제".into()), q: None };
        assert!(wrong_type.apply(&logs).is_empty());

        let by_manager = LogFilter { log_type: Some(ALL_FILTER.into()), q: Some("박광성".into()) };
        assert_eq!(by_manager.apply(&logs).len(), 1);
    }

    #[test]
    fn category_stats_skip_empty_categories() {
        let categories = vec![category("케이블", 0), category("카메라", 1)];
        let items = vec![
            item("HDMI", "케이블", Floor::First, 5),
            item("DP", "케이블", Floor::Third, 2),
        ];

        let stats = category_stats(&categories, &items);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].total, 7);
    }

    #[test]
    fn dashboard_scopes_by_floor() {
        let categories = vec![category("케이블", 0)];
        let items = vec![
            item("HDMI", "케이블", Floor::First, 5),
            item("DP", "케이블", Floor::Third, 2),
        ];

        let board = dashboard(&categories, &items, Some(Floor::Third));
        assert_eq!(board.item_count, 1);
        assert_eq!(board.unit_total, 2);

        let per_floor = floor_totals(&items, "케이블");
        assert_eq!(per_floor.len(), 5);
        assert_eq!(per_floor[1].total, 5);
        assert_eq!(per_floor[3].total, 2);
    }
}
