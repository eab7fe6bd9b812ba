// src/services/audit.rs
//
// Texto do histórico. Funções puras: dado o pedido (e o estado anterior),
// montam o registro que vai para a tabela 'logs'.

use crate::models::{
    inventory::{Item, ItemFields, OutboundRequest, DeleteRequest},
    log::{LogType, NewLogEntry, SYSTEM_MANAGER, UNASSIGNED_MANAGER},
};

// Detalhe de uma edição que não alterou nenhum campo rastreado
pub const EDIT_WITHOUT_CHANGES: &str = "정보 수정";

fn manager_or_unassigned(manager: &str) -> String {
    if manager.is_empty() {
        UNASSIGNED_MANAGER.to_string()
    } else {
        manager.to_string()
    }
}

pub fn inbound_detail(fields: &ItemFields) -> String {
    format!("{} / {} / {}개 입고", fields.category, fields.location, fields.total)
}

/// Lista as transições dos campos alterados, sempre na ordem
/// nome, quantidade, local, responsável, categoria.
pub fn edit_detail(before: &Item, after: &ItemFields) -> String {
    let mut changes = Vec::new();
    if before.name != after.name {
        changes.push(format!("이름: {}→{}", before.name, after.name));
    }
    if before.total != after.total {
        changes.push(format!("수량: {}→{}", before.total, after.total));
    }
    if before.location != after.location {
        changes.push(format!("위치: {}→{}", before.location, after.location));
    }
    if before.manager != after.manager {
        changes.push(format!("담당: {}→{}", before.manager, after.manager));
    }
    if before.category != after.category {
        changes.push(format!("카테고리: {}→{}", before.category, after.category));
    }

    if changes.is_empty() {
        EDIT_WITHOUT_CHANGES.to_string()
    } else {
        changes.join(", ")
    }
}

pub fn outbound_detail(request: &OutboundRequest, remaining: i32) -> String {
    let client = if request.client.is_empty() {
        "-"
    } else {
        request.client.as_str()
    };
    let mut detail = format!(
        "유형: {} / 거래처: {} / 수량: {}개 출고 (잔여 {}개)",
        request.out_type, client, request.quantity, remaining
    );
    if !request.note.is_empty() {
        detail.push_str(" / ");
        detail.push_str(&request.note);
    }
    detail
}

pub fn delete_detail(item: &Item, request: &DeleteRequest) -> String {
    format!("사유: {} / {}개 / {}", request.reason, item.total, item.location)
}

pub fn upload_item_name(count: usize) -> String {
    format!("{count}개 항목")
}

pub fn upload_detail(file_name: &str) -> String {
    format!("엑셀 업로드: {file_name}")
}

// ---
// Registros completos
// ---

pub fn inbound_entry(fields: &ItemFields) -> NewLogEntry {
    NewLogEntry {
        log_type: LogType::Inbound,
        manager: manager_or_unassigned(&fields.manager),
        item_name: fields.name.clone(),
        detail: inbound_detail(fields),
    }
}

pub fn edit_entry(before: &Item, after: &ItemFields) -> NewLogEntry {
    NewLogEntry {
        log_type: LogType::Edit,
        manager: manager_or_unassigned(&after.manager),
        item_name: after.name.clone(),
        detail: edit_detail(before, after),
    }
}

pub fn outbound_entry(item: &Item, request: &OutboundRequest, remaining: i32) -> NewLogEntry {
    NewLogEntry {
        log_type: LogType::Outbound,
        manager: request.manager.clone(),
        item_name: item.name.clone(),
        detail: outbound_detail(request, remaining),
    }
}

pub fn delete_entry(item: &Item, request: &DeleteRequest) -> NewLogEntry {
    NewLogEntry {
        log_type: LogType::Delete,
        manager: request.manager.clone(),
        item_name: item.name.clone(),
        detail: delete_detail(item, request),
    }
}

pub fn upload_entry(file_name: &str, count: usize) -> NewLogEntry {
    NewLogEntry {
        log_type: LogType::Upload,
        manager: SYSTEM_MANAGER.to_string(),
        item_name: upload_item_name(count),
        detail: upload_detail(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        inventory::Floor,
        log::{DeleteReason, OutboundType},
    };
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn hdmi() -> Item {
        Item {
            id: Uuid::new_v4(),
            category: "케이블".into(),
            name: "HDMI cable".into(),
            spec: "2m".into(),
            serial: "SN-1".into(),
            total: 5,
            location: Floor::First,
            manager: "이건".into(),
            note: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn inbound_detail_names_category_floor_and_quantity() {
        let fields = hdmi().fields();
        assert_eq!(inbound_detail(&fields), "케이블 / 1층 / 5개 입고");
    }

    #[test]
    fn inbound_without_manager_is_logged_as_unassigned() {
        let fields = ItemFields { manager: String::new(), ..hdmi().fields() };
        assert_eq!(inbound_entry(&fields).manager, UNASSIGNED_MANAGER);
    }

    #[test]
    fn blank_but_non_empty_text_is_logged_as_typed() {
        let fields = ItemFields { manager: " ".into(), ..hdmi().fields() };
        assert_eq!(inbound_entry(&fields).manager, " ");

        let request = OutboundRequest {
            out_type: OutboundType::Delivery,
            client: " ".into(),
            quantity: 1,
            manager: "이건".into(),
            note: String::new(),
        };
        assert_eq!(
            outbound_detail(&request, 4),
            "유형: 납품 / 거래처:   / 수량: 1개 출고 (잔여 4개)"
        );
    }

    #[test]
    fn edit_detail_lists_changes_in_fixed_order() {
        let before = hdmi();
        let after = ItemFields {
            category: "영상".into(),
            name: "HDMI 2.1 cable".into(),
            total: 7,
            location: Floor::Third,
            manager: "박광성".into(),
            ..before.fields()
        };

        assert_eq!(
            edit_detail(&before, &after),
            "이름: HDMI cable→HDMI 2.1 cable, 수량: 5→7, 위치: 1층→3층, 담당: 이건→박광성, 카테고리: 케이블→영상"
        );
    }

    #[test]
    fn edit_detail_ignores_untracked_fields() {
        let before = hdmi();
        let after = ItemFields {
            spec: "3m".into(),
            serial: "SN-2".into(),
            note: "교체".into(),
            ..before.fields()
        };
        assert_eq!(edit_detail(&before, &after), EDIT_WITHOUT_CHANGES);
    }

    #[test]
    fn edit_detail_with_single_change() {
        let before = hdmi();
        let after = ItemFields { total: 4, ..before.fields() };
        assert_eq!(edit_detail(&before, &after), "수량: 5→4");
    }

    #[test]
    fn outbound_detail_defaults_client_and_appends_note() {
        let request = OutboundRequest {
            out_type: OutboundType::Rental,
            client: String::new(),
            quantity: 3,
            manager: "이건".into(),
            note: "전시용".into(),
        };
        assert_eq!(
            outbound_detail(&request, 2),
            "유형: 대여 / 거래처: - / 수량: 3개 출고 (잔여 2개) / 전시용"
        );
    }

    #[test]
    fn outbound_detail_without_note() {
        let request = OutboundRequest {
            out_type: OutboundType::Delivery,
            client: "강남 전시장".into(),
            quantity: 1,
            manager: "이건".into(),
            note: String::new(),
        };
        assert_eq!(
            outbound_detail(&request, 0),
            "유형: 납품 / 거래처: 강남 전시장 / 수량: 1개 출고 (잔여 0개)"
        );
    }

    #[test]
    fn delete_detail_records_reason_stock_and_floor() {
        let request = DeleteRequest { reason: DeleteReason::Broken, manager: "박광성".into() };
        let entry = delete_entry(&hdmi(), &request);
        assert_eq!(entry.detail, "사유: 고장 / 5개 / 1층");
        assert_eq!(entry.manager, "박광성");
        assert_eq!(entry.log_type, LogType::Delete);
    }

    #[test]
    fn upload_entry_counts_rows() {
        let entry = upload_entry("재고.csv", 3);
        assert_eq!(entry.item_name, "3개 항목");
        assert_eq!(entry.detail, "엑셀 업로드: 재고.csv");
        assert_eq!(entry.manager, SYSTEM_MANAGER);
    }
}
