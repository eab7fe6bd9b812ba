// src/db/memory_repo.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::repository::{
        ChangeEvent, ChangeKind, ChangeSubscription, Collection, EventFilter,
        InventoryRepository, CHANGE_CHANNEL_CAPACITY,
    },
    models::{
        inventory::{Category, CategoryFields, CategoryUpdate, Item, ItemFields},
        log::{LogEntry, NewLogEntry},
    },
};

/// Falhas simuladas, para exercitar os caminhos de erro sem banco.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    pub fail_reads: bool,
    pub fail_item_writes: bool,
    pub fail_log_writes: bool,
}

#[derive(Debug, Default)]
struct Tables {
    items: Vec<Item>,
    categories: Vec<Category>,
    logs: Vec<LogEntry>,
    faults: Faults,
}

// Repositório em memória: mesmas regras do Postgres (nome de categoria único,
// total >= 0, cascata de renomeação atômica).
#[derive(Clone)]
pub struct MemoryInventoryRepository {
    tables: Arc<Mutex<Tables>>,
    events: broadcast::Sender<ChangeEvent>,
}

impl Default for MemoryInventoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryInventoryRepository {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            events,
        }
    }

    pub async fn set_faults(&self, faults: Faults) {
        self.tables.lock().await.faults = faults;
    }

    fn notify(&self, collection: Collection, kind: ChangeKind) {
        // Sem inscritos o envio falha, e tudo bem
        let _ = self.events.send(ChangeEvent { collection, kind });
    }

    fn check_reads(tables: &Tables) -> Result<(), AppError> {
        if tables.faults.fail_reads {
            return Err(AppError::Storage("leitura indisponível".into()));
        }
        Ok(())
    }

    fn check_item_writes(tables: &Tables) -> Result<(), AppError> {
        if tables.faults.fail_item_writes {
            return Err(AppError::Storage("escrita de itens indisponível".into()));
        }
        Ok(())
    }

    fn check_total(total: i32) -> Result<(), AppError> {
        if total < 0 {
            return Err(AppError::Storage(format!(
                "violação de restrição: total negativo ({total})"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for MemoryInventoryRepository {
    async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        let tables = self.tables.lock().await;
        Self::check_reads(&tables)?;
        let mut items = tables.items.clone();
        items.sort_by_key(|item| item.created_at);
        Ok(items)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let tables = self.tables.lock().await;
        Self::check_reads(&tables)?;
        let mut categories = tables.categories.clone();
        categories.sort_by_key(|category| category.sort_order);
        Ok(categories)
    }

    async fn list_recent_logs(&self, limit: i64) -> Result<Vec<LogEntry>, AppError> {
        let tables = self.tables.lock().await;
        Self::check_reads(&tables)?;
        // Inverte antes de ordenar: empates de horário ficam do mais novo ao mais antigo
        let mut logs: Vec<LogEntry> = tables.logs.iter().rev().cloned().collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        logs.truncate(limit.max(0) as usize);
        Ok(logs)
    }

    async fn insert_items(&self, items: &[ItemFields]) -> Result<Vec<Item>, AppError> {
        let mut tables = self.tables.lock().await;
        Self::check_item_writes(&tables)?;
        for fields in items {
            Self::check_total(fields.total)?;
        }

        let inserted: Vec<Item> = items
            .iter()
            .map(|fields| Item {
                id: Uuid::new_v4(),
                category: fields.category.clone(),
                name: fields.name.clone(),
                spec: fields.spec.clone(),
                serial: fields.serial.clone(),
                total: fields.total,
                location: fields.location,
                manager: fields.manager.clone(),
                note: fields.note.clone(),
                created_at: Utc::now(),
            })
            .collect();
        tables.items.extend(inserted.iter().cloned());
        drop(tables);

        if !inserted.is_empty() {
            self.notify(Collection::Items, ChangeKind::Insert);
        }
        Ok(inserted)
    }

    async fn update_item(&self, id: Uuid, fields: &ItemFields) -> Result<Item, AppError> {
        let mut tables = self.tables.lock().await;
        Self::check_item_writes(&tables)?;
        Self::check_total(fields.total)?;

        let item = tables
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(AppError::ItemNotFound(id))?;
        item.category = fields.category.clone();
        item.name = fields.name.clone();
        item.spec = fields.spec.clone();
        item.serial = fields.serial.clone();
        item.total = fields.total;
        item.location = fields.location;
        item.manager = fields.manager.clone();
        item.note = fields.note.clone();
        let updated = item.clone();
        drop(tables);

        self.notify(Collection::Items, ChangeKind::Update);
        Ok(updated)
    }

    async fn update_item_total(&self, id: Uuid, total: i32) -> Result<Item, AppError> {
        let mut tables = self.tables.lock().await;
        Self::check_item_writes(&tables)?;
        Self::check_total(total)?;

        let item = tables
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(AppError::ItemNotFound(id))?;
        item.total = total;
        let updated = item.clone();
        drop(tables);

        self.notify(Collection::Items, ChangeKind::Update);
        Ok(updated)
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        Self::check_item_writes(&tables)?;

        let before = tables.items.len();
        tables.items.retain(|item| item.id != id);
        if tables.items.len() == before {
            return Err(AppError::ItemNotFound(id));
        }
        drop(tables);

        self.notify(Collection::Items, ChangeKind::Delete);
        Ok(())
    }

    async fn insert_category(
        &self,
        fields: &CategoryFields,
        sort_order: i32,
    ) -> Result<Category, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.categories.iter().any(|c| c.name == fields.name) {
            return Err(AppError::CategoryNameAlreadyExists(fields.name.clone()));
        }

        let category = Category {
            id: Uuid::new_v4(),
            name: fields.name.clone(),
            icon: fields.icon.clone(),
            color: fields.color.clone(),
            sort_order,
        };
        tables.categories.push(category.clone());
        drop(tables);

        self.notify(Collection::Categories, ChangeKind::Insert);
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        fields: &CategoryFields,
    ) -> Result<CategoryUpdate, AppError> {
        let mut tables = self.tables.lock().await;
        if tables
            .categories
            .iter()
            .any(|c| c.id != id && c.name == fields.name)
        {
            return Err(AppError::CategoryNameAlreadyExists(fields.name.clone()));
        }

        let category = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::CategoryNotFound(id))?;
        let old_name = std::mem::replace(&mut category.name, fields.name.clone());
        category.icon = fields.icon.clone();
        category.color = fields.color.clone();
        let category = category.clone();

        // Cascata dentro do mesmo lock: ninguém vê o estado intermediário
        let mut renamed_items = 0;
        if old_name != fields.name {
            for item in tables.items.iter_mut().filter(|item| item.category == old_name) {
                item.category = fields.name.clone();
                renamed_items += 1;
            }
        }
        drop(tables);

        self.notify(Collection::Categories, ChangeKind::Update);
        if renamed_items > 0 {
            self.notify(Collection::Items, ChangeKind::Update);
        }
        Ok(CategoryUpdate { category, renamed_items })
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(AppError::CategoryNotFound(id));
        }
        drop(tables);

        self.notify(Collection::Categories, ChangeKind::Delete);
        Ok(())
    }

    async fn insert_log(&self, entry: &NewLogEntry) -> Result<LogEntry, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.faults.fail_log_writes {
            return Err(AppError::Storage("escrita de histórico indisponível".into()));
        }

        let log = LogEntry {
            id: Uuid::new_v4(),
            log_type: entry.log_type,
            manager: entry.manager.clone(),
            item_name: entry.item_name.clone(),
            detail: entry.detail.clone(),
            created_at: Utc::now(),
        };
        tables.logs.push(log.clone());
        drop(tables);

        self.notify(Collection::Logs, ChangeKind::Insert);
        Ok(log)
    }

    fn subscribe(&self, collection: Collection, filter: EventFilter) -> ChangeSubscription {
        ChangeSubscription::new(collection, filter, self.events.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::repository::Notification, models::inventory::Floor};

    fn fields(name: &str, category: &str, total: i32) -> ItemFields {
        ItemFields {
            category: category.to_string(),
            name: name.to_string(),
            total,
            location: Floor::Second,
            ..ItemFields::default()
        }
    }

    #[tokio::test]
    async fn rename_cascades_to_items() {
        let repo = MemoryInventoryRepository::new();
        let cable = repo
            .insert_category(&CategoryFields { name: "케이블".into(), ..Default::default() }, 0)
            .await
            .unwrap();
        repo.insert_items(&[fields("HDMI", "케이블", 5), fields("마우스", "입력장치", 2)])
            .await
            .unwrap();

        let update = repo
            .update_category(
                cable.id,
                &CategoryFields { name: "영상 케이블".into(), ..Default::default() },
            )
            .await
            .unwrap();

        assert_eq!(update.renamed_items, 1);
        let items = repo.list_items().await.unwrap();
        assert_eq!(items[0].category, "영상 케이블");
        assert_eq!(items[1].category, "입력장치");
    }

    #[tokio::test]
    async fn duplicate_category_names_are_rejected() {
        let repo = MemoryInventoryRepository::new();
        let name = CategoryFields { name: "케이블".into(), ..Default::default() };
        repo.insert_category(&name, 0).await.unwrap();

        let result = repo.insert_category(&name, 1).await;
        assert!(matches!(result, Err(AppError::CategoryNameAlreadyExists(_))));
    }

    #[tokio::test]
    async fn negative_totals_never_reach_the_table() {
        let repo = MemoryInventoryRepository::new();
        let item = repo.insert_items(&[fields("HDMI", "케이블", 1)]).await.unwrap().remove(0);

        assert!(repo.update_item_total(item.id, -1).await.is_err());
        assert_eq!(repo.list_items().await.unwrap()[0].total, 1);
    }

    #[tokio::test]
    async fn logs_come_back_newest_first_and_bounded() {
        let repo = MemoryInventoryRepository::new();
        for n in 0..5 {
            repo.insert_log(&NewLogEntry {
                log_type: crate::models::log::LogType::Inbound,
                manager: "이건".into(),
                item_name: format!("item-{n}"),
                detail: String::new(),
            })
            .await
            .unwrap();
        }

        let logs = repo.list_recent_logs(3).await.unwrap();
        let names: Vec<&str> = logs.iter().map(|l| l.item_name.as_str()).collect();
        assert_eq!(names, vec!["item-4", "item-3", "item-2"]);
    }

    #[tokio::test]
    async fn writes_publish_change_events() {
        let repo = MemoryInventoryRepository::new();
        let mut subscription = repo.subscribe(Collection::Items, EventFilter::All);

        repo.insert_items(&[fields("HDMI", "케이블", 1)]).await.unwrap();

        assert_eq!(
            subscription.next().await,
            Some(Notification::Changed(ChangeKind::Insert))
        );
    }
}
