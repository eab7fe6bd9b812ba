// src/db/pg_repo.rs

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sqlx::{postgres::PgListener, PgPool, Postgres, QueryBuilder};
use tokio::sync::broadcast;
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

// Canal do LISTEN/NOTIFY alimentado pelos gatilhos da migração
pub const NOTIFY_CHANNEL: &str = "inventory_changes";

const ITEM_COLUMNS: &str =
    "id, category, name, spec, serial, total, location, manager, note, created_at";

// Corpo do pg_notify: {"table": "items", "op": "UPDATE"}
#[derive(Debug, Deserialize)]
struct NotifyPayload {
    table: String,
    op: String,
}

impl NotifyPayload {
    fn into_event(self) -> Option<ChangeEvent> {
        Some(ChangeEvent {
            collection: Collection::from_table(&self.table)?,
            kind: ChangeKind::from_operation(&self.op)?,
        })
    }
}

fn forward_notification(sender: &broadcast::Sender<ChangeEvent>, payload: &str) {
    match serde_json::from_str::<NotifyPayload>(payload) {
        Ok(parsed) => {
            if let Some(event) = parsed.into_event() {
                let _ = sender.send(event);
            }
        }
        Err(e) => tracing::warn!("Notificação ignorada ({}): {}", e, payload),
    }
}

// Inscritos recarregam todas as coleções
fn send_resync(sender: &broadcast::Sender<ChangeEvent>) {
    for event in ChangeEvent::resync_all() {
        let _ = sender.send(event);
    }
}

#[derive(Clone)]
pub struct PgInventoryRepository {
    pool: PgPool,
    events: broadcast::Sender<ChangeEvent>,
}

impl PgInventoryRepository {
    /// Conecta o ouvinte de notificações e repassa cada mudança para o canal
    /// de broadcast.
    pub async fn new(pool: PgPool) -> Result<Self, AppError> {
        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;
        tracing::info!("✅ Escutando mudanças em tempo real no canal '{}'", NOTIFY_CHANNEL);

        let sender = events.clone();
        tokio::spawn(async move {
            loop {
                match listener.try_recv().await {
                    Ok(Some(notification)) => forward_notification(&sender, notification.payload()),
                    Ok(None) => {
                        // Conexão perdida: reconecta na próxima chamada, mas o que
                        // foi notificado nesse meio tempo não volta
                        tracing::warn!("🔌 Ouvinte de notificações desconectado, recarregando coleções");
                        send_resync(&sender);
                    }
                    Err(e) => {
                        tracing::warn!("🔥 Falha no ouvinte de notificações: {:?}", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        send_resync(&sender);
                    }
                }
            }
        });

        Ok(Self { pool, events })
    }

    fn map_category_error(e: sqlx::Error, name: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::CategoryNameAlreadyExists(name.to_string());
            }
        }
        e.into()
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn list_items(&self) -> Result<Vec<Item>, AppError> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, icon, color, sort_order FROM categories ORDER BY sort_order ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn list_recent_logs(&self, limit: i64) -> Result<Vec<LogEntry>, AppError> {
        let logs = sqlx::query_as::<_, LogEntry>(
            r#"
            SELECT id, type, manager, item_name, detail, created_at
            FROM logs
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }

    async fn insert_items(&self, items: &[ItemFields]) -> Result<Vec<Item>, AppError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        // Um único INSERT com várias linhas: o lote é atômico
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO items (id, category, name, spec, serial, total, location, manager, note) ",
        );
        builder.push_values(items, |mut row, fields| {
            row.push_bind(Uuid::new_v4())
                .push_bind(&fields.category)
                .push_bind(&fields.name)
                .push_bind(&fields.spec)
                .push_bind(&fields.serial)
                .push_bind(fields.total)
                .push_bind(fields.location)
                .push_bind(&fields.manager)
                .push_bind(&fields.note);
        });
        builder.push(format!(" RETURNING {ITEM_COLUMNS}"));

        let inserted = builder
            .build_query_as::<Item>()
            .fetch_all(&self.pool)
            .await?;
        Ok(inserted)
    }

    async fn update_item(&self, id: Uuid, fields: &ItemFields) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items
            SET category = $2, name = $3, spec = $4, serial = $5,
                total = $6, location = $7, manager = $8, note = $9
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&fields.category)
        .bind(&fields.name)
        .bind(&fields.spec)
        .bind(&fields.serial)
        .bind(fields.total)
        .bind(fields.location)
        .bind(&fields.manager)
        .bind(&fields.note)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ItemNotFound(id))
    }

    async fn update_item_total(&self, id: Uuid, total: i32) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(&format!(
            "UPDATE items SET total = $2 WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .bind(total)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::ItemNotFound(id))
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ItemNotFound(id));
        }
        Ok(())
    }

    async fn insert_category(
        &self,
        fields: &CategoryFields,
        sort_order: i32,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, icon, color, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, icon, color, sort_order
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(&fields.icon)
        .bind(&fields.color)
        .bind(sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_category_error(e, &fields.name))
    }

    async fn update_category(
        &self,
        id: Uuid,
        fields: &CategoryFields,
    ) -> Result<CategoryUpdate, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava a linha para que o nome antigo não mude durante a cascata
        let old_name: String =
            sqlx::query_scalar("SELECT name FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(AppError::CategoryNotFound(id))?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET name = $2, icon = $3, color = $4
            WHERE id = $1
            RETURNING id, name, icon, color, sort_order
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.icon)
        .bind(&fields.color)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_category_error(e, &fields.name))?;

        let renamed_items = if old_name != fields.name {
            sqlx::query("UPDATE items SET category = $1 WHERE category = $2")
                .bind(&fields.name)
                .bind(&old_name)
                .execute(&mut *tx)
                .await?
                .rows_affected()
        } else {
            0
        };

        // Se algo falhar acima, o drop do `tx` faz o rollback
        tx.commit().await?;
        Ok(CategoryUpdate { category, renamed_items })
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::CategoryNotFound(id));
        }
        Ok(())
    }

    async fn insert_log(&self, entry: &NewLogEntry) -> Result<LogEntry, AppError> {
        let log = sqlx::query_as::<_, LogEntry>(
            r#"
            INSERT INTO logs (id, type, manager, item_name, detail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, type, manager, item_name, detail, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry.log_type)
        .bind(&entry.manager)
        .bind(&entry.item_name)
        .bind(&entry.detail)
        .fetch_one(&self.pool)
        .await?;
        Ok(log)
    }

    fn subscribe(&self, collection: Collection, filter: EventFilter) -> ChangeSubscription {
        ChangeSubscription::new(collection, filter, self.events.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_payload_maps_to_change_event() {
        let payload: NotifyPayload =
            serde_json::from_str(r#"{"table":"categories","op":"DELETE"}"#).unwrap();
        assert_eq!(
            payload.into_event(),
            Some(ChangeEvent { collection: Collection::Categories, kind: ChangeKind::Delete })
        );
    }

    #[test]
    fn lost_connection_asks_every_collection_to_reload() {
        let (sender, mut receiver) = broadcast::channel(8);
        send_resync(&sender);

        let mut reloaded = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            assert_eq!(event.kind, ChangeKind::Resync);
            reloaded.push(event.collection);
        }
        assert_eq!(reloaded, Collection::ALL.to_vec());
    }

    #[test]
    fn malformed_notification_is_ignored() {
        let (sender, mut receiver) = broadcast::channel(8);
        forward_notification(&sender, "not json");
        forward_notification(&sender, r#"{"table":"items","op":"INSERT"}"#);

        assert_eq!(
            receiver.try_recv().unwrap(),
            ChangeEvent { collection: Collection::Items, kind: ChangeKind::Insert }
        );
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn notify_payload_for_unknown_table_is_dropped() {
        let payload: NotifyPayload =
            serde_json::from_str(r#"{"table":"users","op":"INSERT"}"#).unwrap();
        assert_eq!(payload.into_event(), None);
    }
}
