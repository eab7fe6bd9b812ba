// src/db/repository.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        inventory::{Category, CategoryFields, CategoryUpdate, Item, ItemFields},
        log::{LogEntry, NewLogEntry},
    },
};

// Quantos registros de histórico o cache mantém (mais recentes primeiro)
pub const RECENT_LOG_LIMIT: i64 = 500;

// Capacidade do canal de notificações em tempo real
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Items,
    Categories,
    Logs,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Items, Collection::Categories, Collection::Logs];

    pub fn table_name(&self) -> &'static str {
        match self {
            Collection::Items => "items",
            Collection::Categories => "categories",
            Collection::Logs => "logs",
        }
    }

    pub fn from_table(table: &str) -> Option<Self> {
        Collection::ALL
            .into_iter()
            .find(|collection| collection.table_name() == table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    // Mudanças podem ter se perdido (ex.: reconexão do ouvinte): recarregue tudo
    Resync,
}

impl ChangeKind {
    /// Converte o `TG_OP` de um gatilho do Postgres.
    pub fn from_operation(op: &str) -> Option<Self> {
        match op.to_ascii_uppercase().as_str() {
            "INSERT" => Some(ChangeKind::Insert),
            "UPDATE" => Some(ChangeKind::Update),
            "DELETE" => Some(ChangeKind::Delete),
            _ => None,
        }
    }
}

/// Filtro de evento de uma inscrição: `insert`, `update`, `delete` ou `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventFilter {
    #[default]
    All,
    Only(ChangeKind),
}

impl EventFilter {
    pub fn matches(&self, kind: ChangeKind) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(expected) => *expected == kind || kind == ChangeKind::Resync,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    /// Um evento `Resync` por coleção.
    pub fn resync_all() -> impl Iterator<Item = ChangeEvent> {
        Collection::ALL
            .into_iter()
            .map(|collection| ChangeEvent { collection, kind: ChangeKind::Resync })
    }
}

/// O que uma inscrição entrega. O conteúdo da mudança nunca é confiável:
/// quem recebe deve recarregar a coleção.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Changed(ChangeKind),
    // O receptor ficou para trás e perdeu `n` eventos
    Lagged(u64),
}

/// Inscrição em uma coleção, filtrada por tipo de evento.
pub struct ChangeSubscription {
    collection: Collection,
    filter: EventFilter,
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl ChangeSubscription {
    pub fn new(
        collection: Collection,
        filter: EventFilter,
        receiver: broadcast::Receiver<ChangeEvent>,
    ) -> Self {
        Self { collection, filter, receiver }
    }

    /// Espera a próxima notificação relevante. `None` quando o canal fecha.
    pub async fn next(&mut self) -> Option<Notification> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if event.collection == self.collection && self.filter.matches(event.kind) {
                        return Some(Notification::Changed(event.kind));
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    return Some(Notification::Lagged(missed));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// O colaborador de armazenamento: as três coleções (`items`, `categories`, `logs`)
/// e o canal de mudanças em tempo real.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Todos os itens, do mais antigo para o mais novo.
    async fn list_items(&self) -> Result<Vec<Item>, AppError>;

    /// Todas as categorias por `sort_order` crescente.
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;

    /// Os `limit` registros de histórico mais recentes, do mais novo ao mais antigo.
    async fn list_recent_logs(&self, limit: i64) -> Result<Vec<LogEntry>, AppError>;

    /// Insere um ou vários itens. O lote inteiro entra ou nada entra.
    async fn insert_items(&self, items: &[ItemFields]) -> Result<Vec<Item>, AppError>;

    async fn update_item(&self, id: Uuid, fields: &ItemFields) -> Result<Item, AppError>;

    async fn update_item_total(&self, id: Uuid, total: i32) -> Result<Item, AppError>;

    async fn delete_item(&self, id: Uuid) -> Result<(), AppError>;

    async fn insert_category(
        &self,
        fields: &CategoryFields,
        sort_order: i32,
    ) -> Result<Category, AppError>;

    /// Atualiza a categoria e, se o nome mudou, renomeia os itens que apontavam
    /// para o nome antigo. Uma única operação lógica.
    async fn update_category(
        &self,
        id: Uuid,
        fields: &CategoryFields,
    ) -> Result<CategoryUpdate, AppError>;

    async fn delete_category(&self, id: Uuid) -> Result<(), AppError>;

    async fn insert_log(&self, entry: &NewLogEntry) -> Result<LogEntry, AppError>;

    fn subscribe(&self, collection: Collection, filter: EventFilter) -> ChangeSubscription;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_filter_matches_its_kind_and_resync() {
        let filter = EventFilter::Only(ChangeKind::Insert);
        assert!(filter.matches(ChangeKind::Insert));
        assert!(!filter.matches(ChangeKind::Update));
        assert!(filter.matches(ChangeKind::Resync));
        assert!(EventFilter::All.matches(ChangeKind::Delete));
    }

    #[test]
    fn resync_covers_every_collection() {
        let collections: Vec<Collection> =
            ChangeEvent::resync_all().map(|event| event.collection).collect();
        assert_eq!(collections, Collection::ALL.to_vec());
    }

    #[test]
    fn collections_map_to_tables() {
        assert_eq!(Collection::from_table("logs"), Some(Collection::Logs));
        assert_eq!(Collection::from_table("users"), None);
        assert_eq!(ChangeKind::from_operation("UPDATE"), Some(ChangeKind::Update));
    }

    #[tokio::test]
    async fn subscription_skips_other_collections() {
        let (tx, rx) = broadcast::channel(8);
        let mut subscription = ChangeSubscription::new(Collection::Logs, EventFilter::All, rx);

        tx.send(ChangeEvent { collection: Collection::Items, kind: ChangeKind::Insert })
            .unwrap();
        tx.send(ChangeEvent { collection: Collection::Logs, kind: ChangeKind::Insert })
            .unwrap();

        assert_eq!(
            subscription.next().await,
            Some(Notification::Changed(ChangeKind::Insert))
        );
        drop(tx);
        assert_eq!(subscription.next().await, None);
    }
}
