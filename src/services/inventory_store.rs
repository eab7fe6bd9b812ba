// src/services/inventory_store.rs

use std::sync::Arc;

use tokio::{
    sync::{Mutex, RwLock},
    task::JoinHandle,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Collection, EventFilter, InventoryRepository, Notification, RECENT_LOG_LIMIT},
    models::{
        inventory::{Category, Item, ItemView},
        log::LogEntry,
    },
};

#[derive(Debug, Default)]
struct Cache {
    items: Vec<Item>,
    categories: Vec<Category>,
    logs: Vec<LogEntry>,
    loaded: bool,
}

/// Espelho em memória das três coleções. Cada carga substitui a coleção
/// inteira; uma carga que falha mantém o valor anterior.
#[derive(Clone)]
pub struct InventoryStore {
    repo: Arc<dyn InventoryRepository>,
    cache: Arc<RwLock<Cache>>,
    subscriptions: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl InventoryStore {
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        Self {
            repo,
            cache: Arc::new(RwLock::new(Cache::default())),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    // ---
    // Cargas
    // ---

    pub async fn load_items(&self) -> Result<(), AppError> {
        let items = self.repo.list_items().await.inspect_err(|e| {
            tracing::warn!("Falha ao carregar itens, mantendo cache anterior: {}", e);
        })?;
        self.cache.write().await.items = items;
        Ok(())
    }

    pub async fn load_logs(&self) -> Result<(), AppError> {
        let logs = self
            .repo
            .list_recent_logs(RECENT_LOG_LIMIT)
            .await
            .inspect_err(|e| {
                tracing::warn!("Falha ao carregar histórico, mantendo cache anterior: {}", e);
            })?;
        self.cache.write().await.logs = logs;
        Ok(())
    }

    pub async fn load_categories(&self) -> Result<(), AppError> {
        let categories = self.repo.list_categories().await.inspect_err(|e| {
            tracing::warn!("Falha ao carregar categorias, mantendo cache anterior: {}", e);
        })?;
        self.cache.write().await.categories = categories;
        Ok(())
    }

    pub async fn load(&self, collection: Collection) -> Result<(), AppError> {
        match collection {
            Collection::Items => self.load_items().await,
            Collection::Categories => self.load_categories().await,
            Collection::Logs => self.load_logs().await,
        }
    }

    /// Carrega as três coleções em paralelo. Devolve o primeiro erro, mas só
    /// depois que todas terminaram.
    pub async fn load_all(&self) -> Result<(), AppError> {
        let (items, logs, categories) =
            tokio::join!(self.load_items(), self.load_logs(), self.load_categories());
        // Só conta como carregado se ao menos uma coleção veio
        if items.is_ok() || logs.is_ok() || categories.is_ok() {
            self.cache.write().await.loaded = true;
        }
        items.and(logs).and(categories)
    }

    /// Recarga sem propagar erro: o cache antigo continua valendo.
    pub async fn refresh(&self, collections: &[Collection]) {
        for collection in collections {
            let _ = self.load(*collection).await;
        }
    }

    // ---
    // Tempo real
    // ---

    /// Inscreve a coleção: cada notificação dispara uma recarga completa dela.
    pub fn subscribe(&self, collection: Collection) -> JoinHandle<()> {
        let mut subscription = self.repo.subscribe(collection, EventFilter::All);
        let store = self.clone();
        tokio::spawn(async move {
            while let Some(notification) = subscription.next().await {
                if let Notification::Lagged(missed) = notification {
                    tracing::debug!("Inscrição de {:?} perdeu {} eventos", collection, missed);
                }
                store.refresh(&[collection]).await;
            }
            tracing::debug!("Canal de mudanças de {:?} encerrado", collection);
        })
    }

    /// Chamado ao desbloquear: carga inicial e inscrição nas três coleções.
    pub async fn activate(&self) {
        let mut subscriptions = self.subscriptions.lock().await;
        if subscriptions.is_empty() {
            // Inscreve antes de carregar para não perder mudanças no meio
            for collection in Collection::ALL {
                subscriptions.push(self.subscribe(collection));
            }
        }
        drop(subscriptions);

        if let Err(e) = self.load_all().await {
            tracing::error!("Carga inicial incompleta: {}", e);
        } else {
            tracing::info!("✅ Coleções carregadas");
        }
    }

    /// Cancela as inscrições (ao bloquear a sessão).
    pub async fn deactivate(&self) {
        let mut subscriptions = self.subscriptions.lock().await;
        for handle in subscriptions.drain(..) {
            handle.abort();
        }
    }

    pub async fn active_subscriptions(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    // ---
    // Leitura
    // ---

    pub async fn is_loaded(&self) -> bool {
        self.cache.read().await.loaded
    }

    pub async fn items(&self) -> Vec<Item> {
        self.cache.read().await.items.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.cache.read().await.categories.clone()
    }

    pub async fn logs(&self) -> Vec<LogEntry> {
        self.cache.read().await.logs.clone()
    }

    pub async fn item(&self, id: Uuid) -> Option<Item> {
        self.cache
            .read()
            .await
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
    }

    pub async fn category(&self, id: Uuid) -> Option<Category> {
        self.cache
            .read()
            .await
            .categories
            .iter()
            .find(|category| category.id == id)
            .cloned()
    }

    /// Itens com o ícone e a cor da categoria já resolvidos.
    pub async fn item_views(&self, items: Vec<Item>) -> Vec<ItemView> {
        let cache = self.cache.read().await;
        items
            .into_iter()
            .map(|item| ItemView::new(item, &cache.categories))
            .collect()
    }

    pub async fn items_in_category(&self, name: &str) -> usize {
        self.cache
            .read()
            .await
            .items
            .iter()
            .filter(|item| item.category == name)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{Faults, MemoryInventoryRepository},
        models::inventory::{CategoryFields, ItemFields},
    };

    fn hdmi() -> ItemFields {
        ItemFields { name: "HDMI".into(), category: "케이블".into(), total: 5, ..Default::default() }
    }

    #[tokio::test]
    async fn load_all_fills_every_collection() {
        let repo = Arc::new(MemoryInventoryRepository::new());
        repo.insert_items(&[hdmi()]).await.unwrap();
        repo.insert_category(&CategoryFields { name: "케이블".into(), ..Default::default() }, 0)
            .await
            .unwrap();

        let store = InventoryStore::new(repo);
        assert!(!store.is_loaded().await);
        store.load_all().await.unwrap();

        assert!(store.is_loaded().await);
        assert_eq!(store.items().await.len(), 1);
        assert_eq!(store.categories().await.len(), 1);
        assert!(store.logs().await.is_empty());
    }

    #[tokio::test]
    async fn failed_load_keeps_stale_cache() {
        let repo = Arc::new(MemoryInventoryRepository::new());
        repo.insert_items(&[hdmi()]).await.unwrap();
        let store = InventoryStore::new(repo.clone());
        store.load_items().await.unwrap();

        repo.insert_items(&[hdmi()]).await.unwrap();
        repo.set_faults(Faults { fail_reads: true, ..Default::default() }).await;

        assert!(store.load_items().await.is_err());
        assert_eq!(store.items().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_category_gets_placeholder_display() {
        let repo = Arc::new(MemoryInventoryRepository::new());
        let store = InventoryStore::new(repo.clone());
        repo.insert_items(&[hdmi()]).await.unwrap();
        store.load_all().await.unwrap();

        let views = store.item_views(store.items().await).await;
        assert_eq!(views[0].category_icon, "📦");
        assert_eq!(views[0].category_color, "#94A3B8");
    }

    #[tokio::test]
    async fn load_all_with_every_read_failing_is_not_loaded() {
        let repo = Arc::new(MemoryInventoryRepository::new());
        repo.set_faults(Faults { fail_reads: true, ..Default::default() }).await;
        let store = InventoryStore::new(repo.clone());

        assert!(store.load_all().await.is_err());
        assert!(!store.is_loaded().await);

        repo.set_faults(Faults::default()).await;
        store.load_all().await.unwrap();
        assert!(store.is_loaded().await);
    }

    #[tokio::test]
    async fn deactivate_drops_all_subscriptions() {
        let store = InventoryStore::new(Arc::new(MemoryInventoryRepository::new()));
        store.activate().await;
        assert_eq!(store.active_subscriptions().await, 3);

        // Ativar de novo não duplica as inscrições
        store.activate().await;
        assert_eq!(store.active_subscriptions().await, 3);

        store.deactivate().await;
        assert_eq!(store.active_subscriptions().await, 0);
    }
}
