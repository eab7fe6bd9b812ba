// src/services/inventory_service.rs

use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{Collection, InventoryRepository},
    models::{
        inventory::{
            Category, CategoryFields, DeleteRequest, Item, ItemFields, OutboundRequest,
        },
        log::NewLogEntry,
    },
    services::{audit, inventory_store::InventoryStore},
};

/// Motor de mutações: valida, grava, registra no histórico e recarrega o cache.
///
/// Cada operação é uma escrita principal seguida de exatamente uma escrita de
/// histórico. Se a principal falha, nada é registrado. Se o histórico falha,
/// a operação continua valendo.
#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
    store: InventoryStore,
    // Um escritor lógico por processo
    write_lock: Arc<Mutex<()>>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepository>, store: InventoryStore) -> Self {
        Self {
            repo,
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    async fn append_log(&self, entry: NewLogEntry) {
        if let Err(e) = self.repo.insert_log(&entry).await {
            tracing::warn!(
                "Histórico não gravado ({} / {}): {}",
                entry.log_type,
                entry.item_name,
                e
            );
        }
    }

    async fn cached_item(&self, id: Uuid) -> Result<Item, AppError> {
        self.store.item(id).await.ok_or(AppError::ItemNotFound(id))
    }

    // --- ENTRADA (cadastro) ---
    pub async fn register_item(&self, fields: ItemFields) -> Result<Item, AppError> {
        fields.validate()?;
        let _guard = self.write_lock.lock().await;

        let item = self
            .repo
            .insert_items(std::slice::from_ref(&fields))
            .await?
            .pop()
            .ok_or_else(|| AppError::Storage("inserção não retornou o item".into()))?;

        self.append_log(audit::inbound_entry(&fields)).await;
        tracing::info!("📦 Entrada: {} ({}개, {})", item.name, item.total, item.location);

        self.store.refresh(&[Collection::Items, Collection::Logs]).await;
        Ok(item)
    }

    // --- EDIÇÃO ---
    pub async fn edit_item(&self, id: Uuid, fields: ItemFields) -> Result<Item, AppError> {
        fields.validate()?;
        let _guard = self.write_lock.lock().await;

        // O "antes" vem do cache, como a tela o mostrava
        let before = self.cached_item(id).await?;
        let item = self.repo.update_item(id, &fields).await?;

        self.append_log(audit::edit_entry(&before, &fields)).await;
        tracing::info!("✏️ Edição: {}", item.name);

        self.store.refresh(&[Collection::Items, Collection::Logs]).await;
        Ok(item)
    }

    // --- SAÍDA ---
    pub async fn outbound(&self, id: Uuid, request: OutboundRequest) -> Result<Item, AppError> {
        let _guard = self.write_lock.lock().await;

        let item = self.cached_item(id).await?;
        // Não confia no ajuste feito pelo formulário
        if request.quantity <= 0 || request.quantity > item.total {
            return Err(AppError::InvalidQuantity {
                requested: request.quantity,
                available: item.total,
            });
        }

        let remaining = item.total - request.quantity;
        let updated = self.repo.update_item_total(id, remaining).await?;

        self.append_log(audit::outbound_entry(&item, &request, remaining)).await;
        tracing::info!(
            "🚚 Saída: {} -{} (restam {})",
            item.name,
            request.quantity,
            remaining
        );

        self.store.refresh(&[Collection::Items, Collection::Logs]).await;
        Ok(updated)
    }

    // --- EXCLUSÃO ---
    pub async fn delete_item(&self, id: Uuid, request: DeleteRequest) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let item = self.cached_item(id).await?;
        self.repo.delete_item(id).await?;

        self.append_log(audit::delete_entry(&item, &request)).await;
        tracing::info!("🗑️ Exclusão: {} ({})", item.name, request.reason);

        self.store.refresh(&[Collection::Items, Collection::Logs]).await;
        Ok(())
    }

    // --- IMPORTAÇÃO EM LOTE ---
    pub async fn import_items(
        &self,
        file_name: &str,
        rows: Vec<ItemFields>,
    ) -> Result<Vec<Item>, AppError> {
        if rows.is_empty() {
            return Err(AppError::EmptyImport);
        }
        let _guard = self.write_lock.lock().await;

        // Tudo ou nada: um único lote
        let inserted = self.repo.insert_items(&rows).await?;

        self.append_log(audit::upload_entry(file_name, inserted.len())).await;
        tracing::info!("📥 Importação de '{}': {} itens", file_name, inserted.len());

        self.store.refresh(&[Collection::Items, Collection::Logs]).await;
        Ok(inserted)
    }

    // ---
    // Categorias (sem histórico)
    // ---

    pub async fn add_category(&self, fields: CategoryFields) -> Result<Category, AppError> {
        fields.validate()?;
        let _guard = self.write_lock.lock().await;

        let existing = self.store.categories().await;
        let fields = fields.with_defaults(&existing);
        let sort_order = i32::try_from(existing.len()).unwrap_or(i32::MAX);

        let category = self.repo.insert_category(&fields, sort_order).await?;
        tracing::info!("🏷️ Categoria criada: {}", category.name);

        self.store.refresh(&[Collection::Categories]).await;
        Ok(category)
    }

    pub async fn edit_category(
        &self,
        id: Uuid,
        fields: CategoryFields,
    ) -> Result<Category, AppError> {
        fields.validate()?;
        let _guard = self.write_lock.lock().await;

        let existing = self.store.categories().await;
        let fields = fields.with_defaults(&existing);

        let update = self.repo.update_category(id, &fields).await?;
        if update.renamed_items > 0 {
            tracing::info!(
                "🏷️ Categoria renomeada para '{}' ({} itens atualizados)",
                update.category.name,
                update.renamed_items
            );
        }

        self.store.refresh(&[Collection::Categories, Collection::Items]).await;
        Ok(update.category)
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        let _guard = self.write_lock.lock().await;

        let category = self
            .store
            .category(id)
            .await
            .ok_or(AppError::CategoryNotFound(id))?;

        // Rejeita antes de qualquer escrita
        let count = self.store.items_in_category(&category.name).await;
        if count > 0 {
            return Err(AppError::CategoryInUse { name: category.name, count });
        }

        self.repo.delete_category(id).await?;
        tracing::info!("🏷️ Categoria excluída: {}", category.name);

        self.store.refresh(&[Collection::Categories]).await;
        Ok(())
    }
}
