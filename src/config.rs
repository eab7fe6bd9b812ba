// src/config.rs

use crate::{
    db::{InventoryRepository, MemoryInventoryRepository, PgInventoryRepository},
    services::{
        FileSessionMarker, InventoryService, InventoryStore, SessionGate, SpreadsheetService,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::{env, path::PathBuf, sync::Arc, time::Duration};

// Senha de desenvolvimento. Nunca confie nela em produção.
pub const DEFAULT_APP_PASSWORD: &str = "2912";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub app_password: String,
    pub session_marker_path: PathBuf,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let app_password = env::var("APP_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("⚠️ APP_PASSWORD não definida, usando a senha padrão de desenvolvimento");
            DEFAULT_APP_PASSWORD.to_string()
        });

        let session_marker_path = env::var("SESSION_MARKER_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir().join("hw_auth"));

        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            app_password,
            session_marker_path,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub gate: SessionGate,
    pub store: InventoryStore,
    pub inventory_service: InventoryService,
    pub spreadsheet_service: SpreadsheetService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let repo: Arc<dyn InventoryRepository> = match &config.database_url {
            Some(database_url) => {
                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgInventoryRepository::new(db_pool).await?)
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL não definida, usando armazenamento em memória");
                Arc::new(MemoryInventoryRepository::new())
            }
        };

        let gate = SessionGate::new(
            config.app_password.clone(),
            Arc::new(FileSessionMarker::new(&config.session_marker_path)),
        );
        Ok(Self::with_repository(repo, gate))
    }

    /// Monta o gráfico de dependências sobre um repositório já pronto.
    pub fn with_repository(repo: Arc<dyn InventoryRepository>, gate: SessionGate) -> Self {
        let store = InventoryStore::new(repo.clone());
        let inventory_service = InventoryService::new(repo, store.clone());
        Self {
            gate,
            store,
            inventory_service,
            spreadsheet_service: SpreadsheetService::default(),
        }
    }
}
