//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use hw_inventory::{
    config::{AppState, Config},
    router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env();
    let app_state = AppState::new(&config).await?;

    // Sessão restaurada pelo marcador: já começa carregado e inscrito
    if app_state.gate.is_unlocked() {
        app_state.store.activate().await;
    }

    let app = router::app(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
