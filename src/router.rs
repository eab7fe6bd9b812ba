// src/router.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::gate::gate_guard};

/// Monta o roteador completo: documentação, rotas públicas do portão e as
/// rotas de inventário atrás do `gate_guard`.
pub fn app(app_state: AppState) -> Router {
    // Rotas do portão (públicas)
    let session_routes = Router::new()
        .route("/", get(handlers::session::status))
        .route("/unlock", post(handlers::session::unlock))
        .route("/lock", post(handlers::session::lock));

    // Tudo abaixo exige a sessão desbloqueada
    let inventory_routes = Router::new()
        .route(
            "/items",
            post(handlers::inventory::create_item).get(handlers::inventory::list_items),
        )
        .route(
            "/items/{id}",
            put(handlers::inventory::update_item).delete(handlers::inventory::delete_item),
        )
        .route("/items/{id}/outbound", post(handlers::inventory::outbound_item))
        .route(
            "/items/{id}/outbound-preview",
            get(handlers::inventory::outbound_preview),
        )
        .route("/items/import", post(handlers::spreadsheet::import_items))
        .route(
            "/categories",
            post(handlers::categories::create_category)
                .get(handlers::categories::list_categories),
        )
        .route(
            "/categories/{id}",
            put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        .route("/options", get(handlers::categories::form_options))
        .route("/logs", get(handlers::logs::list_logs))
        .route("/dashboard", get(handlers::logs::dashboard))
        .route("/dashboard/floors", get(handlers::logs::floor_breakdown))
        .route("/export/{sheet}", get(handlers::spreadsheet::export_sheet))
        // Precisa ficar depois de todas as rotas protegidas
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            gate_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/session", session_routes)
        .nest("/api", inventory_routes)
        .with_state(app_state)
}
