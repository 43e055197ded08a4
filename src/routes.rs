// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    let account_routes = Router::new()
        .route(
            "/",
            get(handlers::finance::list_accounts).post(handlers::finance::create_account),
        )
        .route(
            "/{id}",
            put(handlers::finance::update_account).delete(handlers::finance::delete_account),
        )
        .route("/{id}/reconcile", post(handlers::finance::reconcile_account));

    let transaction_routes = Router::new()
        .route(
            "/",
            get(handlers::finance::list_transactions).put(handlers::finance::upsert_transaction),
        )
        .route("/{id}", delete(handlers::finance::delete_transaction));

    let bill_routes = Router::new()
        .route(
            "/",
            get(handlers::finance::list_bills).put(handlers::finance::save_bill),
        )
        .route("/{id}", delete(handlers::finance::delete_bill))
        .route("/{id}/settle", post(handlers::finance::settle_bill));

    let dashboard_routes =
        Router::new().route("/summary", get(handlers::dashboard::get_summary));

    // Tudo abaixo de /api exige um token válido
    let protected = Router::new()
        .nest("/accounts", account_routes)
        .nest("/transactions", transaction_routes)
        .nest("/bills", bill_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .with_state(app_state)
}
