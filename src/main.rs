//src/main.rs

use tokio::{net::TcpListener, sync::broadcast::error::RecvError};
use tracing_subscriber::EnvFilter;

use finansaas::{build_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG sobrescreve o padrão)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("finansaas=info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = Config::from_env()?;
    let (app_state, db_pool) = AppState::new(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Assinante de log do canal de mudanças
    let mut changes = app_state.notifier.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(event) => tracing::debug!(owner_id = %event.owner_id, kind = ?event.kind, "Mudança de domínio"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Assinante de mudanças atrasado");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
