// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::events::ChangeNotifier,
    db::{FinanceRepository, SharedStore},
    services::{
        AccountService, AuthService, BalanceService, BillService, DashboardService,
        TransactionService,
    },
};

/// Configuração lida do ambiente (e de um `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub notify_capacity: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let jwt_audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .context("BIND_ADDR inválido")?;
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", 5)?;
        let notify_capacity = parse_or("NOTIFY_CAPACITY", 64)?;

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_audience,
            bind_addr,
            db_max_connections,
            notify_capacity,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{key} inválido: {raw}")),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub notifier: ChangeNotifier,
    pub auth_service: AuthService,
    pub account_service: AccountService,
    pub transaction_service: TransactionService,
    pub bill_service: BillService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Conecta ao Postgres e monta os serviços sobre ele.
    pub async fn new(config: &Config) -> anyhow::Result<(Self, PgPool)> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let store: SharedStore = Arc::new(FinanceRepository::new(db_pool.clone()));
        let auth_service = AuthService::new(config.jwt_secret.clone(), config.jwt_audience.clone());
        let notifier = ChangeNotifier::new(config.notify_capacity);

        Ok((Self::from_store(store, auth_service, notifier), db_pool))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_store(store: SharedStore, auth_service: AuthService, notifier: ChangeNotifier) -> Self {
        let balance_service = BalanceService::new(store.clone());
        let transaction_service =
            TransactionService::new(store.clone(), balance_service.clone(), notifier.clone());
        let bill_service =
            BillService::new(store.clone(), transaction_service.clone(), notifier.clone());
        let account_service =
            AccountService::new(store.clone(), balance_service, notifier.clone());
        let dashboard_service = DashboardService::new(store);

        Self {
            notifier,
            auth_service,
            account_service,
            transaction_service,
            bill_service,
            dashboard_service,
        }
    }
}
