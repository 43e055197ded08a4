//! Núcleo financeiro do FinanSaaS: contas, transações e contas a pagar/receber.
//!
//! O saldo de cada conta é um cache derivado das transações pagas, mantido
//! pelo reconciliador (`services::balance_service`) a cada escrita. A
//! liquidação de uma conta a pagar/receber gera uma transação e passa pelo
//! mesmo fluxo. A camada HTTP (`routes`) é só a casca em volta disso.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use common::error::AppError;
pub use config::{AppState, Config};
pub use routes::build_router;
