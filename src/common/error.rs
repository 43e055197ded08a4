// src/common/error.rs

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

/// Entidades que podem aparecer num erro `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    Transaction,
    Bill,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Account => "Conta",
            Entity::Transaction => "Transação",
            Entity::Bill => "Conta a pagar/receber",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} {1} não encontrada")]
    NotFound(Entity, Uuid),

    /// Pré-condição violada (ex.: liquidar uma conta já liquidada).
    #[error("Estado inválido: {0}")]
    InvalidState(String),

    /// O banco recusou a leitura/escrita (rede, permissão, constraint).
    /// Não há retry automático.
    #[error("Falha de persistência: {0}")]
    PersistenceFailure(String),

    #[error("Sessão inválida ou expirada")]
    SessionInvalid,

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        if let Some(db_err) = value.as_database_error() {
            // 42501 = insufficient_privilege (inclui recusas de RLS)
            if db_err.code().as_deref() == Some("42501") {
                tracing::warn!("Acesso negado pelo banco: {}", db_err);
                return AppError::PersistenceFailure(format!("permissão negada: {db_err}"));
            }
        }
        tracing::error!("Erro de banco de dados não tratado: {}", value);
        AppError::PersistenceFailure(value.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(entity, id) => (
                StatusCode::NOT_FOUND,
                format!("{entity} {id} não encontrada."),
            ),
            AppError::InvalidState(reason) => (StatusCode::CONFLICT, reason),
            AppError::SessionInvalid => (
                StatusCode::UNAUTHORIZED,
                "Sessão inválida ou expirada. Faça login novamente.".to_string(),
            ),

            // Persistência, JWT e erros internos viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
