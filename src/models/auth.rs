// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identidade do dono autenticado. Todas as leituras e escritas
/// são escopadas por `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Option<String>,
}

// Estrutura de dados ("claims") dentro do JWT do provedor de autenticação
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    #[serde(default)]
    pub iat: Option<usize>, // Issued At (quando o token foi criado)
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}
