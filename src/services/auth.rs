// src/services/auth.rs

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{Claims, CurrentUser},
};

/// Valida os tokens do provedor de autenticação hospedado (HS256).
///
/// A sessão é do provedor; aqui só se confirma assinatura, expiração e
/// audiência e se extrai a identidade do dono.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    audience: String,
}

impl AuthService {
    pub fn new(jwt_secret: String, audience: String) -> Self {
        Self { jwt_secret, audience }
    }

    pub fn validate_token(&self, token: &str) -> Result<CurrentUser, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("Token recusado: {}", e);
            AppError::SessionInvalid
        })?;

        Ok(token_data.claims.into())
    }

    /// Emite um token compatível com o do provedor (uso local e testes).
    pub fn create_token(
        &self,
        user_id: Uuid,
        email: Option<String>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp().max(0) as usize,
            iat: Some(now.timestamp().max(0) as usize),
            aud: self.audience.clone(),
            email,
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
