// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    models::dashboard::DashboardSummary,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct PeriodQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Resumo do período (padrão: mês corrente)", body = DashboardSummary),
        (status = 409, description = "Período incompleto ou invertido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<PeriodQuery>,
) -> Result<impl IntoResponse, AppError> {
    let period = match (query.from, query.to) {
        (Some(from), Some(to)) if from <= to => Some((from, to)),
        (None, None) => None,
        _ => {
            return Err(AppError::InvalidState(
                "informe 'from' e 'to' juntos, com 'from' <= 'to'".to_string(),
            ));
        }
    };

    let summary = app_state
        .dashboard_service
        .get_summary(user.id, period, Utc::now())
        .await?;

    Ok((StatusCode::OK, Json(summary)))
}
