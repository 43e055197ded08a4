// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::finance::{
        Account, AccountType, Bill, BillFilter, BillKind, BillStatus, FundingSource,
        Installment, Transaction, TransactionFilter, TransactionStatus, TransactionType,
    },
    services::AccountDetails,
};

fn non_negative(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        let mut error = ValidationError::new("non_negative");
        error.message = Some("O valor não pode ser negativo".into());
        return Err(error);
    }
    Ok(())
}

// =============================================================================
//  ÁREA 1: CONTAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório"))]
    pub name: String,

    #[serde(rename = "type")]
    pub kind: AccountType,

    // Ignorado na edição: o saldo inicial é fixado na criação
    #[serde(default)]
    pub initial_balance: Decimal,

    #[validate(length(min = 1, message = "A cor é obrigatória"))]
    pub color: String,
    pub icon: Option<String>,
    pub image_url: Option<String>,
}

impl AccountPayload {
    fn into_details(self) -> (AccountDetails, Decimal) {
        let details = AccountDetails {
            name: self.name,
            kind: self.kind,
            color: self.color,
            icon: self.icon,
            image_url: self.image_url,
        };
        (details, self.initial_balance)
    }
}

// GET /api/accounts
#[utoipa::path(
    get,
    path = "/api/accounts",
    tag = "Contas",
    responses(
        (status = 200, description = "Contas do usuário", body = Vec<Account>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_accounts(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let accounts = app_state.account_service.list_accounts(user.id).await?;
    Ok((StatusCode::OK, Json(accounts)))
}

// POST /api/accounts
#[utoipa::path(
    post,
    path = "/api/accounts",
    tag = "Contas",
    request_body = AccountPayload,
    responses(
        (status = 201, description = "Conta criada", body = Account),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_account(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<AccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (details, initial_balance) = payload.into_details();
    let account = app_state
        .account_service
        .create_account(user.id, details, initial_balance)
        .await?;

    Ok((StatusCode::CREATED, Json(account)))
}

// PUT /api/accounts/{id}
#[utoipa::path(
    put,
    path = "/api/accounts/{id}",
    tag = "Contas",
    request_body = AccountPayload,
    responses(
        (status = 200, description = "Conta atualizada (saldos inalterados)", body = Account),
        (status = 404, description = "Conta não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_account(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AccountPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let (details, _) = payload.into_details();
    let account = app_state
        .account_service
        .update_account(user.id, id, details)
        .await?;

    Ok((StatusCode::OK, Json(account)))
}

// DELETE /api/accounts/{id}
#[utoipa::path(
    delete,
    path = "/api/accounts/{id}",
    tag = "Contas",
    responses(
        (status = 204, description = "Conta apagada"),
        (status = 404, description = "Conta não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_account(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.account_service.delete_account(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/accounts/{id}/reconcile
#[utoipa::path(
    post,
    path = "/api/accounts/{id}/reconcile",
    tag = "Contas",
    responses(
        (status = 200, description = "Saldo recalculado", body = Account),
        (status = 404, description = "Conta não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta")
    ),
    security(("api_jwt" = []))
)]
pub async fn reconcile_account(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let account = app_state.account_service.reconcile(user.id, id).await?;
    Ok((StatusCode::OK, Json(account)))
}

// =============================================================================
//  ÁREA 2: TRANSAÇÕES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    // Sem id = criação
    pub id: Option<Uuid>,

    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub status: TransactionStatus,

    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    pub date: DateTime<Utc>,

    #[validate(length(min = 1, message = "A descrição é obrigatória"))]
    pub description: String,

    #[serde(default)]
    pub funding: FundingSource,
    pub category_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub installment: Option<Installment>,
}

impl TransactionPayload {
    fn into_transaction(self, owner_id: Uuid) -> Transaction {
        Transaction {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            owner_id,
            kind: self.kind,
            status: self.status,
            amount: self.amount,
            date: self.date,
            description: self.description,
            funding: self.funding,
            category_id: self.category_id,
            client_id: self.client_id,
            created_at: Utc::now(),
            installment: self.installment,
        }
    }
}

// GET /api/transactions
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transações",
    responses(
        (status = 200, description = "Transações filtradas, mais recentes primeiro", body = Vec<Transaction>)
    ),
    params(TransactionFilter),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<TransactionFilter>,
) -> Result<impl IntoResponse, AppError> {
    let transactions = app_state
        .transaction_service
        .list_transactions(user.id, &filter)
        .await?;

    Ok((StatusCode::OK, Json(transactions)))
}

// PUT /api/transactions
#[utoipa::path(
    put,
    path = "/api/transactions",
    tag = "Transações",
    request_body = TransactionPayload,
    responses(
        (status = 200, description = "Transação gravada e saldos reconciliados", body = Transaction),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_transaction(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<TransactionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let transaction = app_state
        .transaction_service
        .upsert(user.id, payload.into_transaction(user.id))
        .await?;

    Ok((StatusCode::OK, Json(transaction)))
}

// DELETE /api/transactions/{id}
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    tag = "Transações",
    responses(
        (status = 204, description = "Transação apagada e saldo reconciliado"),
        (status = 404, description = "Transação não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da transação")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_transaction(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.transaction_service.remove(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: CONTAS A PAGAR / RECEBER
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BillPayload {
    pub id: Option<Uuid>,

    #[serde(rename = "type")]
    pub kind: BillKind,

    #[validate(length(min = 1, message = "A descrição é obrigatória"))]
    pub description: String,

    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    pub due_date: NaiveDate,

    #[serde(default = "default_bill_status")]
    pub status: BillStatus,

    #[serde(default)]
    pub funding: FundingSource,
    pub category_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub notes: Option<String>,
    pub transaction_id: Option<Uuid>,
}

fn default_bill_status() -> BillStatus {
    BillStatus::Pending
}

impl BillPayload {
    fn into_bill(self, owner_id: Uuid) -> Bill {
        Bill {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            owner_id,
            kind: self.kind,
            description: self.description,
            amount: self.amount,
            due_date: self.due_date,
            status: self.status,
            funding: self.funding,
            category_id: self.category_id,
            client_id: self.client_id,
            notes: self.notes,
            transaction_id: self.transaction_id,
            created_at: Utc::now(),
        }
    }
}

// GET /api/bills
#[utoipa::path(
    get,
    path = "/api/bills",
    tag = "Contas a Pagar/Receber",
    responses(
        (status = 200, description = "Contas com o status de exibição já derivado", body = Vec<Bill>)
    ),
    params(BillFilter),
    security(("api_jwt" = []))
)]
pub async fn list_bills(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(filter): Query<BillFilter>,
) -> Result<impl IntoResponse, AppError> {
    let bills = app_state.bill_service.list_bills(user.id, &filter).await?;
    Ok((StatusCode::OK, Json(bills)))
}

// PUT /api/bills
#[utoipa::path(
    put,
    path = "/api/bills",
    tag = "Contas a Pagar/Receber",
    request_body = BillPayload,
    responses(
        (status = 200, description = "Conta gravada", body = Bill),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Alteração proibida em conta liquidada")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_bill(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<BillPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let bill = app_state
        .bill_service
        .save_bill(user.id, payload.into_bill(user.id))
        .await?;

    Ok((StatusCode::OK, Json(bill)))
}

// DELETE /api/bills/{id}
#[utoipa::path(
    delete,
    path = "/api/bills/{id}",
    tag = "Contas a Pagar/Receber",
    responses(
        (status = 204, description = "Conta apagada"),
        (status = 404, description = "Conta não encontrada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta a pagar/receber")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bill(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.bill_service.delete_bill(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/bills/{id}/settle
#[utoipa::path(
    post,
    path = "/api/bills/{id}/settle",
    tag = "Contas a Pagar/Receber",
    responses(
        (status = 200, description = "Conta liquidada", body = Bill),
        (status = 404, description = "Conta não encontrada"),
        (status = 409, description = "Conta já liquidada")
    ),
    params(
        ("id" = Uuid, Path, description = "ID da conta a pagar/receber")
    ),
    security(("api_jwt" = []))
)]
pub async fn settle_bill(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bill = app_state.bill_service.settle(user.id, id).await?;
    Ok((StatusCode::OK, Json(bill)))
}
