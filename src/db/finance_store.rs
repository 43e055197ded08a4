// src/db/finance_store.rs

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{Account, Bill, BillStatus, Transaction, TransactionFilter},
};

pub type SharedStore = Arc<dyn FinanceStore>;

/// Gateway de persistência das coleções financeiras.
///
/// Toda operação recebe o `owner_id` do chamador autenticado e só enxerga
/// registros desse dono. Lookups devolvem `Ok(None)` quando o registro não
/// existe; escritas por id em registros ausentes devolvem `AppError::NotFound`.
#[async_trait]
pub trait FinanceStore: Send + Sync {
    // =========================================================================
    //  CONTAS
    // =========================================================================

    async fn get_account(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Account>, AppError>;

    async fn list_accounts(&self, owner_id: Uuid) -> Result<Vec<Account>, AppError>;

    /// Grava uma conta nova, com o saldo inicial como saldo atual.
    async fn create_account(&self, owner_id: Uuid, account: &Account) -> Result<(), AppError>;

    /// Atualiza só os campos de apresentação (nome, tipo, cor, ícone e
    /// imagem). `balance` e `initial_balance` do registro recebido são
    /// ignorados: o saldo só muda via `update_account_balance`.
    async fn update_account_details(&self, owner_id: Uuid, account: &Account)
        -> Result<(), AppError>;

    /// Devolve `false` se não havia nada para apagar.
    async fn delete_account(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    async fn update_account_balance(
        &self,
        owner_id: Uuid,
        id: Uuid,
        balance: Decimal,
    ) -> Result<(), AppError>;

    // =========================================================================
    //  TRANSAÇÕES
    // =========================================================================

    async fn get_transaction(&self, owner_id: Uuid, id: Uuid)
        -> Result<Option<Transaction>, AppError>;

    /// Ordenadas por data, da mais recente para a mais antiga.
    async fn list_transactions(
        &self,
        owner_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError>;

    async fn upsert_transaction(&self, owner_id: Uuid, tx: &Transaction) -> Result<(), AppError>;

    async fn delete_transaction(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    // =========================================================================
    //  CONTAS A PAGAR / RECEBER
    // =========================================================================

    async fn get_bill(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Bill>, AppError>;

    /// Ordenadas por vencimento, da mais próxima para a mais distante.
    async fn list_bills(&self, owner_id: Uuid) -> Result<Vec<Bill>, AppError>;

    async fn upsert_bill(&self, owner_id: Uuid, bill: &Bill) -> Result<(), AppError>;

    /// Marca a conta como liquidada e grava o vínculo com a transação, mas
    /// somente se ela ainda estiver em aberto no momento da escrita.
    ///
    /// `NotFound` se a conta não existe; `InvalidState` se outra sessão já a
    /// liquidou.
    async fn mark_bill_settled(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: BillStatus,
        transaction_id: Uuid,
    ) -> Result<(), AppError>;

    async fn delete_bill(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError>;
}
