// src/services/balance_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::{AppError, Entity},
    db::SharedStore,
    models::finance::{Transaction, TransactionFilter, TransactionType},
};

/// Saldo = saldo inicial + receitas pagas - despesas pagas.
///
/// Transações pendentes são ignoradas. Quem chama já entrega só as
/// transações da conta.
pub fn compute_balance<'a, I>(initial_balance: Decimal, transactions: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let (income, expense) = transactions
        .into_iter()
        .filter(|tx| tx.is_settled())
        .fold((Decimal::ZERO, Decimal::ZERO), |(income, expense), tx| match tx.kind {
            TransactionType::Income => (income + tx.amount, expense),
            TransactionType::Expense => (income, expense + tx.amount),
        });

    initial_balance + income - expense
}

/// Reconciliador de saldo: recalcula do zero, nunca aplica deltas.
#[derive(Clone)]
pub struct BalanceService {
    store: SharedStore,
}

impl BalanceService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Recalcula e grava o saldo da conta. Devolve o novo saldo.
    pub async fn reconcile(&self, owner_id: Uuid, account_id: Uuid) -> Result<Decimal, AppError> {
        let account = self
            .store
            .get_account(owner_id, account_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Account, account_id))?;

        let transactions = self
            .store
            .list_transactions(owner_id, &TransactionFilter::settled_for_account(account_id))
            .await?;

        let balance = compute_balance(account.initial_balance, &transactions);

        tracing::debug!(
            %account_id,
            initial = %account.initial_balance,
            settled = transactions.len(),
            %balance,
            "Recalculando saldo"
        );

        self.store
            .update_account_balance(owner_id, account_id, balance)
            .await?;

        Ok(balance)
    }
}
