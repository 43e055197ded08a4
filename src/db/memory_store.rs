// src/db/memory_store.rs

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::{AppError, Entity},
    db::finance_store::FinanceStore,
    models::finance::{Account, Bill, BillStatus, Transaction, TransactionFilter},
};

/// Operações do gateway que podem receber falha injetada.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    UpdateAccountBalance,
    UpsertTransaction,
    DeleteTransaction,
    MarkBillSettled,
}

#[derive(Default)]
struct State {
    accounts: HashMap<Uuid, Account>,
    transactions: HashMap<Uuid, Transaction>,
    bills: HashMap<Uuid, Bill>,
    failures: HashSet<StoreOp>,
}

impl State {
    /// Consome a falha injetada para `op`, se houver.
    fn check(&mut self, op: StoreOp) -> Result<(), AppError> {
        if self.failures.remove(&op) {
            tracing::debug!(?op, "Falha injetada disparada");
            return Err(AppError::PersistenceFailure(format!("falha injetada em {op:?}")));
        }
        Ok(())
    }
}

/// Gateway em memória, com o mesmo contrato do Postgres.
///
/// Usado pelos testes e para rodar o servidor sem banco.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A próxima chamada de `op` falha com `PersistenceFailure`. Só uma vez.
    pub async fn fail_next(&self, op: StoreOp) {
        self.state.lock().await.failures.insert(op);
    }

    pub async fn transaction_count(&self) -> usize {
        self.state.lock().await.transactions.len()
    }
}

#[async_trait]
impl FinanceStore for MemoryStore {
    async fn get_account(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Account>, AppError> {
        let state = self.state.lock().await;

        Ok(state.accounts.get(&id).filter(|a| a.owner_id == owner_id).cloned())
    }

    async fn list_accounts(&self, owner_id: Uuid) -> Result<Vec<Account>, AppError> {
        let state = self.state.lock().await;

        let mut accounts: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| a.owner_id == owner_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(accounts)
    }

    async fn create_account(&self, owner_id: Uuid, account: &Account) -> Result<(), AppError> {
        let mut state = self.state.lock().await;

        if state.accounts.contains_key(&account.id) {
            return Err(AppError::PersistenceFailure(format!(
                "conta {} já existe",
                account.id
            )));
        }

        let mut stored = account.clone();
        stored.owner_id = owner_id;
        state.accounts.insert(stored.id, stored);
        Ok(())
    }

    async fn update_account_details(
        &self,
        owner_id: Uuid,
        account: &Account,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().await;

        match state.accounts.get_mut(&account.id) {
            Some(stored) if stored.owner_id == owner_id => {
                stored.name = account.name.clone();
                stored.kind = account.kind;
                stored.color = account.color.clone();
                stored.icon = account.icon.clone();
                stored.image_url = account.image_url.clone();
                Ok(())
            }
            _ => Err(AppError::NotFound(Entity::Account, account.id)),
        }
    }

    async fn delete_account(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;

        let owned = state.accounts.get(&id).is_some_and(|a| a.owner_id == owner_id);
        if owned {
            state.accounts.remove(&id);
        }
        Ok(owned)
    }

    async fn update_account_balance(
        &self,
        owner_id: Uuid,
        id: Uuid,
        balance: Decimal,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.check(StoreOp::UpdateAccountBalance)?;

        match state.accounts.get_mut(&id) {
            Some(account) if account.owner_id == owner_id => {
                account.balance = balance;
                Ok(())
            }
            _ => Err(AppError::NotFound(Entity::Account, id)),
        }
    }

    async fn get_transaction(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Transaction>, AppError> {
        let state = self.state.lock().await;

        Ok(state.transactions.get(&id).filter(|t| t.owner_id == owner_id).cloned())
    }

    async fn list_transactions(
        &self,
        owner_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let state = self.state.lock().await;

        let mut transactions: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| t.owner_id == owner_id && filter.matches(t))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(transactions)
    }

    async fn upsert_transaction(&self, owner_id: Uuid, tx: &Transaction) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.check(StoreOp::UpsertTransaction)?;

        if let Some(existing) = state.transactions.get(&tx.id) {
            if existing.owner_id != owner_id {
                return Err(AppError::NotFound(Entity::Transaction, tx.id));
            }
        }

        let mut stored = tx.clone();
        stored.owner_id = owner_id;
        state.transactions.insert(stored.id, stored);
        Ok(())
    }

    async fn delete_transaction(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        state.check(StoreOp::DeleteTransaction)?;

        let owned = state.transactions.get(&id).is_some_and(|t| t.owner_id == owner_id);
        if owned {
            state.transactions.remove(&id);
        }
        Ok(owned)
    }

    async fn get_bill(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Bill>, AppError> {
        let state = self.state.lock().await;

        Ok(state.bills.get(&id).filter(|b| b.owner_id == owner_id).cloned())
    }

    async fn list_bills(&self, owner_id: Uuid) -> Result<Vec<Bill>, AppError> {
        let state = self.state.lock().await;

        let mut bills: Vec<Bill> = state
            .bills
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect();
        bills.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Ok(bills)
    }

    async fn upsert_bill(&self, owner_id: Uuid, bill: &Bill) -> Result<(), AppError> {
        let mut state = self.state.lock().await;

        if let Some(existing) = state.bills.get(&bill.id) {
            if existing.owner_id != owner_id {
                return Err(AppError::NotFound(Entity::Bill, bill.id));
            }
        }

        let mut stored = bill.clone();
        stored.owner_id = owner_id;
        state.bills.insert(stored.id, stored);
        Ok(())
    }

    async fn mark_bill_settled(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: BillStatus,
        transaction_id: Uuid,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().await;
        state.check(StoreOp::MarkBillSettled)?;

        match state.bills.get_mut(&id) {
            Some(bill) if bill.owner_id == owner_id => {
                if bill.status.is_settled() {
                    return Err(AppError::InvalidState(format!(
                        "a conta {id} já está liquidada ({:?})",
                        bill.status
                    )));
                }
                bill.status = status;
                bill.transaction_id = Some(transaction_id);
                Ok(())
            }
            _ => Err(AppError::NotFound(Entity::Bill, id)),
        }
    }

    async fn delete_bill(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;

        let owned = state.bills.get(&id).is_some_and(|b| b.owner_id == owner_id);
        if owned {
            state.bills.remove(&id);
        }
        Ok(owned)
    }
}
