// src/services/transaction_service.rs

use uuid::Uuid;

use crate::{
    common::{
        error::{AppError, Entity},
        events::{ChangeKind, ChangeNotifier},
    },
    db::SharedStore,
    models::finance::{Transaction, TransactionFilter},
    services::balance_service::BalanceService,
};

#[derive(Clone)]
pub struct TransactionService {
    store: SharedStore,
    balance_service: BalanceService,
    notifier: ChangeNotifier,
}

impl TransactionService {
    pub fn new(store: SharedStore, balance_service: BalanceService, notifier: ChangeNotifier) -> Self {
        Self {
            store,
            balance_service,
            notifier,
        }
    }

    pub async fn list_transactions(
        &self,
        owner_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        self.store.list_transactions(owner_id, filter).await
    }

    /// Cria ou edita uma transação e reconcilia as contas afetadas.
    ///
    /// Se a transação mudou de conta, a conta antiga também é reconciliada.
    /// Transações só de cartão não tocam em saldo nenhum.
    pub async fn upsert(&self, owner_id: Uuid, mut tx: Transaction) -> Result<Transaction, AppError> {
        tx.owner_id = owner_id;

        // 1. Estado anterior (para saber a conta antiga)
        let previous = self.store.get_transaction(owner_id, tx.id).await?;
        let previous_account = previous.as_ref().and_then(Transaction::account_id);
        if let Some(previous) = &previous {
            tx.created_at = previous.created_at;
        }

        // 2. Grava. Se falhar, nada mudou e não há o que reconciliar.
        self.store.upsert_transaction(owner_id, &tx).await?;

        tracing::info!(
            transaction_id = %tx.id,
            edit = previous.is_some(),
            "Transação gravada"
        );

        // 3. Conta atual
        let current_account = tx.account_id();
        if let Some(account_id) = current_account {
            self.balance_service.reconcile(owner_id, account_id).await?;
        }

        // 4. Conta anterior, se trocou
        if let Some(account_id) = previous_account {
            if current_account != Some(account_id) {
                self.balance_service.reconcile(owner_id, account_id).await?;
            }
        }

        self.notifier.publish(owner_id, ChangeKind::Transactions);
        Ok(tx)
    }

    /// Apaga a transação e reconcilia a conta a que estava vinculada.
    pub async fn remove(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let existing = self
            .store
            .get_transaction(owner_id, id)
            .await?
            .ok_or(AppError::NotFound(Entity::Transaction, id))?;

        if !self.store.delete_transaction(owner_id, id).await? {
            // Outra sessão apagou entre a leitura e o delete
            return Err(AppError::NotFound(Entity::Transaction, id));
        }

        tracing::info!(transaction_id = %id, "Transação apagada");

        if let Some(account_id) = existing.account_id() {
            self.balance_service.reconcile(owner_id, account_id).await?;
        }

        self.notifier.publish(owner_id, ChangeKind::Transactions);
        Ok(())
    }
}
