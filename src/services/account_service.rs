// src/services/account_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        error::{AppError, Entity},
        events::{ChangeKind, ChangeNotifier},
    },
    db::SharedStore,
    models::finance::{Account, AccountType},
    services::balance_service::BalanceService,
};

/// Campos que o usuário pode definir. Os saldos ficam de fora de
/// propósito: `initial_balance` só na criação, `balance` só pelo reconciliador.
#[derive(Debug, Clone)]
pub struct AccountDetails {
    pub name: String,
    pub kind: AccountType,
    pub color: String,
    pub icon: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    store: SharedStore,
    balance_service: BalanceService,
    notifier: ChangeNotifier,
}

impl AccountService {
    pub fn new(store: SharedStore, balance_service: BalanceService, notifier: ChangeNotifier) -> Self {
        Self {
            store,
            balance_service,
            notifier,
        }
    }

    pub async fn list_accounts(&self, owner_id: Uuid) -> Result<Vec<Account>, AppError> {
        self.store.list_accounts(owner_id).await
    }

    pub async fn get_account(&self, owner_id: Uuid, id: Uuid) -> Result<Account, AppError> {
        self.store
            .get_account(owner_id, id)
            .await?
            .ok_or(AppError::NotFound(Entity::Account, id))
    }

    /// No nascimento o saldo é igual ao saldo inicial.
    pub async fn create_account(
        &self,
        owner_id: Uuid,
        details: AccountDetails,
        initial_balance: Decimal,
    ) -> Result<Account, AppError> {
        let account = Account {
            id: Uuid::new_v4(),
            owner_id,
            name: details.name,
            kind: details.kind,
            initial_balance,
            balance: initial_balance,
            color: details.color,
            icon: details.icon,
            image_url: details.image_url,
            created_at: Utc::now(),
        };

        self.store.create_account(owner_id, &account).await?;
        tracing::info!(account_id = %account.id, "✅ Conta criada");

        self.notifier.publish(owner_id, ChangeKind::Accounts);
        Ok(account)
    }

    /// Edita os campos de apresentação. Os saldos gravados não são tocados,
    /// e a conta devolvida é relida do banco depois da escrita.
    pub async fn update_account(
        &self,
        owner_id: Uuid,
        id: Uuid,
        details: AccountDetails,
    ) -> Result<Account, AppError> {
        let current = self.get_account(owner_id, id).await?;

        let edited = Account {
            name: details.name,
            kind: details.kind,
            color: details.color,
            icon: details.icon,
            image_url: details.image_url,
            ..current
        };

        self.store.update_account_details(owner_id, &edited).await?;
        tracing::info!(account_id = %id, "Conta atualizada");

        self.notifier.publish(owner_id, ChangeKind::Accounts);
        self.get_account(owner_id, id).await
    }

    /// Apaga a conta. As transações vinculadas ficam como estão.
    pub async fn delete_account(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_account(owner_id, id).await? {
            return Err(AppError::NotFound(Entity::Account, id));
        }

        tracing::info!(account_id = %id, "Conta apagada");
        self.notifier.publish(owner_id, ChangeKind::Accounts);
        Ok(())
    }

    /// Reconciliação sob demanda; devolve a conta com o saldo recalculado.
    pub async fn reconcile(&self, owner_id: Uuid, id: Uuid) -> Result<Account, AppError> {
        let balance = self.balance_service.reconcile(owner_id, id).await?;
        self.notifier.publish(owner_id, ChangeKind::Accounts);

        let mut account = self.get_account(owner_id, id).await?;
        account.balance = balance;
        Ok(account)
    }
}
