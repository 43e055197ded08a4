// src/db/finance_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::{AppError, Entity},
    db::finance_store::FinanceStore,
    models::finance::{
        Account, Bill, BillKind, BillStatus, FundingSource, Installment, Transaction,
        TransactionFilter, TransactionStatus, TransactionType,
    },
};

const ACCOUNT_COLUMNS: &str =
    "id, user_id, name, type, initial_balance, balance, color, icon, image_url, created_at";

const TRANSACTION_COLUMNS: &str = "id, user_id, description, amount, type, status, date, \
     account_id, card_id, category_id, client_id, created_at, \
     is_installment, installment_id, current_installment, total_installments";

const BILL_COLUMNS: &str = "id, user_id, type, description, amount, due_date, status, \
     account_id, card_id, category_id, client_id, notes, transaction_id, created_at";

// --- Linhas do banco (colunas anuláveis -> tipos do domínio) ---

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    user_id: Uuid,
    description: String,
    amount: Decimal,
    #[sqlx(rename = "type")]
    kind: TransactionType,
    status: TransactionStatus,
    date: DateTime<Utc>,
    account_id: Option<Uuid>,
    card_id: Option<Uuid>,
    category_id: Option<Uuid>,
    client_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    is_installment: bool,
    installment_id: Option<Uuid>,
    current_installment: Option<i32>,
    total_installments: Option<i32>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = AppError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let installment = match (
            row.is_installment,
            row.installment_id,
            row.current_installment,
            row.total_installments,
        ) {
            (true, Some(group_id), Some(current), Some(total)) => Some(Installment {
                group_id,
                current,
                total,
            }),
            _ => None,
        };

        Ok(Transaction {
            id: row.id,
            owner_id: row.user_id,
            kind: row.kind,
            status: row.status,
            amount: row.amount,
            date: row.date,
            description: row.description,
            funding: FundingSource::from_columns(row.account_id, row.card_id)?,
            category_id: row.category_id,
            client_id: row.client_id,
            created_at: row.created_at,
            installment,
        })
    }
}

#[derive(Debug, FromRow)]
struct BillRow {
    id: Uuid,
    user_id: Uuid,
    #[sqlx(rename = "type")]
    kind: BillKind,
    description: String,
    amount: Decimal,
    due_date: NaiveDate,
    status: BillStatus,
    account_id: Option<Uuid>,
    card_id: Option<Uuid>,
    category_id: Option<Uuid>,
    client_id: Option<Uuid>,
    notes: Option<String>,
    transaction_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<BillRow> for Bill {
    type Error = AppError;

    fn try_from(row: BillRow) -> Result<Self, Self::Error> {
        Ok(Bill {
            id: row.id,
            owner_id: row.user_id,
            kind: row.kind,
            description: row.description,
            amount: row.amount,
            due_date: row.due_date,
            status: row.status,
            funding: FundingSource::from_columns(row.account_id, row.card_id)?,
            category_id: row.category_id,
            client_id: row.client_id,
            notes: row.notes,
            transaction_id: row.transaction_id,
            created_at: row.created_at,
        })
    }
}

/// Implementação do gateway sobre o Postgres.
///
/// Cada chamada roda numa transação curta que define `app.user_id`
/// para as políticas de RLS, além de filtrar por `user_id` explicitamente.
#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Abre uma transação com a "chave" RLS do dono.
    async fn scoped(&self, owner_id: Uuid) -> Result<sqlx::Transaction<'static, Postgres>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT set_config('app.user_id', $1, true)")
            .bind(owner_id.to_string())
            .execute(&mut *tx)
            .await?;

        Ok(tx)
    }
}

#[async_trait]
impl FinanceStore for FinanceRepository {
    // =========================================================================
    //  CONTAS BANCÁRIAS
    // =========================================================================

    async fn get_account(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Account>, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND user_id = $2"
        ))
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(account)
    }

    async fn list_accounts(&self, owner_id: Uuid) -> Result<Vec<Account>, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id = $1 ORDER BY created_at DESC"
        ))
            .bind(owner_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(accounts)
    }

    async fn create_account(&self, owner_id: Uuid, account: &Account) -> Result<(), AppError> {
        let mut tx = self.scoped(owner_id).await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, user_id, name, type, initial_balance, balance,
                color, icon, image_url, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
            .bind(account.id)
            .bind(owner_id)
            .bind(&account.name)
            .bind(account.kind)
            .bind(account.initial_balance)
            .bind(account.balance)
            .bind(&account.color)
            .bind(account.icon.as_deref())
            .bind(account.image_url.as_deref())
            .bind(account.created_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_account_details(
        &self,
        owner_id: Uuid,
        account: &Account,
    ) -> Result<(), AppError> {
        let mut tx = self.scoped(owner_id).await?;

        // Saldos ficam de fora: uma leitura antiga não pode desfazer uma reconciliação
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET name = $3, type = $4, color = $5, icon = $6, image_url = $7
            WHERE id = $1 AND user_id = $2
            "#,
        )
            .bind(account.id)
            .bind(owner_id)
            .bind(&account.name)
            .bind(account.kind)
            .bind(&account.color)
            .bind(account.icon.as_deref())
            .bind(account.image_url.as_deref())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(Entity::Account, account.id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_account(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let result = sqlx::query("DELETE FROM accounts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_account_balance(
        &self,
        owner_id: Uuid,
        id: Uuid,
        balance: Decimal,
    ) -> Result<(), AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let result = sqlx::query("UPDATE accounts SET balance = $3 WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .bind(balance)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(Entity::Account, id));
        }

        tx.commit().await?;
        Ok(())
    }

    // =========================================================================
    //  TRANSAÇÕES
    // =========================================================================

    async fn get_transaction(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Transaction>, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 AND user_id = $2"
        ))
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        row.map(Transaction::try_from).transpose()
    }

    async fn list_transactions(
        &self,
        owner_id: Uuid,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = "
        ));
        query.push_bind(owner_id);

        if let Some(account_id) = filter.account_id {
            query.push(" AND account_id = ").push_bind(account_id);
        }
        if let Some(card_id) = filter.card_id {
            query.push(" AND card_id = ").push_bind(card_id);
        }
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(kind) = filter.kind {
            query.push(" AND type = ").push_bind(kind);
        }
        if let Some(from) = filter.from {
            query.push(" AND date >= ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND date <= ").push_bind(to);
        }
        query.push(" ORDER BY date DESC");

        let rows = query
            .build_query_as::<TransactionRow>()
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    async fn upsert_transaction(&self, owner_id: Uuid, record: &Transaction) -> Result<(), AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let installment = record.installment;
        let result = sqlx::query(
            r#"
            INSERT INTO transactions (
                id, user_id, description, amount, type, status, date,
                account_id, card_id, category_id, client_id, created_at,
                is_installment, installment_id, current_installment, total_installments
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                description = EXCLUDED.description,
                amount = EXCLUDED.amount,
                type = EXCLUDED.type,
                status = EXCLUDED.status,
                date = EXCLUDED.date,
                account_id = EXCLUDED.account_id,
                card_id = EXCLUDED.card_id,
                category_id = EXCLUDED.category_id,
                client_id = EXCLUDED.client_id,
                is_installment = EXCLUDED.is_installment,
                installment_id = EXCLUDED.installment_id,
                current_installment = EXCLUDED.current_installment,
                total_installments = EXCLUDED.total_installments
            WHERE transactions.user_id = EXCLUDED.user_id
            "#,
        )
            .bind(record.id)
            .bind(owner_id)
            .bind(&record.description)
            .bind(record.amount)
            .bind(record.kind)
            .bind(record.status)
            .bind(record.date)
            .bind(record.funding.account_id())
            .bind(record.funding.card_id())
            .bind(record.category_id)
            .bind(record.client_id)
            .bind(record.created_at)
            .bind(installment.is_some())
            .bind(installment.map(|i| i.group_id))
            .bind(installment.map(|i| i.current))
            .bind(installment.map(|i| i.total))
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(Entity::Transaction, record.id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_transaction(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  TÍTULOS (Contas a Pagar / Receber)
    // =========================================================================

    async fn get_bill(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Bill>, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let row = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE id = $1 AND user_id = $2"
        ))
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        row.map(Bill::try_from).transpose()
    }

    async fn list_bills(&self, owner_id: Uuid) -> Result<Vec<Bill>, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let rows = sqlx::query_as::<_, BillRow>(&format!(
            "SELECT {BILL_COLUMNS} FROM bills WHERE user_id = $1 ORDER BY due_date ASC"
        ))
            .bind(owner_id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        rows.into_iter().map(Bill::try_from).collect()
    }

    async fn upsert_bill(&self, owner_id: Uuid, bill: &Bill) -> Result<(), AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO bills (
                id, user_id, type, description, amount, due_date, status,
                account_id, card_id, category_id, client_id, notes,
                transaction_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                type = EXCLUDED.type,
                description = EXCLUDED.description,
                amount = EXCLUDED.amount,
                due_date = EXCLUDED.due_date,
                status = EXCLUDED.status,
                account_id = EXCLUDED.account_id,
                card_id = EXCLUDED.card_id,
                category_id = EXCLUDED.category_id,
                client_id = EXCLUDED.client_id,
                notes = EXCLUDED.notes,
                transaction_id = EXCLUDED.transaction_id
            WHERE bills.user_id = EXCLUDED.user_id
            "#,
        )
            .bind(bill.id)
            .bind(owner_id)
            .bind(bill.kind)
            .bind(&bill.description)
            .bind(bill.amount)
            .bind(bill.due_date)
            .bind(bill.status)
            .bind(bill.funding.account_id())
            .bind(bill.funding.card_id())
            .bind(bill.category_id)
            .bind(bill.client_id)
            .bind(bill.notes.as_deref())
            .bind(bill.transaction_id)
            .bind(bill.created_at)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(Entity::Bill, bill.id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn mark_bill_settled(
        &self,
        owner_id: Uuid,
        id: Uuid,
        status: BillStatus,
        transaction_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.scoped(owner_id).await?;

        // Escrita condicional: duas sessões liquidando a mesma conta não
        // conseguem ambas passar por aqui.
        let result = sqlx::query(
            r#"
            UPDATE bills
            SET status = $3, transaction_id = $4
            WHERE id = $1 AND user_id = $2 AND status IN ('pendente', 'atrasado')
            "#,
        )
            .bind(id)
            .bind(owner_id)
            .bind(status)
            .bind(transaction_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            let current = sqlx::query_scalar::<_, BillStatus>(
                "SELECT status FROM bills WHERE id = $1 AND user_id = $2",
            )
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await?;

            return Err(match current {
                None => AppError::NotFound(Entity::Bill, id),
                Some(current) => AppError::InvalidState(format!(
                    "a conta {id} já está liquidada ({current:?})"
                )),
            });
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_bill(&self, owner_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.scoped(owner_id).await?;

        let result = sqlx::query("DELETE FROM bills WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
