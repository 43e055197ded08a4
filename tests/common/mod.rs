#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use finansaas::{
    common::events::ChangeNotifier,
    db::{FinanceStore, MemoryStore},
    models::finance::{
        Account, AccountType, Bill, BillKind, BillStatus, FundingSource, Transaction,
        TransactionStatus, TransactionType,
    },
    services::{AccountDetails, AuthService},
    AppState,
};

pub const JWT_SECRET: &str = "segredo-de-teste";
pub const JWT_AUDIENCE: &str = "authenticated";

pub fn money(raw: &str) -> Decimal {
    raw.parse().unwrap()
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub owner_id: Uuid,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::from_store(
            store.clone(),
            AuthService::new(JWT_SECRET.to_string(), JWT_AUDIENCE.to_string()),
            ChangeNotifier::new(32),
        );

        Self {
            store,
            state,
            owner_id: Uuid::new_v4(),
        }
    }

    pub async fn account(&self, initial_balance: &str) -> Account {
        let details = AccountDetails {
            name: "Conta Principal".to_string(),
            kind: AccountType::Checking,
            color: "#18181b".to_string(),
            icon: None,
            image_url: None,
        };

        self.state
            .account_service
            .create_account(self.owner_id, details, money(initial_balance))
            .await
            .unwrap()
    }

    pub async fn balance(&self, account_id: Uuid) -> Decimal {
        self.store
            .get_account(self.owner_id, account_id)
            .await
            .unwrap()
            .expect("conta deveria existir")
            .balance
    }

    pub async fn upsert(&self, tx: Transaction) -> Transaction {
        self.state
            .transaction_service
            .upsert(self.owner_id, tx)
            .await
            .unwrap()
    }

    pub async fn bill(&self, kind: BillKind, amount: &str, due_date: NaiveDate, funding: FundingSource) -> Bill {
        let bill = Bill {
            id: Uuid::new_v4(),
            owner_id: self.owner_id,
            kind,
            description: "Fornecedor XYZ".to_string(),
            amount: money(amount),
            due_date,
            status: BillStatus::Pending,
            funding,
            category_id: None,
            client_id: None,
            notes: None,
            transaction_id: None,
            created_at: Utc::now(),
        };

        self.state
            .bill_service
            .save_bill(self.owner_id, bill)
            .await
            .unwrap()
    }
}

pub fn transaction(
    kind: TransactionType,
    status: TransactionStatus,
    amount: &str,
    funding: FundingSource,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4(),
        owner_id: Uuid::nil(),
        kind,
        status,
        amount: money(amount),
        date: Utc::now(),
        description: "Lançamento".to_string(),
        funding,
        category_id: None,
        client_id: None,
        created_at: Utc::now(),
        installment: None,
    }
}

pub fn paid_income(amount: &str, account_id: Uuid) -> Transaction {
    transaction(
        TransactionType::Income,
        TransactionStatus::Paid,
        amount,
        FundingSource::Account(account_id),
    )
}

pub fn paid_expense(amount: &str, account_id: Uuid) -> Transaction {
    transaction(
        TransactionType::Expense,
        TransactionStatus::Paid,
        amount,
        FundingSource::Account(account_id),
    )
}
