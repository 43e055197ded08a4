// src/services/dashboard_service.rs

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SharedStore,
    models::{
        dashboard::DashboardSummary,
        finance::{
            Account, Bill, BillKind, Transaction, TransactionFilter, TransactionStatus,
            TransactionType,
        },
    },
    services::bill_service::derive_display_status,
};

/// Primeiro e último dia do mês de `date`.
pub fn month_bounds(date: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
    let start = date
        .with_day(1)
        .ok_or_else(|| anyhow::anyhow!("data sem dia 1: {date}"))?;
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| anyhow::anyhow!("fim de mês fora do calendário: {date}"))?;

    Ok((start, end))
}

/// Agrega os números do painel a partir de um retrato das coleções.
pub fn summarize(
    accounts: &[Account],
    transactions: &[Transaction],
    bills: &[Bill],
    (period_start, period_end): (NaiveDate, NaiveDate),
    as_of: DateTime<Utc>,
) -> DashboardSummary {
    let today = as_of.date_naive();
    let in_period = |date: NaiveDate| date >= period_start && date <= period_end;

    let current_balance: Decimal = accounts.iter().map(|a| a.balance).sum();

    let settled_in_period = |kind: TransactionType| -> Decimal {
        transactions
            .iter()
            .filter(|t| t.kind == kind && t.is_settled() && in_period(t.date.date_naive()))
            .map(|t| t.amount)
            .sum()
    };

    let open_bills: Vec<&Bill> = bills
        .iter()
        .filter(|b| derive_display_status(b, as_of).is_open())
        .collect();

    let open_total = |kind: BillKind| -> Decimal {
        open_bills
            .iter()
            .filter(|b| b.kind == kind)
            .map(|b| b.amount)
            .sum()
    };

    let days_until_due: Vec<i64> = open_bills
        .iter()
        .filter(|b| b.kind == BillKind::Payable)
        .map(|b| (b.due_date - today).num_days())
        .collect();

    DashboardSummary {
        period_start,
        period_end,
        current_balance,
        income_period: settled_in_period(TransactionType::Income),
        expense_period: settled_in_period(TransactionType::Expense),
        receivable_pending: open_total(BillKind::Receivable),
        payable_pending: open_total(BillKind::Payable),
        payables_overdue: days_until_due.iter().filter(|d| **d < 0).count(),
        payables_due_next_7_days: days_until_due.iter().filter(|d| (0..=7).contains(*d)).count(),
        payables_due_next_30_days: days_until_due.iter().filter(|d| (0..=30).contains(*d)).count(),
    }
}

#[derive(Clone)]
pub struct DashboardService {
    store: SharedStore,
}

impl DashboardService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Sem período explícito, usa o mês corrente.
    pub async fn get_summary(
        &self,
        owner_id: Uuid,
        period: Option<(NaiveDate, NaiveDate)>,
        as_of: DateTime<Utc>,
    ) -> Result<DashboardSummary, AppError> {
        let period = match period {
            Some(period) => period,
            None => month_bounds(as_of.date_naive())?,
        };

        let accounts = self.store.list_accounts(owner_id).await?;
        let filter = TransactionFilter {
            status: Some(TransactionStatus::Paid),
            ..TransactionFilter::default()
        };
        let transactions = self.store.list_transactions(owner_id, &filter).await?;
        let bills = self.store.list_bills(owner_id).await?;

        Ok(summarize(&accounts, &transactions, &bills, period, as_of))
    }
}
