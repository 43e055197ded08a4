// src/models/dashboard.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// Resumo do período (os cards do topo)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,

    pub current_balance: Decimal,    // Saldo somado de todas as contas
    pub income_period: Decimal,      // Receitas pagas no período
    pub expense_period: Decimal,     // Despesas pagas no período
    pub receivable_pending: Decimal, // A receber em aberto (pendente + atrasado)
    pub payable_pending: Decimal,    // A pagar em aberto (pendente + atrasado)

    pub payables_overdue: usize,
    pub payables_due_next_7_days: usize,
    pub payables_due_next_30_days: usize,
}
