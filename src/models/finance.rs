// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "account_type")]
pub enum AccountType {
    #[serde(rename = "corrente")]
    #[sqlx(rename = "corrente")]
    Checking,
    #[serde(rename = "investimento")]
    #[sqlx(rename = "investimento")]
    Investment,
    #[serde(rename = "dinheiro")]
    #[sqlx(rename = "dinheiro")]
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_type")]
pub enum TransactionType {
    #[serde(rename = "receita")]
    #[sqlx(rename = "receita")]
    Income,
    #[serde(rename = "despesa")]
    #[sqlx(rename = "despesa")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transaction_status")]
pub enum TransactionStatus {
    #[serde(rename = "pago")]
    #[sqlx(rename = "pago")]
    Paid,
    #[serde(rename = "pendente")]
    #[sqlx(rename = "pendente")]
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "bill_type")]
pub enum BillKind {
    #[serde(rename = "receber")]
    #[sqlx(rename = "receber")]
    Receivable, // A Receber
    #[serde(rename = "pagar")]
    #[sqlx(rename = "pagar")]
    Payable, // A Pagar
}

impl BillKind {
    /// Status final de uma conta liquidada: receber -> recebido, pagar -> pago.
    pub fn settled_status(self) -> BillStatus {
        match self {
            BillKind::Receivable => BillStatus::Received,
            BillKind::Payable => BillStatus::Paid,
        }
    }

    /// Tipo da transação gerada na liquidação.
    pub fn transaction_type(self) -> TransactionType {
        match self {
            BillKind::Receivable => TransactionType::Income,
            BillKind::Payable => TransactionType::Expense,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "bill_status")]
pub enum BillStatus {
    #[serde(rename = "pendente")]
    #[sqlx(rename = "pendente")]
    Pending,
    #[serde(rename = "pago")]
    #[sqlx(rename = "pago")]
    Paid,
    #[serde(rename = "recebido")]
    #[sqlx(rename = "recebido")]
    Received,
    /// Só existe na leitura: nunca é gravado pelos serviços.
    #[serde(rename = "atrasado")]
    #[sqlx(rename = "atrasado")]
    Overdue,
}

impl BillStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, BillStatus::Paid | BillStatus::Received)
    }

    pub fn is_open(self) -> bool {
        !self.is_settled()
    }
}

// --- Vínculo de origem do dinheiro ---

/// Conta bancária OU cartão OU nada. Nunca os dois.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum FundingSource {
    #[default]
    None,
    Account(Uuid),
    Card(Uuid),
}

impl FundingSource {
    /// Monta a partir das duas colunas anuláveis do banco.
    pub fn from_columns(account_id: Option<Uuid>, card_id: Option<Uuid>) -> Result<Self, AppError> {
        match (account_id, card_id) {
            (None, None) => Ok(FundingSource::None),
            (Some(account_id), None) => Ok(FundingSource::Account(account_id)),
            (None, Some(card_id)) => Ok(FundingSource::Card(card_id)),
            (Some(account_id), Some(card_id)) => Err(AppError::PersistenceFailure(format!(
                "registro vinculado à conta {account_id} e ao cartão {card_id} ao mesmo tempo"
            ))),
        }
    }

    pub fn account_id(&self) -> Option<Uuid> {
        match self {
            FundingSource::Account(id) => Some(*id),
            _ => None,
        }
    }

    pub fn card_id(&self) -> Option<Uuid> {
        match self {
            FundingSource::Card(id) => Some(*id),
            _ => None,
        }
    }
}

// --- Structs ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,

    #[sqlx(rename = "user_id")]
    pub owner_id: Uuid,

    #[schema(example = "Conta Principal")]
    pub name: String,

    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: AccountType,

    // Base imutável definida na criação
    pub initial_balance: Decimal,
    // Cache derivado; só o reconciliador escreve aqui
    pub balance: Decimal,

    pub color: String,
    pub icon: Option<String>,
    pub image_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Metadados de parcelamento. Apenas repassados, nunca gerados aqui.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub group_id: Uuid,
    pub current: i32,
    pub total: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub owner_id: Uuid,

    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub status: TransactionStatus,

    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: String,

    // Vínculos
    #[serde(default)]
    pub funding: FundingSource,
    pub category_id: Option<Uuid>,
    pub client_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub installment: Option<Installment>,
}

impl Transaction {
    pub fn account_id(&self) -> Option<Uuid> {
        self.funding.account_id()
    }

    pub fn is_settled(&self) -> bool {
        self.status == TransactionStatus::Paid
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: Uuid,
    pub owner_id: Uuid,

    #[serde(rename = "type")]
    pub kind: BillKind,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: BillStatus,

    // Vínculos
    #[serde(default)]
    pub funding: FundingSource,
    pub category_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub notes: Option<String>,

    // Preenchido somente quando liquidada
    pub transaction_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// `transaction_id` existe se e somente se o status é liquidado.
    pub fn has_consistent_link(&self) -> bool {
        self.transaction_id.is_some() == self.status.is_settled()
    }
}

// --- Filtros de leitura ---

#[derive(Debug, Clone, Default, PartialEq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub account_id: Option<Uuid>,
    pub card_id: Option<Uuid>,
    pub status: Option<TransactionStatus>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TransactionFilter {
    /// Transações pagas de uma conta: a entrada do reconciliador.
    pub fn settled_for_account(account_id: Uuid) -> Self {
        Self {
            account_id: Some(account_id),
            status: Some(TransactionStatus::Paid),
            ..Self::default()
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.account_id.is_none_or(|id| tx.account_id() == Some(id))
            && self.card_id.is_none_or(|id| tx.funding.card_id() == Some(id))
            && self.status.is_none_or(|status| tx.status == status)
            && self.kind.is_none_or(|kind| tx.kind == kind)
            && self.from.is_none_or(|from| tx.date >= from)
            && self.to.is_none_or(|to| tx.date <= to)
    }
}

/// Filtro da listagem de contas a pagar/receber. O status é comparado com
/// o status de exibição (já derivado), não com o gravado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct BillFilter {
    #[serde(rename = "type")]
    pub kind: Option<BillKind>,
    pub status: Option<BillStatus>,
}

impl BillFilter {
    pub fn matches(&self, bill: &Bill) -> bool {
        self.kind.is_none_or(|kind| bill.kind == kind)
            && self.status.is_none_or(|status| bill.status == status)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{BillKind, BillStatus, FundingSource, TransactionType};
    use crate::common::error::AppError;

    #[test]
    fn funding_source_from_columns() {
        let account = Uuid::new_v4();
        let card = Uuid::new_v4();

        assert_eq!(FundingSource::from_columns(None, None).unwrap(), FundingSource::None);
        assert_eq!(
            FundingSource::from_columns(Some(account), None).unwrap(),
            FundingSource::Account(account)
        );
        assert_eq!(
            FundingSource::from_columns(None, Some(card)).unwrap(),
            FundingSource::Card(card)
        );
        assert!(matches!(
            FundingSource::from_columns(Some(account), Some(card)),
            Err(AppError::PersistenceFailure(_))
        ));
    }

    #[test]
    fn card_funding_has_no_account() {
        let source = FundingSource::Card(Uuid::new_v4());

        assert_eq!(source.account_id(), None);
        assert!(source.card_id().is_some());
    }

    #[test]
    fn bill_kind_maps_to_settlement_outcome() {
        assert_eq!(BillKind::Receivable.settled_status(), BillStatus::Received);
        assert_eq!(BillKind::Payable.settled_status(), BillStatus::Paid);
        assert_eq!(BillKind::Receivable.transaction_type(), TransactionType::Income);
        assert_eq!(BillKind::Payable.transaction_type(), TransactionType::Expense);
    }

    #[test]
    fn overdue_is_still_open() {
        assert!(BillStatus::Overdue.is_open());
        assert!(BillStatus::Pending.is_open());
        assert!(BillStatus::Paid.is_settled());
        assert!(BillStatus::Received.is_settled());
    }

    #[test]
    fn enums_use_portuguese_wire_values() {
        assert_eq!(serde_json::to_string(&BillStatus::Overdue).unwrap(), "\"atrasado\"");
        assert_eq!(serde_json::to_string(&TransactionType::Expense).unwrap(), "\"despesa\"");
        assert_eq!(
            serde_json::from_str::<BillKind>("\"receber\"").unwrap(),
            BillKind::Receivable
        );
    }
}
