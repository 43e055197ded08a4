// src/services/bill_service.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::{
        error::{AppError, Entity},
        events::{ChangeKind, ChangeNotifier},
    },
    db::SharedStore,
    models::finance::{Bill, BillFilter, BillStatus, Transaction, TransactionStatus},
    services::transaction_service::TransactionService,
};

/// Status de exibição de uma conta a pagar/receber.
///
/// Uma conta `pendente` cujo vencimento é anterior ao início do dia de
/// `as_of` aparece como `atrasado`. Nada é gravado.
pub fn derive_display_status(bill: &Bill, as_of: DateTime<Utc>) -> BillStatus {
    if bill.status == BillStatus::Pending && bill.due_date < as_of.date_naive() {
        BillStatus::Overdue
    } else {
        bill.status
    }
}

#[derive(Clone)]
pub struct BillService {
    store: SharedStore,
    transaction_service: TransactionService,
    notifier: ChangeNotifier,
}

impl BillService {
    pub fn new(
        store: SharedStore,
        transaction_service: TransactionService,
        notifier: ChangeNotifier,
    ) -> Self {
        Self {
            store,
            transaction_service,
            notifier,
        }
    }

    pub async fn list_bills(&self, owner_id: Uuid, filter: &BillFilter) -> Result<Vec<Bill>, AppError> {
        self.list_bills_as_of(owner_id, filter, Utc::now()).await
    }

    /// Lista com o status já derivado; o filtro olha o status de exibição.
    pub async fn list_bills_as_of(
        &self,
        owner_id: Uuid,
        filter: &BillFilter,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<Bill>, AppError> {
        let bills = self
            .store
            .list_bills(owner_id)
            .await?
            .into_iter()
            .map(|mut bill| {
                bill.status = derive_display_status(&bill, as_of);
                bill
            })
            .filter(|bill| filter.matches(bill))
            .collect();

        Ok(bills)
    }

    /// Cria ou edita uma conta a pagar/receber.
    ///
    /// `atrasado` nunca é gravado (volta a `pendente`). Uma conta só entra
    /// em estado liquidado via `settle`. Depois disso, só descrição,
    /// vencimento, categoria, cliente e notas continuam editáveis.
    pub async fn save_bill(&self, owner_id: Uuid, mut bill: Bill) -> Result<Bill, AppError> {
        bill.owner_id = owner_id;
        if bill.status == BillStatus::Overdue {
            bill.status = BillStatus::Pending;
        }

        let stored = self.store.get_bill(owner_id, bill.id).await?;
        match &stored {
            Some(stored) if stored.status.is_settled() => {
                // Tudo que foi espelhado na transação gerada fica congelado
                let frozen_changed = bill.status != stored.status
                    || bill.transaction_id != stored.transaction_id
                    || bill.kind != stored.kind
                    || bill.amount != stored.amount
                    || bill.funding != stored.funding;
                if frozen_changed {
                    return Err(AppError::InvalidState(
                        "tipo, valor, origem, status e transação de uma conta liquidada não podem ser alterados"
                            .to_string(),
                    ));
                }
            }
            _ => {
                if bill.status.is_settled() || bill.transaction_id.is_some() {
                    return Err(AppError::InvalidState(
                        "uma conta só pode ser liquidada pela operação de liquidação".to_string(),
                    ));
                }
            }
        }

        if let Some(stored) = &stored {
            bill.created_at = stored.created_at;
        }

        self.store.upsert_bill(owner_id, &bill).await?;
        tracing::info!(bill_id = %bill.id, "Conta a pagar/receber gravada");

        self.notifier.publish(owner_id, ChangeKind::Bills);
        Ok(bill)
    }

    /// Apaga a conta. A transação gerada (se houver) continua existindo.
    pub async fn delete_bill(&self, owner_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_bill(owner_id, id).await? {
            return Err(AppError::NotFound(Entity::Bill, id));
        }

        tracing::info!(bill_id = %id, "Conta a pagar/receber apagada");
        self.notifier.publish(owner_id, ChangeKind::Bills);
        Ok(())
    }

    pub async fn settle(&self, owner_id: Uuid, bill_id: Uuid) -> Result<Bill, AppError> {
        self.settle_at(owner_id, bill_id, Utc::now()).await
    }

    /// Liquida a conta: gera uma transação paga datada de `now`, que passa
    /// pelo fluxo normal de transações (e portanto pela reconciliação), e
    /// então marca a conta como paga/recebida apontando para ela.
    pub async fn settle_at(
        &self,
        owner_id: Uuid,
        bill_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Bill, AppError> {
        let bill = self
            .store
            .get_bill(owner_id, bill_id)
            .await?
            .ok_or(AppError::NotFound(Entity::Bill, bill_id))?;

        if bill.status.is_settled() {
            return Err(AppError::InvalidState(format!(
                "a conta {bill_id} já está liquidada"
            )));
        }

        let settled_status = bill.kind.settled_status();

        let tx = Transaction {
            id: Uuid::new_v4(),
            owner_id,
            kind: bill.kind.transaction_type(),
            status: TransactionStatus::Paid,
            amount: bill.amount,
            date: now,
            description: bill.description.clone(),
            funding: bill.funding,
            category_id: bill.category_id,
            client_id: bill.client_id,
            created_at: now,
            installment: None,
        };

        // Se falhar aqui, a conta continua em aberto
        let tx = self.transaction_service.upsert(owner_id, tx).await?;

        if let Err(err) = self
            .store
            .mark_bill_settled(owner_id, bill.id, settled_status, tx.id)
            .await
        {
            tracing::warn!(
                %bill_id,
                transaction_id = %tx.id,
                error = %err,
                "Falha ao marcar a conta como liquidada; desfazendo a transação gerada"
            );
            if let Err(undo_err) = self.transaction_service.remove(owner_id, tx.id).await {
                tracing::error!(
                    %bill_id,
                    transaction_id = %tx.id,
                    error = %undo_err,
                    "Transação órfã: não foi possível desfazer"
                );
            }
            return Err(err);
        }

        tracing::info!(%bill_id, transaction_id = %tx.id, "Conta liquidada");
        self.notifier.publish(owner_id, ChangeKind::Bills);

        Ok(Bill {
            status: settled_status,
            transaction_id: Some(tx.id),
            ..bill
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::derive_display_status;
    use crate::models::finance::{Bill, BillKind, BillStatus, FundingSource};

    fn bill(status: BillStatus, due_date: NaiveDate) -> Bill {
        Bill {
            id: Uuid::new_v4(),
            owner_id: Uuid::nil(),
            kind: BillKind::Payable,
            description: "Aluguel".to_string(),
            amount: Decimal::new(150000, 2),
            due_date,
            status,
            funding: FundingSource::None,
            category_id: None,
            client_id: None,
            notes: None,
            transaction_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pending_bill_past_due_is_overdue() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let yesterday = now.date_naive() - Duration::days(1);

        assert_eq!(
            derive_display_status(&bill(BillStatus::Pending, yesterday), now),
            BillStatus::Overdue
        );
    }

    #[test]
    fn bill_due_today_is_not_overdue() {
        // Mesmo no fim do dia, vencer hoje ainda não é atraso
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 23, 59, 59).unwrap();

        assert_eq!(
            derive_display_status(&bill(BillStatus::Pending, now.date_naive()), now),
            BillStatus::Pending
        );
    }

    #[test]
    fn settled_bills_keep_their_status() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let long_ago = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        for status in [BillStatus::Paid, BillStatus::Received] {
            assert_eq!(derive_display_status(&bill(status, long_ago), now), status);
        }
    }

    #[test]
    fn derivation_does_not_touch_the_record() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let stored = bill(BillStatus::Pending, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

        let _ = derive_display_status(&stored, now);

        assert_eq!(stored.status, BillStatus::Pending);
    }
}
