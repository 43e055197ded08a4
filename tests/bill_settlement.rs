mod common;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use common::{money, Fixture};
use finansaas::{
    common::error::AppError,
    db::{FinanceStore, StoreOp},
    models::finance::{
        Bill, BillFilter, BillKind, BillStatus, FundingSource, TransactionFilter, TransactionStatus,
        TransactionType,
    },
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn settling_a_payable_creates_one_paid_expense() {
    let fx = Fixture::new();
    let account = fx.account("1000.00").await;
    let bill = fx
        .bill(
            BillKind::Payable,
            "300.00",
            day(2026, 10, 20),
            FundingSource::Account(account.id),
        )
        .await;

    let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    let settled = fx
        .state
        .bill_service
        .settle_at(fx.owner_id, bill.id, now)
        .await
        .unwrap();

    assert_eq!(settled.status, BillStatus::Paid);
    let tx_id = settled.transaction_id.expect("conta liquidada sem transação");

    let tx = fx
        .store
        .get_transaction(fx.owner_id, tx_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tx.kind, TransactionType::Expense);
    assert_eq!(tx.status, TransactionStatus::Paid);
    assert_eq!(tx.amount, money("300.00"));
    assert_eq!(tx.date, now);
    assert_eq!(tx.funding, FundingSource::Account(account.id));

    assert_eq!(fx.balance(account.id).await, money("700.00"));

    let stored = fx.store.get_bill(fx.owner_id, bill.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BillStatus::Paid);
    assert_eq!(stored.transaction_id, Some(tx_id));
    assert!(stored.has_consistent_link());
}

#[tokio::test]
async fn settling_a_receivable_creates_income() {
    let fx = Fixture::new();
    let account = fx.account("0").await;
    let bill = fx
        .bill(
            BillKind::Receivable,
            "120.50",
            day(2026, 11, 1),
            FundingSource::Account(account.id),
        )
        .await;

    let settled = fx.state.bill_service.settle(fx.owner_id, bill.id).await.unwrap();

    assert_eq!(settled.status, BillStatus::Received);
    assert_eq!(fx.balance(account.id).await, money("120.50"));
}

#[tokio::test]
async fn settlement_happens_at_most_once() {
    let fx = Fixture::new();
    let account = fx.account("500.00").await;
    let bill = fx
        .bill(
            BillKind::Payable,
            "100.00",
            day(2026, 10, 20),
            FundingSource::Account(account.id),
        )
        .await;

    fx.state.bill_service.settle(fx.owner_id, bill.id).await.unwrap();
    let err = fx
        .state
        .bill_service
        .settle(fx.owner_id, bill.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(fx.store.transaction_count().await, 1);
    assert_eq!(fx.balance(account.id).await, money("400.00"));
}

#[tokio::test]
async fn settling_an_unknown_bill_is_not_found() {
    let fx = Fixture::new();

    let err = fx
        .state
        .bill_service
        .settle(fx.owner_id, Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(..)));
    assert_eq!(fx.store.transaction_count().await, 0);
}

#[tokio::test]
async fn failed_transaction_write_keeps_the_bill_open() {
    let fx = Fixture::new();
    let account = fx.account("500.00").await;
    let bill = fx
        .bill(
            BillKind::Payable,
            "100.00",
            day(2026, 10, 20),
            FundingSource::Account(account.id),
        )
        .await;

    fx.store.fail_next(StoreOp::UpsertTransaction).await;
    let err = fx
        .state
        .bill_service
        .settle(fx.owner_id, bill.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PersistenceFailure(_)));
    assert_eq!(fx.store.transaction_count().await, 0);

    let stored = fx.store.get_bill(fx.owner_id, bill.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BillStatus::Pending);
    assert_eq!(stored.transaction_id, None);
    assert_eq!(fx.balance(account.id).await, money("500.00"));
}

#[tokio::test]
async fn failed_bill_update_undoes_the_generated_transaction() {
    let fx = Fixture::new();
    let account = fx.account("500.00").await;
    let bill = fx
        .bill(
            BillKind::Payable,
            "100.00",
            day(2026, 10, 20),
            FundingSource::Account(account.id),
        )
        .await;

    fx.store.fail_next(StoreOp::MarkBillSettled).await;
    let err = fx
        .state
        .bill_service
        .settle(fx.owner_id, bill.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::PersistenceFailure(_)));
    assert_eq!(fx.store.transaction_count().await, 0);
    assert_eq!(fx.balance(account.id).await, money("500.00"));

    let stored = fx.store.get_bill(fx.owner_id, bill.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BillStatus::Pending);

    // Uma nova tentativa funciona normalmente
    fx.state.bill_service.settle(fx.owner_id, bill.id).await.unwrap();
    assert_eq!(fx.store.transaction_count().await, 1);
    assert_eq!(fx.balance(account.id).await, money("400.00"));
}

#[tokio::test]
async fn card_funded_bill_settles_without_touching_accounts() {
    let fx = Fixture::new();
    let account = fx.account("500.00").await;
    let card_id = Uuid::new_v4();
    let bill = fx
        .bill(
            BillKind::Payable,
            "60.00",
            day(2026, 10, 20),
            FundingSource::Card(card_id),
        )
        .await;

    fx.state.bill_service.settle(fx.owner_id, bill.id).await.unwrap();

    let on_card = fx
        .state
        .transaction_service
        .list_transactions(
            fx.owner_id,
            &TransactionFilter {
                card_id: Some(card_id),
                ..TransactionFilter::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(on_card.len(), 1);
    assert_eq!(fx.balance(account.id).await, money("500.00"));
}

#[tokio::test]
async fn overdue_is_derived_on_read_and_never_stored() {
    let fx = Fixture::new();
    let bill = fx
        .bill(BillKind::Payable, "40.00", day(2026, 10, 10), FundingSource::None)
        .await;

    let as_of = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();
    let listed = fx
        .state
        .bill_service
        .list_bills_as_of(fx.owner_id, &BillFilter::default(), as_of)
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, BillStatus::Overdue);

    let stored = fx.store.get_bill(fx.owner_id, bill.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BillStatus::Pending);
}

#[tokio::test]
async fn due_today_is_not_overdue() {
    let fx = Fixture::new();
    fx.bill(BillKind::Payable, "40.00", day(2026, 10, 16), FundingSource::None)
        .await;

    let as_of = Utc.with_ymd_and_hms(2026, 10, 16, 23, 59, 0).unwrap();
    let listed = fx
        .state
        .bill_service
        .list_bills_as_of(fx.owner_id, &BillFilter::default(), as_of)
        .await
        .unwrap();

    assert_eq!(listed[0].status, BillStatus::Pending);
}

#[tokio::test]
async fn status_filter_uses_the_displayed_status() {
    let fx = Fixture::new();
    fx.bill(BillKind::Payable, "10.00", day(2026, 10, 1), FundingSource::None)
        .await;
    fx.bill(BillKind::Payable, "20.00", day(2026, 12, 1), FundingSource::None)
        .await;
    fx.bill(BillKind::Receivable, "30.00", day(2026, 9, 1), FundingSource::None)
        .await;

    let as_of = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
    let filter = BillFilter {
        kind: Some(BillKind::Payable),
        status: Some(BillStatus::Overdue),
    };
    let listed = fx
        .state
        .bill_service
        .list_bills_as_of(fx.owner_id, &filter, as_of)
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].amount, money("10.00"));
}

#[tokio::test]
async fn saving_overdue_stores_pending() {
    let fx = Fixture::new();
    let mut bill = fx
        .bill(BillKind::Payable, "10.00", day(2026, 10, 1), FundingSource::None)
        .await;

    bill.status = BillStatus::Overdue;
    bill.notes = Some("renegociar".to_string());
    let saved = fx.state.bill_service.save_bill(fx.owner_id, bill).await.unwrap();

    assert_eq!(saved.status, BillStatus::Pending);
    let stored = fx.store.get_bill(fx.owner_id, saved.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BillStatus::Pending);
    assert_eq!(stored.notes.as_deref(), Some("renegociar"));
}

#[tokio::test]
async fn saving_cannot_mark_a_bill_as_settled() {
    let fx = Fixture::new();
    let mut bill = fx
        .bill(BillKind::Payable, "10.00", day(2026, 10, 1), FundingSource::None)
        .await;

    bill.status = BillStatus::Paid;
    bill.transaction_id = Some(Uuid::new_v4());
    let err = fx
        .state
        .bill_service
        .save_bill(fx.owner_id, bill)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn settled_bill_keeps_its_status_and_link() {
    let fx = Fixture::new();
    let bill = fx
        .bill(BillKind::Payable, "10.00", day(2026, 10, 1), FundingSource::None)
        .await;
    let settled = fx.state.bill_service.settle(fx.owner_id, bill.id).await.unwrap();

    // Editar a descrição continua permitido
    let mut edited = settled.clone();
    edited.description = "Fornecedor XYZ (nota 123)".to_string();
    fx.state
        .bill_service
        .save_bill(fx.owner_id, edited)
        .await
        .unwrap();

    let mut reopened = settled.clone();
    reopened.status = BillStatus::Pending;
    reopened.transaction_id = None;
    let err = fx
        .state
        .bill_service
        .save_bill(fx.owner_id, reopened)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
}

#[tokio::test]
async fn deleting_a_settled_bill_keeps_its_transaction() {
    let fx = Fixture::new();
    let account = fx.account("100.00").await;
    let bill = fx
        .bill(
            BillKind::Payable,
            "25.00",
            day(2026, 10, 1),
            FundingSource::Account(account.id),
        )
        .await;
    fx.state.bill_service.settle(fx.owner_id, bill.id).await.unwrap();

    fx.state
        .bill_service
        .delete_bill(fx.owner_id, bill.id)
        .await
        .unwrap();

    assert_eq!(fx.store.transaction_count().await, 1);
    assert_eq!(fx.balance(account.id).await, money("75.00"));

    let err = fx
        .state
        .bill_service
        .delete_bill(fx.owner_id, bill.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(..)));
}

#[tokio::test]
async fn dashboard_summarizes_the_period() {
    let fx = Fixture::new();
    let account = fx.account("1000.00").await;
    fx.upsert(common::paid_income("500.00", account.id)).await;
    fx.upsert(common::paid_expense("200.00", account.id)).await;

    let today = Utc::now().date_naive();
    fx.bill(BillKind::Payable, "50.00", today - Duration::days(2), FundingSource::None)
        .await;
    fx.bill(BillKind::Payable, "70.00", today + Duration::days(5), FundingSource::None)
        .await;
    fx.bill(BillKind::Payable, "90.00", today + Duration::days(20), FundingSource::None)
        .await;
    fx.bill(BillKind::Receivable, "300.00", today + Duration::days(3), FundingSource::None)
        .await;

    let summary = fx
        .state
        .dashboard_service
        .get_summary(
            fx.owner_id,
            Some((today - Duration::days(1), today + Duration::days(1))),
            Utc::now(),
        )
        .await
        .unwrap();

    assert_eq!(summary.current_balance, money("1300.00"));
    assert_eq!(summary.income_period, money("500.00"));
    assert_eq!(summary.expense_period, money("200.00"));
    assert_eq!(summary.receivable_pending, money("300.00"));
    assert_eq!(summary.payable_pending, money("210.00"));
    assert_eq!(summary.payables_overdue, 1);
    assert_eq!(summary.payables_due_next_7_days, 1);
    assert_eq!(summary.payables_due_next_30_days, 2);
}

#[tokio::test]
async fn settled_bill_keeps_what_was_mirrored_into_its_transaction() {
    let fx = Fixture::new();
    let account = fx.account("100.00").await;
    let other = fx.account("100.00").await;
    let bill = fx
        .bill(
            BillKind::Payable,
            "40.00",
            day(2026, 10, 1),
            FundingSource::Account(account.id),
        )
        .await;
    let settled = fx.state.bill_service.settle(fx.owner_id, bill.id).await.unwrap();

    let flipped_kind = Bill {
        kind: BillKind::Receivable,
        ..settled.clone()
    };
    let new_amount = Bill {
        amount: money("45.00"),
        ..settled.clone()
    };
    let moved = Bill {
        funding: FundingSource::Account(other.id),
        ..settled.clone()
    };

    for edited in [flipped_kind, new_amount, moved] {
        let err = fx
            .state
            .bill_service
            .save_bill(fx.owner_id, edited)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    let stored = fx.store.get_bill(fx.owner_id, bill.id).await.unwrap().unwrap();
    assert_eq!(stored.kind, BillKind::Payable);
    assert_eq!(stored.amount, money("40.00"));
    assert_eq!(stored.funding, FundingSource::Account(account.id));

    // O mesmo valor com outra escala não conta como alteração
    let same_amount = Bill {
        amount: money("40"),
        due_date: day(2026, 10, 2),
        ..settled
    };
    fx.state
        .bill_service
        .save_bill(fx.owner_id, same_amount)
        .await
        .unwrap();
}

#[tokio::test]
async fn open_bill_can_still_change_kind_amount_and_funding() {
    let fx = Fixture::new();
    let account = fx.account("100.00").await;
    let bill = fx
        .bill(BillKind::Payable, "40.00", day(2026, 10, 1), FundingSource::None)
        .await;

    let edited = Bill {
        kind: BillKind::Receivable,
        amount: money("55.00"),
        funding: FundingSource::Account(account.id),
        ..bill
    };
    let saved = fx
        .state
        .bill_service
        .save_bill(fx.owner_id, edited)
        .await
        .unwrap();

    assert_eq!(saved.kind, BillKind::Receivable);
    assert_eq!(saved.amount, money("55.00"));
}

#[tokio::test]
async fn failed_undo_leaves_the_transaction_and_reports_the_original_error() {
    let fx = Fixture::new();
    let account = fx.account("500.00").await;
    let bill = fx
        .bill(
            BillKind::Payable,
            "100.00",
            day(2026, 10, 20),
            FundingSource::Account(account.id),
        )
        .await;

    fx.store.fail_next(StoreOp::MarkBillSettled).await;
    fx.store.fail_next(StoreOp::DeleteTransaction).await;
    let err = fx
        .state
        .bill_service
        .settle(fx.owner_id, bill.id)
        .await
        .unwrap_err();

    // O erro devolvido é o da marcação, não o do desfazer
    match err {
        AppError::PersistenceFailure(reason) => assert!(reason.contains("MarkBillSettled")),
        other => panic!("erro inesperado: {other:?}"),
    }

    // A transação gerada ficou órfã e o saldo a reflete
    assert_eq!(fx.store.transaction_count().await, 1);
    assert_eq!(fx.balance(account.id).await, money("400.00"));

    let stored = fx.store.get_bill(fx.owner_id, bill.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BillStatus::Pending);
    assert_eq!(stored.transaction_id, None);
}
