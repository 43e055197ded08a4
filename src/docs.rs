// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Contas ---
        handlers::finance::list_accounts,
        handlers::finance::create_account,
        handlers::finance::update_account,
        handlers::finance::delete_account,
        handlers::finance::reconcile_account,

        // --- Transações ---
        handlers::finance::list_transactions,
        handlers::finance::upsert_transaction,
        handlers::finance::delete_transaction,

        // --- Contas a pagar / receber ---
        handlers::finance::list_bills,
        handlers::finance::save_bill,
        handlers::finance::delete_bill,
        handlers::finance::settle_bill,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            models::finance::AccountType,
            models::finance::TransactionType,
            models::finance::TransactionStatus,
            models::finance::BillKind,
            models::finance::BillStatus,
            models::finance::FundingSource,
            models::finance::Installment,
            models::finance::Account,
            models::finance::Transaction,
            models::finance::Bill,
            models::dashboard::DashboardSummary,

            // --- Payloads ---
            handlers::finance::AccountPayload,
            handlers::finance::TransactionPayload,
            handlers::finance::BillPayload,
        )
    ),
    tags(
        (name = "Contas", description = "Contas bancárias e reconciliação de saldo"),
        (name = "Transações", description = "Lançamentos de receita e despesa"),
        (name = "Contas a Pagar/Receber", description = "Títulos e liquidação"),
        (name = "Dashboard", description = "Indicadores do período")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
