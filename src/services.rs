pub mod auth;
pub mod balance_service;
pub mod transaction_service;
pub mod bill_service;
pub mod account_service;
pub mod dashboard_service;

pub use account_service::{AccountDetails, AccountService};
pub use auth::AuthService;
pub use balance_service::BalanceService;
pub use bill_service::BillService;
pub use dashboard_service::DashboardService;
pub use transaction_service::TransactionService;
