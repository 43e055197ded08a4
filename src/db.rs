pub mod finance_store;
pub use finance_store::{FinanceStore, SharedStore};
pub mod finance_repo;
pub use finance_repo::FinanceRepository;
pub mod memory_store;
pub use memory_store::{MemoryStore, StoreOp};
