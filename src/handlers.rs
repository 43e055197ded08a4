pub mod dashboard;
pub mod finance;
