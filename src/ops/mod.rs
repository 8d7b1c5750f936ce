pub mod accrual_ops;
pub mod check;
pub mod provider;
pub mod recon_ops;
pub mod search;
pub mod status_ops;
pub mod summary;
