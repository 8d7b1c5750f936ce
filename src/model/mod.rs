pub mod status;
pub mod task;
pub mod recon;
pub mod accrual;
pub mod settlement;
pub mod workspace;
pub mod config;

pub use status::*;
pub use task::*;
pub use recon::*;
pub use accrual::*;
pub use settlement::*;
pub use workspace::*;
pub use config::*;
