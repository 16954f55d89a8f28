mod app;
pub mod banner;
pub mod claim;
pub mod config;
pub mod consensus;
pub mod demo;
mod error;
pub mod metrics;
pub mod mock_data;
pub mod resource;
pub mod session;
pub mod simulator;

// for main.rs
pub use app::run;

pub use claim::{Claim, ClaimStatus, ProviderStats, Transaction};
pub use config::DemoConfig;
pub use error::Error;
pub use mock_data::MockDataGenerator;
pub use session::{ClaimSubmitter, DemoSession, WalletBinding};
