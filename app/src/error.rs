use crate::claim::ClaimStatus;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Not in demo mode")]
    NotInDemoMode,
    #[error("Wallet not available")]
    WalletUnavailable,
    #[error("Claim not found: {0}")]
    ClaimNotFound(String),
    #[error("Invalid claim transition from {from} via {action}")]
    InvalidTransition {
        from: ClaimStatus,
        action: &'static str,
    },
    #[error("Wallet error: {0}")]
    Wallet(#[from] mock_wallet::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid claim submission: {}", .0.join("; "))]
    InvalidSubmission(Vec<String>),
}
