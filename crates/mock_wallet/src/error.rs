use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
    #[error("Transaction failed")]
    TransactionFailed(String),
    #[error("Unknown transaction {0}")]
    UnknownTransaction(String),
    #[error("Invalid params for {method}: {reason}")]
    InvalidParams { method: String, reason: String },
    #[error("Invalid balance {0}")]
    InvalidBalance(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
