//! Simulated browser wallet for demo mode.
//!
//! Nothing here touches a chain: connection, signing and confirmations are
//! timers plus fabricated identifiers. The surface mirrors an injected
//! provider closely enough for code written against one.

pub mod accounts;
mod error;
mod events;
mod provider;
mod rpc;
mod types;

pub use accounts::{
    format_demo_address, generate_demo_tx_hash, generate_demo_wallet, is_demo_wallet,
    random_base36, random_demo_wallet, DEMO_BALANCE, DEMO_CHAIN_ID, DEMO_WALLETS,
    DEMO_WALLET_PREFIX,
};
pub use error::Error;
pub use events::{EventKind, Listener, ListenerError, ListenerId, WalletEvent};
pub use provider::{MockWalletProvider, WalletConfig, SIMULATED_GAS_USED};
pub use rpc::{balance_in_wei, SUPPORTED_METHODS};
pub use types::{
    ConnectionStatus, ReceiptStatus, TransactionReceipt, TransactionRequest, WalletState,
};

/// Milliseconds since the unix epoch.
pub fn unix_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
