use mock_wallet::{WalletConfig, DEMO_WALLET_PREFIX};
use std::time::Duration;

/// Environment variable that switches the simulation layer on.
pub const DEMO_MODE_ENV: &str = "APX_DEMO_MODE";

/// Demo-mode switch and the timing constants every simulated operation uses.
///
/// Read once at startup. Nothing reconfigures a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Whether mock wallet and mock data replace real integrations
    pub enabled: bool,
    /// Prefix shared by every fabricated address and hash
    pub demo_wallet_prefix: String,
    /// Simulated wallet handshake latency
    pub auto_connect_delay: Duration,
    /// Simulated transaction processing time
    pub transaction_delay: Duration,
    /// Period between consensus animation ticks
    pub consensus_update_interval: Duration,
    /// Simulated API latency for list and stats fetches
    pub fetch_delay: Duration,
    /// Simulated API latency for single-claim fetches
    pub claim_fetch_delay: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            demo_wallet_prefix: DEMO_WALLET_PREFIX.to_string(),
            auto_connect_delay: Duration::from_millis(500),
            transaction_delay: Duration::from_millis(1500),
            consensus_update_interval: Duration::from_millis(3000),
            fetch_delay: Duration::from_millis(300),
            claim_fetch_delay: Duration::from_millis(200),
        }
    }
}

impl DemoConfig {
    /// Default timings with the flag taken from `APX_DEMO_MODE`. Only the
    /// literal `true` enables demo mode.
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var(DEMO_MODE_ENV).is_ok_and(|value| value == "true"),
            ..Default::default()
        }
    }

    pub fn demo() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    pub fn is_demo_mode(&self) -> bool {
        self.enabled
    }

    /// Wallet timings derived from the demo timings. The remaining delays
    /// keep their wallet defaults.
    pub fn to_wallet_config(&self) -> WalletConfig {
        WalletConfig {
            connect_delay: self.auto_connect_delay,
            transaction_delay: self.transaction_delay,
            ..Default::default()
        }
    }
}
