//! Demo-mode status, feature flags, banner text and analytics events.

use crate::config::DemoConfig;
use crate::metrics::DEMO_EVENTS_TOTAL;
use mock_wallet::DEMO_WALLETS;
use serde_derive::Serialize;
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::info;

/// Profile of the provider account every demo session acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoProvider {
    pub name: &'static str,
    pub npi: &'static str,
    pub address: &'static str,
    pub reputation: u32,
    pub total_claims: u32,
    pub approved_claims: u32,
    pub rejected_claims: u32,
    pub pending_claims: u32,
    /// ETH
    pub total_staked: &'static str,
    pub joined_date: &'static str,
}

pub const DEMO_PROVIDER: DemoProvider = DemoProvider {
    name: "Demo Healthcare Provider",
    npi: "1234567890",
    address: DEMO_WALLETS[0],
    reputation: 90,
    total_claims: 847,
    approved_claims: 782,
    rejected_claims: 65,
    pending_claims: 23,
    total_staked: "10.0",
    joined_date: "2024-03-15",
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoWalletStatus {
    pub connected: bool,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoModeStatus {
    pub enabled: bool,
    pub wallet: DemoWalletStatus,
    pub provider: Option<DemoProvider>,
}

pub fn demo_mode_status(config: &DemoConfig) -> DemoModeStatus {
    if !config.enabled {
        return DemoModeStatus {
            enabled: false,
            wallet: DemoWalletStatus {
                connected: false,
                address: None,
            },
            provider: None,
        };
    }

    DemoModeStatus {
        enabled: true,
        wallet: DemoWalletStatus {
            connected: true,
            address: Some(DEMO_WALLETS[0].to_string()),
        },
        provider: Some(DEMO_PROVIDER),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum DemoFeature {
    ClaimSubmission,
    ClaimVerification,
    ConsensusViewing,
    StakeManagement,
    ReputationSystem,
    TransactionHistory,
    RealBlockchainTx,
    WalletSignatures,
    ActualPayments,
}

impl DemoFeature {
    /// Availability while demo mode is on. Anything that would move real
    /// funds or need a real key stays off.
    pub fn available_in_demo(&self) -> bool {
        !matches!(
            self,
            DemoFeature::RealBlockchainTx | DemoFeature::WalletSignatures | DemoFeature::ActualPayments
        )
    }
}

/// Outside demo mode every feature is live.
pub fn is_demo_feature_enabled(config: &DemoConfig, feature: DemoFeature) -> bool {
    !config.enabled || feature.available_in_demo()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum DemoWarning {
    NoRealTransactions,
    MockData,
    NoRealWallet,
    LimitedFeatures,
}

impl DemoWarning {
    pub fn message(&self) -> &'static str {
        match self {
            DemoWarning::NoRealTransactions => {
                "Demo mode active - no real blockchain transactions will be executed"
            }
            DemoWarning::MockData => "You are viewing simulated data for demonstration purposes",
            DemoWarning::NoRealWallet => {
                "Using a demo wallet - connect a real wallet to interact with the blockchain"
            }
            DemoWarning::LimitedFeatures => "Some features are limited in demo mode",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerKind {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoBannerConfig {
    pub show: bool,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: BannerKind,
    pub dismissible: bool,
}

pub fn demo_banner_config(config: &DemoConfig) -> DemoBannerConfig {
    if !config.enabled {
        return DemoBannerConfig {
            show: false,
            message: String::new(),
            kind: BannerKind::Info,
            dismissible: false,
        };
    }

    DemoBannerConfig {
        show: true,
        message: DemoWarning::NoRealTransactions.message().to_string(),
        kind: BannerKind::Warning,
        dismissible: true,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum DemoEvent {
    DemoModeActivated,
    DemoWalletConnected,
    DemoClaimSubmitted,
    DemoClaimViewed,
    DemoTransactionSimulated,
    DemoConsensusViewed,
}

/// Records an analytics event on the `demo` log target and in the
/// `demo_events_total` counter. Returns whether anything was recorded.
pub fn log_demo_event(config: &DemoConfig, event: DemoEvent, metadata: Option<Value>) -> bool {
    if !config.enabled {
        return false;
    }

    match metadata {
        Some(metadata) => info!(target: "demo", %event, %metadata, "[Demo Mode]"),
        None => info!(target: "demo", %event, "[Demo Mode]"),
    }
    DEMO_EVENTS_TOTAL.with_label_values(&[event.as_ref()]).inc();
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strum::IntoEnumIterator;

    #[test]
    fn test_status_reflects_flag() {
        let off = demo_mode_status(&DemoConfig::default());
        assert!(!off.enabled);
        assert_eq!(off.wallet.address, None);
        assert_eq!(off.provider, None);

        let on = demo_mode_status(&DemoConfig::demo());
        assert!(on.enabled);
        assert!(on.wallet.connected);
        assert_eq!(on.wallet.address.as_deref(), Some(DEMO_WALLETS[0]));
        assert_eq!(on.provider, Some(DEMO_PROVIDER));
    }

    #[test]
    fn test_feature_flags() {
        let demo = DemoConfig::demo();
        let enabled: Vec<_> = DemoFeature::iter()
            .filter(|feature| is_demo_feature_enabled(&demo, *feature))
            .collect();
        assert_eq!(enabled.len(), 6);
        assert!(!is_demo_feature_enabled(&demo, DemoFeature::ActualPayments));

        let live = DemoConfig::default();
        assert!(DemoFeature::iter().all(|feature| is_demo_feature_enabled(&live, feature)));
        assert_eq!(
            "realBlockchainTx".parse::<DemoFeature>().unwrap(),
            DemoFeature::RealBlockchainTx
        );
    }

    #[test]
    fn test_banner_config() {
        let hidden = demo_banner_config(&DemoConfig::default());
        assert!(!hidden.show);
        assert!(hidden.message.is_empty());

        let shown = demo_banner_config(&DemoConfig::demo());
        assert!(shown.show && shown.dismissible);
        assert_eq!(shown.kind, BannerKind::Warning);
        assert_eq!(
            shown.message,
            "Demo mode active - no real blockchain transactions will be executed"
        );
    }

    #[test]
    fn test_log_demo_event_only_in_demo_mode() {
        assert!(!log_demo_event(
            &DemoConfig::default(),
            DemoEvent::DemoClaimViewed,
            None
        ));

        let counter = DEMO_EVENTS_TOTAL.with_label_values(&["demo_consensus_viewed"]);
        let before = counter.get();
        assert!(log_demo_event(
            &DemoConfig::demo(),
            DemoEvent::DemoConsensusViewed,
            Some(json!({ "claimId": "claim_1_0" }))
        ));
        assert!(counter.get() > before);
    }

    #[test]
    fn test_event_names_are_snake_case() {
        let names: Vec<String> = DemoEvent::iter().map(|event| event.to_string()).collect();
        assert_eq!(names[0], "demo_mode_activated");
        assert_eq!(names[4], "demo_transaction_simulated");
    }
}
