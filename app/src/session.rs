//! Glue between the simulation pieces and whatever front end drives them.
//!
//! A [`DemoSession`] owns one wallet, one seeded generator and a snapshot of
//! generated data. Every view it hands out is a [`Resource`] or a timer
//! handle that cleans up after itself when dropped.

use crate::banner::{BannerStore, DemoBanner};
use crate::claim::{Claim, ClaimStatus, ProviderStats, Transaction};
use crate::config::DemoConfig;
use crate::demo::{demo_mode_status, log_demo_event, DemoEvent, DemoModeStatus};
use crate::error::Error;
use crate::metrics::{GENERATED_CLAIMS_TOTAL, WALLET_TRANSACTIONS_TOTAL};
use crate::mock_data::{provider_stats_for, MockDataGenerator};
use crate::resource::Resource;
use crate::simulator::{ConsensusAnimation, RealtimeFeed};
use mock_wallet::{
    unix_millis, ConnectionStatus, EventKind, ListenerId, MockWalletProvider, TransactionReceipt,
    TransactionRequest, WalletEvent, WalletState,
};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Claims and transactions shown for the lifetime of a session.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub claims: Vec<Claim>,
    pub transactions: Vec<Transaction>,
}

impl Dataset {
    /// Generates a fresh snapshot and counts its claims in
    /// `generated_claims_total`.
    pub fn generate(generator: &mut MockDataGenerator) -> Self {
        let claims = generator.generate_mock_claims();
        let transactions = generator.generate_mock_transactions(&claims);
        for claim in &claims {
            GENERATED_CLAIMS_TOTAL
                .with_label_values(&[claim.status().to_string().as_str()])
                .inc();
        }
        Self {
            claims,
            transactions,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimFilter {
    pub status: Option<ClaimStatus>,
    pub limit: Option<usize>,
}

impl ClaimFilter {
    fn apply(&self, claims: &[Claim]) -> Vec<Claim> {
        claims
            .iter()
            .filter(|claim| self.status.map_or(true, |status| claim.status() == status))
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One demo run: wallet, generator and dataset snapshot.
///
/// In demo mode the resource getters, [`DemoSession::bind_wallet`],
/// [`DemoSession::animate_consensus`] and [`DemoSession::realtime_updates`]
/// spawn tokio tasks and must be called from within a tokio runtime. Outside
/// demo mode nothing is spawned.
pub struct DemoSession {
    config: DemoConfig,
    status: DemoModeStatus,
    wallet: Option<MockWalletProvider>,
    generator: Arc<Mutex<MockDataGenerator>>,
    dataset: Arc<RwLock<Dataset>>,
}

impl DemoSession {
    pub fn new(config: DemoConfig) -> Self {
        Self::with_generator(config, MockDataGenerator::from_entropy())
    }

    pub fn seeded(config: DemoConfig, seed: u64) -> Self {
        Self::with_generator(config, MockDataGenerator::seeded(seed))
    }

    pub fn with_generator(config: DemoConfig, mut generator: MockDataGenerator) -> Self {
        let status = demo_mode_status(&config);
        let (wallet, dataset) = if config.enabled {
            let wallet = MockWalletProvider::with_seed(config.to_wallet_config(), generator.rng().gen());
            (Some(wallet), Dataset::generate(&mut generator))
        } else {
            (None, Dataset::default())
        };

        if log_demo_event(&config, DemoEvent::DemoModeActivated, None) {
            info!(claims = dataset.claims.len(), "Demo session started");
        }

        Self {
            config,
            status,
            wallet,
            generator: Arc::new(Mutex::new(generator)),
            dataset: Arc::new(RwLock::new(dataset)),
        }
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn status(&self) -> &DemoModeStatus {
        &self.status
    }

    pub fn is_demo(&self) -> bool {
        self.config.enabled
    }

    pub fn wallet(&self) -> Option<&MockWalletProvider> {
        self.wallet.as_ref()
    }

    pub fn now(&self) -> i64 {
        lock(&self.generator).now()
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the snapshot with freshly generated data.
    pub fn regenerate(&self) {
        if !self.config.enabled {
            return;
        }
        let fresh = Dataset::generate(&mut lock(&self.generator));
        *self.dataset.write().unwrap_or_else(PoisonError::into_inner) = fresh;
        debug!("Demo dataset regenerated");
    }

    fn read_dataset<T>(dataset: &RwLock<Dataset>, read: impl FnOnce(&Dataset) -> T) -> T {
        read(&dataset.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn first_verifying_claim(&self) -> Option<Claim> {
        Self::read_dataset(&self.dataset, |dataset| {
            dataset
                .claims
                .iter()
                .find(|claim| claim.status() == ClaimStatus::Verifying)
                .cloned()
        })
    }

    /// Mirrors the wallet into a local view and auto-connects in demo mode.
    ///
    /// # Panics
    ///
    /// In demo mode, when called outside a tokio runtime.
    pub fn bind_wallet(&self) -> WalletBinding {
        WalletBinding::new(self.wallet.clone(), self.config.clone())
    }

    pub fn claims(&self, filter: ClaimFilter) -> Resource<Vec<Claim>> {
        if !self.config.enabled {
            return Resource::ready(Vec::new());
        }
        let dataset = self.dataset.clone();
        Resource::spawn(Vec::new(), self.config.fetch_delay, move || {
            Self::read_dataset(&dataset, |dataset| filter.apply(&dataset.claims))
        })
    }

    pub fn claim(&self, id: Option<&str>) -> Resource<Option<Claim>> {
        let Some(id) = id.filter(|_| self.config.enabled).map(str::to_string) else {
            return Resource::ready(None);
        };
        let dataset = self.dataset.clone();
        let config = self.config.clone();
        Resource::spawn(None, self.config.claim_fetch_delay, move || {
            let claim = Self::read_dataset(&dataset, |dataset| {
                dataset.claims.iter().find(|claim| claim.id == id).cloned()
            });
            if claim.is_some() {
                log_demo_event(&config, DemoEvent::DemoClaimViewed, Some(json!({ "claimId": id })));
            }
            claim
        })
    }

    pub fn transactions(&self, limit: Option<usize>) -> Resource<Vec<Transaction>> {
        if !self.config.enabled {
            return Resource::ready(Vec::new());
        }
        let dataset = self.dataset.clone();
        Resource::spawn(Vec::new(), self.config.fetch_delay, move || {
            Self::read_dataset(&dataset, |dataset| {
                let limit = limit.unwrap_or(dataset.transactions.len());
                dataset.transactions.iter().take(limit).cloned().collect()
            })
        })
    }

    /// Stats over the same snapshot the claim views read.
    pub fn provider_stats(&self) -> Resource<Option<ProviderStats>> {
        if !self.config.enabled {
            return Resource::ready(None);
        }
        let dataset = self.dataset.clone();
        let generator = self.generator.clone();
        Resource::spawn(None, self.config.fetch_delay, move || {
            let now = lock(&generator).now();
            Some(Self::read_dataset(&dataset, |dataset| {
                provider_stats_for(&dataset.claims, now)
            }))
        })
    }

    pub fn animate_consensus(&self, claim_id: &str) -> Result<ConsensusAnimation, Error> {
        if !self.config.enabled {
            return Err(Error::NotInDemoMode);
        }
        let claim = Self::read_dataset(&self.dataset, |dataset| {
            dataset.claims.iter().find(|claim| claim.id == claim_id).cloned()
        })
        .ok_or_else(|| Error::ClaimNotFound(claim_id.to_string()))?;

        if claim.status() == ClaimStatus::Verifying {
            log_demo_event(
                &self.config,
                DemoEvent::DemoConsensusViewed,
                Some(json!({ "claimId": claim_id })),
            );
        }
        let generator = lock(&self.generator).fork();
        Ok(ConsensusAnimation::start(
            claim,
            self.config.consensus_update_interval,
            generator,
        ))
    }

    /// `None` outside demo mode.
    pub fn realtime_updates(&self) -> Option<RealtimeFeed> {
        if !self.config.enabled {
            return None;
        }
        let generator = lock(&self.generator).fork();
        Some(RealtimeFeed::start(
            self.config.consensus_update_interval,
            generator,
        ))
    }

    pub fn claim_submitter(&self) -> ClaimSubmitter {
        ClaimSubmitter::new(self.config.clone())
    }

    pub fn banner<S: BannerStore>(&self, store: S) -> Result<DemoBanner<S>, Error> {
        DemoBanner::new(&self.config, store)
    }
}

/// Live view of the session wallet for one consumer.
pub struct WalletBinding {
    wallet: Option<MockWalletProvider>,
    config: DemoConfig,
    view: watch::Receiver<WalletState>,
    listener: Option<ListenerId>,
    token: CancellationToken,
}

impl WalletBinding {
    fn new(wallet: Option<MockWalletProvider>, config: DemoConfig) -> Self {
        let initial = wallet.as_ref().map(MockWalletProvider::state).unwrap_or_default();
        let (sender, view) = watch::channel(initial);
        let token = CancellationToken::new();

        let listener = wallet.as_ref().map(|wallet| {
            let sender = Arc::new(sender);
            let id = wallet.on_fn(EventKind::StateChanged, move |event| {
                if let WalletEvent::StateChanged(state) = event {
                    sender.send_replace(state.clone());
                }
                Ok(())
            });

            if config.enabled && wallet.state().status == ConnectionStatus::Disconnected {
                let wallet = wallet.clone();
                let config = config.clone();
                let token = token.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => debug!("Wallet auto-connect cancelled"),
                        _ = connect_logged(&wallet, &config) => {}
                    }
                });
            }
            id
        });

        Self {
            wallet,
            config,
            view,
            listener,
            token,
        }
    }

    pub fn state(&self) -> WalletState {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.view.clone()
    }

    pub fn is_demo(&self) -> bool {
        self.config.enabled
    }

    /// Resolves once the wallet reports `connected`. Returns immediately
    /// when there is no wallet.
    pub async fn connected(&mut self) -> WalletState {
        if self.wallet.is_some() {
            let _ = self
                .view
                .wait_for(|state| state.status == ConnectionStatus::Connected)
                .await;
        }
        self.state()
    }

    pub async fn connect(&self) -> Option<String> {
        let wallet = self.wallet.as_ref()?;
        Some(connect_logged(wallet, &self.config).await)
    }

    pub async fn disconnect(&self) {
        if let Some(wallet) = &self.wallet {
            wallet.disconnect().await;
            log_demo_event(
                &self.config,
                DemoEvent::DemoWalletConnected,
                Some(json!({ "action": "disconnected" })),
            );
        }
    }

    pub async fn sign_message(&self, message: &str) -> Result<String, Error> {
        let wallet = self.wallet.as_ref().ok_or(Error::WalletUnavailable)?;
        let signature = wallet.sign_message(message).await?;
        log_demo_event(
            &self.config,
            DemoEvent::DemoTransactionSimulated,
            Some(json!({ "action": "signMessage", "message": message })),
        );
        Ok(signature)
    }

    pub async fn switch_network(&self, chain_id: u64) -> Result<(), Error> {
        let wallet = self.wallet.as_ref().ok_or(Error::WalletUnavailable)?;
        wallet.switch_network(chain_id).await;
        log_demo_event(
            &self.config,
            DemoEvent::DemoTransactionSimulated,
            Some(json!({ "action": "switchNetwork", "chainId": chain_id })),
        );
        Ok(())
    }

    /// Read-only contract call; the answer is canned.
    pub async fn call(&self, request: TransactionRequest) -> Result<String, Error> {
        let wallet = self.wallet.as_ref().ok_or(Error::WalletUnavailable)?;
        let to = request.to.clone();
        let result = wallet.call(request).await;
        log_demo_event(
            &self.config,
            DemoEvent::DemoTransactionSimulated,
            Some(json!({ "action": "call", "to": to })),
        );
        Ok(result)
    }

    pub async fn send_transaction(&self, request: TransactionRequest) -> Result<String, Error> {
        let wallet = self.wallet.as_ref().ok_or(Error::WalletUnavailable)?;
        match wallet.send_transaction(request).await {
            Ok(hash) => {
                WALLET_TRANSACTIONS_TOTAL.with_label_values(&["sent"]).inc();
                log_demo_event(
                    &self.config,
                    DemoEvent::DemoTransactionSimulated,
                    Some(json!({ "action": "sendTransaction", "txHash": hash })),
                );
                Ok(hash)
            }
            Err(err) => {
                WALLET_TRANSACTIONS_TOTAL.with_label_values(&["rejected"]).inc();
                Err(err.into())
            }
        }
    }

    pub async fn wait_for_transaction(
        &self,
        hash: &str,
        confirmations: u32,
    ) -> Result<TransactionReceipt, Error> {
        let wallet = self.wallet.as_ref().ok_or(Error::WalletUnavailable)?;
        let outcome = wallet.wait_for_transaction(hash, confirmations).await;
        let label = if outcome.is_ok() { "confirmed" } else { "failed" };
        WALLET_TRANSACTIONS_TOTAL.with_label_values(&[label]).inc();
        Ok(outcome?)
    }
}

/// Connects and records `connecting` then `connected` analytics events.
async fn connect_logged(wallet: &MockWalletProvider, config: &DemoConfig) -> String {
    log_demo_event(
        config,
        DemoEvent::DemoWalletConnected,
        Some(json!({ "action": "connecting" })),
    );
    let address = wallet.connect().await;
    log_demo_event(
        config,
        DemoEvent::DemoWalletConnected,
        Some(json!({ "action": "connected", "address": address })),
    );
    address
}

impl Drop for WalletBinding {
    fn drop(&mut self) {
        self.token.cancel();
        if let (Some(wallet), Some(id)) = (&self.wallet, self.listener) {
            wallet.off(EventKind::StateChanged, id);
        }
    }
}

/// Largest amount a single claim may bill, in USD.
pub const MAX_CLAIM_AMOUNT: f64 = 1_000_000.0;

static CPT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{5}(-\d{2})?$").expect("CPT pattern is valid"));

static ICD10_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]\d{2}(\.\d{1,4})?$").expect("ICD-10 pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmitClaimData {
    pub patient_id: String,
    pub diagnosis_codes: Vec<String>,
    pub procedure_codes: Vec<String>,
    /// USD
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub success: bool,
    pub tx_hash: String,
    pub claim_id: String,
}

/// Collects every problem with `data` rather than stopping at the first.
pub fn validate_submission(data: &SubmitClaimData) -> Result<(), Error> {
    let mut problems = Vec::new();

    let missing: Vec<&str> = [
        ("patient_id", data.patient_id.trim().is_empty()),
        ("procedure_codes", data.procedure_codes.is_empty()),
        ("diagnosis_codes", data.diagnosis_codes.is_empty()),
    ]
    .into_iter()
    .filter_map(|(field, absent)| absent.then_some(field))
    .collect();
    if !missing.is_empty() {
        problems.push(format!("Missing required fields: {}", missing.join(", ")));
    }

    for code in data.procedure_codes.iter().filter(|code| !CPT_PATTERN.is_match(code)) {
        problems.push(format!("Invalid CPT code: {code}"));
    }
    for code in data.diagnosis_codes.iter().filter(|code| !ICD10_PATTERN.is_match(code)) {
        problems.push(format!("Invalid ICD-10 code format: {code}"));
    }

    if !data.amount.is_finite() || data.amount <= 0.0 {
        problems.push("Amount must be positive".to_string());
    } else if data.amount > MAX_CLAIM_AMOUNT {
        problems.push("Amount exceeds maximum allowed".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidSubmission(problems))
    }
}

/// Simulated claim submission with `submitting` and last-error tracking.
pub struct ClaimSubmitter {
    config: DemoConfig,
    submitting: AtomicBool,
    error: Mutex<Option<String>>,
}

impl ClaimSubmitter {
    pub fn new(config: DemoConfig) -> Self {
        Self {
            config,
            submitting: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.error).clone()
    }

    pub async fn submit_claim(&self, data: &SubmitClaimData) -> Result<SubmissionReceipt, Error> {
        if !self.config.enabled {
            return Err(Error::NotInDemoMode);
        }

        self.submitting.store(true, Ordering::SeqCst);
        *lock(&self.error) = None;

        let outcome = self.submit(data).await;

        if let Err(err) = &outcome {
            warn!("Claim submission failed: {err}");
            *lock(&self.error) = Some(err.to_string());
        }
        self.submitting.store(false, Ordering::SeqCst);
        outcome
    }

    async fn submit(&self, data: &SubmitClaimData) -> Result<SubmissionReceipt, Error> {
        validate_submission(data)?;

        tokio::time::sleep(self.config.transaction_delay).await;

        let now = unix_millis();
        let tx_hash = format!("0xdemo{now}");
        let mut metadata = serde_json::to_value(data)?;
        if let Some(fields) = metadata.as_object_mut() {
            fields.insert("txHash".to_string(), json!(tx_hash));
        }
        log_demo_event(&self.config, DemoEvent::DemoClaimSubmitted, Some(metadata));

        Ok(SubmissionReceipt {
            success: true,
            tx_hash,
            claim_id: format!("claim_{now}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::banner::MemoryBannerStore;
    use std::time::Duration;

    const NOW: i64 = 1_760_000_000_000;

    fn demo_session() -> DemoSession {
        DemoSession::with_generator(
            DemoConfig::demo(),
            MockDataGenerator::seeded(21).with_clock(NOW),
        )
    }

    fn valid_submission() -> SubmitClaimData {
        SubmitClaimData {
            patient_id: "PT000123".to_string(),
            diagnosis_codes: vec!["E11.9".to_string()],
            procedure_codes: vec!["99213".to_string()],
            amount: 150.0,
            description: "Office visit".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_outside_demo_mode_everything_is_inert() {
        let session = DemoSession::seeded(DemoConfig::default(), 1);
        assert!(!session.status().enabled);
        assert!(session.wallet().is_none());

        let claims = session.claims(ClaimFilter::default());
        assert!(!claims.is_loading());
        assert!(claims.data().is_empty());
        assert_eq!(session.provider_stats().data(), None);
        assert_eq!(session.claim(Some("claim_1_0")).data(), None);
        assert!(session.realtime_updates().is_none());
        assert!(matches!(
            session.animate_consensus("claim_1_0"),
            Err(Error::NotInDemoMode)
        ));

        let binding = session.bind_wallet();
        assert_eq!(binding.state(), WalletState::default());
        assert_eq!(binding.connect().await, None);
        let err = binding
            .send_transaction(TransactionRequest::to("0xabc"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Wallet not available");

        let err = session
            .claim_submitter()
            .submit_claim(&valid_submission())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not in demo mode");
    }

    #[tokio::test(start_paused = true)]
    async fn test_claims_load_after_fetch_delay() {
        let session = demo_session();
        let mut claims = session.claims(ClaimFilter::default());
        assert!(claims.is_loading());

        tokio::time::sleep(Duration::from_millis(299)).await;
        assert!(claims.is_loading());
        assert_eq!(claims.loaded().await.len(), 14);

        let mut verified = session.claims(ClaimFilter {
            status: Some(ClaimStatus::Verified),
            limit: Some(3),
        });
        let verified = verified.loaded().await;
        assert_eq!(verified.len(), 3);
        assert!(verified.iter().all(|claim| claim.status() == ClaimStatus::Verified));
    }

    #[tokio::test(start_paused = true)]
    async fn test_views_share_one_snapshot() {
        let session = demo_session();
        let snapshot = session.dataset();
        let target = snapshot.claims[4].clone();

        let mut claim = session.claim(Some(target.id.as_str()));
        assert_eq!(claim.loaded().await, Some(target));

        let mut stats = session.provider_stats();
        let stats = stats.loaded().await.unwrap();
        assert_eq!(stats.total_claims, snapshot.claims.len());
        assert_eq!(stats.verified_claims, 8);

        let mut transactions = session.transactions(Some(5));
        assert_eq!(transactions.loaded().await, snapshot.transactions[..5].to_vec());

        let mut missing = session.claim(Some("claim_0_0"));
        assert_eq!(missing.loaded().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_regenerate_replaces_snapshot() {
        let session = demo_session();
        let before = session.dataset();
        session.regenerate();
        let after = session.dataset();
        assert_eq!(after.claims.len(), 14);
        assert_ne!(
            before.claims.iter().map(|c| &c.patient_id).collect::<Vec<_>>(),
            after.claims.iter().map(|c| &c.patient_id).collect::<Vec<_>>()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_binding_auto_connects_and_unsubscribes() {
        let session = demo_session();
        let wallet = session.wallet().unwrap().clone();
        let mut binding = session.bind_wallet();
        assert_eq!(wallet.listener_count(EventKind::StateChanged), 1);

        let state = binding.connected().await;
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert_eq!(state.address.as_deref(), Some(mock_wallet::DEMO_WALLETS[0]));

        let hash = binding
            .send_transaction(TransactionRequest::to("0xabc"))
            .await
            .unwrap();
        let receipt = binding.wait_for_transaction(&hash, 1).await.unwrap();
        assert_eq!(receipt.hash, hash);

        binding.disconnect().await;
        assert_eq!(binding.state().status, ConnectionStatus::Disconnected);

        drop(binding);
        assert_eq!(wallet.listener_count(EventKind::StateChanged), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_animate_first_verifying_claim() {
        let session = demo_session();
        let claim = session.first_verifying_claim().unwrap();
        let mut animation = session.animate_consensus(&claim.id).unwrap();
        assert!(animation.is_animating());
        assert!(animation.settled().await.status().is_terminal());

        assert!(matches!(
            session.animate_consensus("claim_0_0"),
            Err(Error::ClaimNotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_updates_reference_verifying_claims() {
        let session = demo_session();
        let feed = session.realtime_updates().unwrap();
        tokio::time::sleep(Duration::from_millis(3000 * 2 + 10)).await;
        assert_eq!(feed.updates().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_claim_success() {
        let session = demo_session();
        let submitter = Arc::new(session.claim_submitter());
        let task = tokio::spawn({
            let submitter = submitter.clone();
            async move { submitter.submit_claim(&valid_submission()).await }
        });
        tokio::task::yield_now().await;
        assert!(submitter.is_submitting());

        let receipt = task.await.unwrap().unwrap();
        assert!(receipt.success);
        assert!(receipt.tx_hash.starts_with("0xdemo"));
        assert!(receipt.claim_id.starts_with("claim_"));
        assert!(!submitter.is_submitting());
        assert_eq!(submitter.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_claim_reports_every_problem() {
        let submitter = demo_session().claim_submitter();
        let data = SubmitClaimData {
            patient_id: String::new(),
            diagnosis_codes: vec!["e11".to_string()],
            procedure_codes: vec!["9921".to_string()],
            amount: 2_000_000.0,
            description: String::new(),
        };

        match submitter.submit_claim(&data).await {
            Err(Error::InvalidSubmission(problems)) => {
                assert_eq!(
                    problems,
                    vec![
                        "Missing required fields: patient_id".to_string(),
                        "Invalid CPT code: 9921".to_string(),
                        "Invalid ICD-10 code format: e11".to_string(),
                        "Amount exceeds maximum allowed".to_string(),
                    ]
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(submitter.last_error().unwrap().starts_with("Invalid claim submission"));
        assert!(!submitter.is_submitting());
    }

    #[test]
    fn test_validation_accepts_modifiers_and_decimals() {
        let data = SubmitClaimData {
            procedure_codes: vec!["99213-25".to_string()],
            diagnosis_codes: vec!["Z00.00".to_string(), "I10".to_string()],
            ..valid_submission()
        };
        assert!(validate_submission(&data).is_ok());

        let zero = SubmitClaimData {
            amount: 0.0,
            ..valid_submission()
        };
        assert!(validate_submission(&zero).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_wallet_operation_is_recorded() {
        use crate::metrics::DEMO_EVENTS_TOTAL;

        let connected = DEMO_EVENTS_TOTAL.with_label_values(&["demo_wallet_connected"]);
        let simulated = DEMO_EVENTS_TOTAL.with_label_values(&["demo_transaction_simulated"]);
        let session = demo_session();
        let mut binding = session.bind_wallet();

        let connected_before = connected.get();
        binding.connected().await;
        // connecting + connected from the auto-connect
        assert!(connected.get() >= connected_before + 2);

        let simulated_before = simulated.get();
        binding
            .call(TransactionRequest::to("0xabc"))
            .await
            .unwrap();
        let signature = binding.sign_message("hello").await.unwrap();
        assert!(signature.starts_with("0xdemo_signature_"));
        binding.switch_network(1).await.unwrap();
        assert_eq!(binding.state().chain_id, Some(1));
        assert!(simulated.get() >= simulated_before + 3);

        let connected_before = connected.get();
        binding.disconnect().await;
        assert!(connected.get() >= connected_before + 1);
        assert_eq!(binding.state().status, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_wallet_operations_need_a_wallet() {
        let binding = DemoSession::seeded(DemoConfig::default(), 1).bind_wallet();
        assert!(matches!(
            binding.sign_message("hello").await,
            Err(Error::WalletUnavailable)
        ));
        assert!(matches!(
            binding.switch_network(1).await,
            Err(Error::WalletUnavailable)
        ));
        assert!(matches!(
            binding.call(TransactionRequest::to("0xabc")).await,
            Err(Error::WalletUnavailable)
        ));
    }

    #[test]
    fn test_inert_session_needs_no_runtime() {
        let session = DemoSession::seeded(DemoConfig::default(), 1);
        assert!(session.claims(ClaimFilter::default()).data().is_empty());
        assert_eq!(session.claim(Some("claim_1_0")).data(), None);
        assert!(session.transactions(None).data().is_empty());
        assert_eq!(session.provider_stats().data(), None);
        assert!(session.realtime_updates().is_none());
        assert!(!session.bind_wallet().is_demo());
    }

    #[test]
    fn test_only_session_snapshots_count_generated_claims() {
        let appealing = GENERATED_CLAIMS_TOTAL.with_label_values(&["appealing"]);
        let verified = GENERATED_CLAIMS_TOTAL.with_label_values(&["verified"]);

        let before = appealing.get();
        let mut generator = MockDataGenerator::seeded(4).with_clock(NOW);
        generator.generate_claim(0, ClaimStatus::Appealing, 2);
        generator.generate_mock_claims();
        assert_eq!(appealing.get(), before);

        let before = verified.get();
        let dataset = Dataset::generate(&mut generator);
        assert_eq!(dataset.claims.len(), 14);
        assert!(verified.get() >= before + 8);
    }

    #[test]
    fn test_banner_follows_session_mode() {
        let session = DemoSession::seeded(DemoConfig::demo(), 3);
        assert!(session.banner(MemoryBannerStore::default()).unwrap().visible());
    }
}
