use crate::accounts::{generate_demo_tx_hash, DEMO_BALANCE, DEMO_CHAIN_ID, DEMO_WALLETS};
use crate::error::Error;
use crate::events::{EventKind, Listener, ListenerError, ListenerId, ListenerRegistry, WalletEvent};
use crate::types::{
    ConnectionStatus, ReceiptStatus, TransactionReceipt, TransactionRequest, WalletState,
};
use crate::unix_millis;
use ethers_core::types::U256;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Gas reported by every simulated confirmation.
pub const SIMULATED_GAS_USED: &str = "21000";

#[derive(Debug, Clone)]
pub struct WalletConfig {
    /// Simulated handshake latency for `connect`
    pub connect_delay: Duration,
    /// Time between `send_transaction` and its confirmation
    pub transaction_delay: Duration,
    pub receipt_delay: Duration,
    pub call_delay: Duration,
    pub sign_delay: Duration,
    pub switch_delay: Duration,
    /// Receipt polling period used by `wait_for_transaction`
    pub poll_interval: Duration,
    pub address: String,
    pub chain_id: u64,
    /// Balance in ETH
    pub balance: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            connect_delay: Duration::from_millis(500),
            transaction_delay: Duration::from_millis(1500),
            receipt_delay: Duration::from_millis(100),
            call_delay: Duration::from_millis(100),
            sign_delay: Duration::from_millis(500),
            switch_delay: Duration::from_millis(300),
            poll_interval: Duration::from_millis(500),
            address: DEMO_WALLETS[0].to_string(),
            chain_id: DEMO_CHAIN_ID,
            balance: DEMO_BALANCE.to_string(),
        }
    }
}

struct Inner {
    config: WalletConfig,
    state: watch::Sender<WalletState>,
    listeners: ListenerRegistry,
    receipts: Mutex<HashMap<String, TransactionReceipt>>,
    rng: Mutex<StdRng>,
    /// Parent of every scheduled confirmation; replaced on disconnect.
    lifecycle: Mutex<CancellationToken>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory stand-in for an injected browser wallet.
///
/// Cloning yields another handle to the same wallet. Separate calls to
/// [`MockWalletProvider::new`] give fully isolated wallets.
#[derive(Clone)]
pub struct MockWalletProvider {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for MockWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockWalletProvider")
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl Default for MockWalletProvider {
    fn default() -> Self {
        Self::new(WalletConfig::default())
    }
}

impl MockWalletProvider {
    pub fn new(config: WalletConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: WalletConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: WalletConfig, rng: StdRng) -> Self {
        let (state, _) = watch::channel(WalletState::default());
        Self {
            inner: Arc::new(Inner {
                config,
                state,
                listeners: ListenerRegistry::default(),
                receipts: Mutex::new(HashMap::new()),
                rng: Mutex::new(rng),
                lifecycle: Mutex::new(CancellationToken::new()),
            }),
        }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.inner.config
    }

    /// Runs the handshake: `connecting`, a fixed delay, then `connected` with
    /// the configured account. Calling it again replays the same sequence.
    pub async fn connect(&self) -> String {
        self.update_state(|state| {
            state.status = ConnectionStatus::Connecting;
            state.error = None;
        });
        debug!("Mock wallet connecting");

        tokio::time::sleep(self.inner.config.connect_delay).await;

        let address = self.inner.config.address.clone();
        let chain_id = self.inner.config.chain_id;
        self.update_state(|state| {
            *state = WalletState {
                status: ConnectionStatus::Connected,
                address: Some(address.clone()),
                chain_id: Some(chain_id),
                balance: Some(self.inner.config.balance.clone()),
                error: None,
            };
        });
        info!(%address, chain_id, "Mock wallet connected");

        self.emit(WalletEvent::AccountsChanged(vec![address.clone()]));
        self.emit(WalletEvent::ChainChanged(chain_id));
        address
    }

    /// Resets to `disconnected` and cancels every pending confirmation.
    /// Receipts that were still pending are marked failed.
    pub async fn disconnect(&self) {
        let cancelled = self.cancel_outstanding();
        self.update_state(|state| *state = WalletState::default());
        self.emit(WalletEvent::AccountsChanged(Vec::new()));
        info!(cancelled, "Mock wallet disconnected");
    }

    /// Returns the wallet to a fresh state and drops all subscribers.
    pub fn reset(&self) {
        self.cancel_outstanding();
        lock(&self.inner.receipts).clear();
        self.inner.listeners.clear();
        self.inner.state.send_replace(WalletState::default());
    }

    /// Cancels outstanding confirmations without touching the connection
    /// state. Pending receipts are marked failed; later transactions confirm
    /// as usual.
    pub fn shutdown(&self) {
        let cancelled = self.cancel_outstanding();
        info!(cancelled, "Mock wallet timers shut down");
    }

    pub fn state(&self) -> WalletState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletState> {
        self.inner.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        let state = self.inner.state.borrow();
        state.status == ConnectionStatus::Connected && state.address.is_some()
    }

    pub fn address(&self) -> Option<String> {
        self.inner.state.borrow().address.clone()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.inner.state.borrow().chain_id
    }

    pub fn balance(&self) -> Option<String> {
        self.inner.state.borrow().balance.clone()
    }

    /// Records the transaction as pending and returns its hash right away.
    /// Confirmation lands after `transaction_delay` unless the wallet is
    /// disconnected first.
    pub async fn send_transaction(&self, request: TransactionRequest) -> Result<String, Error> {
        let from = match (self.is_connected(), self.address()) {
            (true, Some(address)) => address,
            _ => return Err(Error::WalletNotConnected),
        };

        let now = unix_millis();
        let hash = generate_demo_tx_hash(&mut *lock(&self.inner.rng), now);
        let receipt = TransactionReceipt {
            hash: hash.clone(),
            from,
            to: request.to.clone(),
            status: ReceiptStatus::Pending,
            block_number: None,
            timestamp: now,
            gas_used: None,
        };
        lock(&self.inner.receipts).insert(hash.clone(), receipt);
        info!(%hash, to = %request.to, value = ?request.value, "Simulated transaction sent");

        let token = lock(&self.inner.lifecycle).child_token();
        let wallet = Arc::downgrade(&self.inner);
        let delay = self.inner.config.transaction_delay;
        let task_hash = hash.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(hash = %task_hash, "Confirmation cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    confirm(wallet, &task_hash);
                }
            }
        });

        Ok(hash)
    }

    pub async fn get_transaction_receipt(&self, hash: &str) -> Option<TransactionReceipt> {
        tokio::time::sleep(self.inner.config.receipt_delay).await;
        lock(&self.inner.receipts).get(hash).cloned()
    }

    /// Polls the receipt every `poll_interval` until it has been seen
    /// confirmed on `confirmations` polls. A value of 0 behaves like 1.
    pub async fn wait_for_transaction(
        &self,
        hash: &str,
        confirmations: u32,
    ) -> Result<TransactionReceipt, Error> {
        let confirmations = confirmations.max(1);
        let mut seen = 0;
        loop {
            match self.get_transaction_receipt(hash).await {
                None => return Err(Error::UnknownTransaction(hash.to_string())),
                Some(receipt) => match receipt.status {
                    ReceiptStatus::Failed => {
                        return Err(Error::TransactionFailed(hash.to_string()))
                    }
                    ReceiptStatus::Confirmed => {
                        seen += 1;
                        if seen >= confirmations {
                            return Ok(receipt);
                        }
                    }
                    ReceiptStatus::Pending => {}
                },
            }
            tokio::time::sleep(self.inner.config.poll_interval).await;
        }
    }

    /// Read-only contract call. `request.data` is not interpreted; the
    /// answer is always the ABI word for 1.
    pub async fn call(&self, request: TransactionRequest) -> String {
        tokio::time::sleep(self.inner.config.call_delay).await;

        let selector: String = request
            .data
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(20)
            .collect();
        debug!(to = %request.to, data = %selector, "Simulated contract call");

        let mut word = [0u8; 32];
        U256::one().to_big_endian(&mut word);
        format!("0x{}", hex::encode(word))
    }

    pub async fn sign_message(&self, message: &str) -> Result<String, Error> {
        if !self.is_connected() {
            return Err(Error::WalletNotConnected);
        }

        tokio::time::sleep(self.inner.config.sign_delay).await;

        let preview: String = message.chars().take(10).collect();
        let signature = format!("0xdemo_signature_{}_{preview}", unix_millis());
        let logged: String = message.chars().take(50).collect();
        debug!(message = %logged, "Simulated message signature");
        Ok(signature)
    }

    pub async fn switch_network(&self, chain_id: u64) {
        tokio::time::sleep(self.inner.config.switch_delay).await;

        self.update_state(|state| state.chain_id = Some(chain_id));
        self.emit(WalletEvent::ChainChanged(chain_id));
        info!(chain_id, "Mock wallet switched network");
    }

    pub fn on(&self, kind: EventKind, listener: Listener) -> ListenerId {
        self.inner.listeners.add(kind, listener)
    }

    pub fn on_fn<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&WalletEvent) -> Result<(), ListenerError> + Send + Sync + 'static,
    {
        self.on(kind, Arc::new(listener))
    }

    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        self.inner.listeners.remove(kind, id)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.inner.listeners.count(kind)
    }

    fn emit(&self, event: WalletEvent) {
        self.inner.listeners.emit(&event);
    }

    fn update_state(&self, update: impl FnOnce(&mut WalletState)) {
        self.inner.state.send_modify(update);
        self.emit(WalletEvent::StateChanged(self.state()));
    }

    fn cancel_outstanding(&self) -> usize {
        {
            let mut lifecycle = lock(&self.inner.lifecycle);
            lifecycle.cancel();
            *lifecycle = CancellationToken::new();
        }

        let mut receipts = lock(&self.inner.receipts);
        let mut cancelled = 0;
        for receipt in receipts.values_mut() {
            if receipt.status == ReceiptStatus::Pending {
                receipt.status = ReceiptStatus::Failed;
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            warn!(cancelled, "Pending transactions abandoned");
        }
        cancelled
    }
}

fn confirm(wallet: Weak<Inner>, hash: &str) {
    let Some(inner) = wallet.upgrade() else {
        return;
    };
    let wallet = MockWalletProvider { inner };

    let confirmed = {
        let mut receipts = lock(&wallet.inner.receipts);
        match receipts.get_mut(hash) {
            Some(receipt) if receipt.status == ReceiptStatus::Pending => {
                receipt.status = ReceiptStatus::Confirmed;
                receipt.block_number =
                    Some(lock(&wallet.inner.rng).gen_range(5_000_000..6_000_000));
                receipt.gas_used = Some(SIMULATED_GAS_USED.to_string());
                receipt.clone()
            }
            _ => return,
        }
    };

    info!(hash, block_number = ?confirmed.block_number, "Simulated transaction confirmed");
    wallet.emit(WalletEvent::TransactionConfirmed(confirmed));
}
