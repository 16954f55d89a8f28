//! Timer-driven consensus animation and the simulated realtime feed.
//!
//! Each driver owns a `CancellationToken`; stopping or dropping the handle
//! cancels its timer.

use crate::claim::{Claim, ClaimStatus};
use crate::mock_data::MockDataGenerator;
use rand::Rng;
use serde_derive::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Updates retained by [`RealtimeFeed`], newest first.
pub const REALTIME_FEED_CAPACITY: usize = 10;

pub const CONSENSUS_UPDATE: &str = "consensus_update";

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Advances one verifying claim a vote per tick until it settles.
pub struct ConsensusAnimation {
    claim: watch::Receiver<Claim>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ConsensusAnimation {
    /// Starts animating `claim`. Claims that are not verifying are held
    /// as-is and no timer is created.
    pub fn start<R>(claim: Claim, period: Duration, mut generator: MockDataGenerator<R>) -> Self
    where
        R: Rng + Send + 'static,
    {
        let token = CancellationToken::new();
        let (sender, receiver) = watch::channel(claim.clone());

        if claim.status() != ClaimStatus::Verifying {
            debug!(claim = %claim.id, status = %claim.status(), "Nothing to animate");
            return Self {
                claim: receiver,
                token,
                handle: None,
            };
        }

        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = ticker(period);
            let mut current = claim;
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => {
                        debug!(claim = %current.id, "Consensus animation cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let next = generator.update_consensus_progress(&current);
                        let stalled = next == current;
                        current = next;
                        sender.send_replace(current.clone());

                        if current.status() != ClaimStatus::Verifying || stalled {
                            info!(claim = %current.id, status = %current.status(), "Consensus animation finished");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            claim: receiver,
            token,
            handle: Some(handle),
        }
    }

    pub fn claim(&self) -> Claim {
        self.claim.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Claim> {
        self.claim.clone()
    }

    pub fn is_animating(&self) -> bool {
        self.claim.borrow().status() == ClaimStatus::Verifying
            && self
                .handle
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
            && !self.token.is_cancelled()
    }

    /// Waits until the claim leaves `verifying` or the animation stops, and
    /// returns the last published claim.
    pub async fn settled(&mut self) -> Claim {
        let token = self.token.clone();
        tokio::select! {
            _ = token.cancelled() => {}
            _ = self.claim.wait_for(|claim| claim.status() != ClaimStatus::Verifying) => {}
        }
        self.claim()
    }

    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for ConsensusAnimation {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeUpdate {
    #[serde(rename = "type")]
    pub kind: String,
    pub claim_id: String,
    pub timestamp: i64,
}

/// Simulated push channel: every period, announces a vote on a random
/// verifying claim from a fresh dataset.
pub struct RealtimeFeed {
    updates: Arc<watch::Sender<Vec<RealtimeUpdate>>>,
    token: CancellationToken,
}

impl RealtimeFeed {
    pub fn start<R>(period: Duration, mut generator: MockDataGenerator<R>) -> Self
    where
        R: Rng + Send + 'static,
    {
        let (sender, _) = watch::channel(Vec::new());
        let updates = Arc::new(sender);
        let token = CancellationToken::new();

        let task_updates = updates.clone();
        let task_token = token.clone();
        tokio::spawn(async move {
            let mut ticker = ticker(period);
            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let verifying = generator.get_verifying_claims();
                        if verifying.is_empty() {
                            continue;
                        }
                        let claim = &verifying[generator.rng().gen_range(0..verifying.len())];
                        let update = RealtimeUpdate {
                            kind: CONSENSUS_UPDATE.to_string(),
                            claim_id: claim.id.clone(),
                            timestamp: generator.now(),
                        };
                        task_updates.send_modify(|updates| {
                            updates.insert(0, update);
                            updates.truncate(REALTIME_FEED_CAPACITY);
                        });
                    }
                }
            }
        });

        Self { updates, token }
    }

    pub fn updates(&self) -> Vec<RealtimeUpdate> {
        self.updates.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<RealtimeUpdate>> {
        self.updates.subscribe()
    }

    pub fn clear(&self) {
        self.updates.send_replace(Vec::new());
    }

    pub fn stop(&self) {
        self.token.cancel();
    }
}

impl Drop for RealtimeFeed {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
