//! Provider-style event subscription (`on` / `off` / `emit`).

use crate::types::{TransactionReceipt, WalletState};
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AccountsChanged,
    ChainChanged,
    StateChanged,
    TransactionConfirmed,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AccountsChanged => "accountsChanged",
            EventKind::ChainChanged => "chainChanged",
            EventKind::StateChanged => "stateChanged",
            EventKind::TransactionConfirmed => "transactionConfirmed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accountsChanged" => Ok(EventKind::AccountsChanged),
            "chainChanged" => Ok(EventKind::ChainChanged),
            "stateChanged" => Ok(EventKind::StateChanged),
            "transactionConfirmed" => Ok(EventKind::TransactionConfirmed),
            other => Err(format!("Unknown wallet event: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WalletEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
    StateChanged(WalletState),
    TransactionConfirmed(TransactionReceipt),
}

impl WalletEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WalletEvent::AccountsChanged(_) => EventKind::AccountsChanged,
            WalletEvent::ChainChanged(_) => EventKind::ChainChanged,
            WalletEvent::StateChanged(_) => EventKind::StateChanged,
            WalletEvent::TransactionConfirmed(_) => EventKind::TransactionConfirmed,
        }
    }
}

pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;

/// Callback invoked synchronously for every matching event.
pub type Listener = Arc<dyn Fn(&WalletEvent) -> Result<(), ListenerError> + Send + Sync>;

/// Handle returned by `on`, needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<HashMap<EventKind, Vec<(ListenerId, Listener)>>>,
}

impl ListenerRegistry {
    pub fn add(&self, kind: EventKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(kind)
            .or_default()
            .push((id, listener));
        trace!(event = %kind, ?id, "Listener added");
        id
    }

    pub fn remove(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match listeners.get_mut(&kind) {
            Some(entries) => {
                let before = entries.len();
                entries.retain(|(entry_id, _)| *entry_id != id);
                before != entries.len()
            }
            None => false,
        }
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .map_or(0, Vec::len)
    }

    pub fn clear(&self) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Delivers `event` to every listener of its kind and returns how many
    /// handled it cleanly. Failing or panicking listeners are logged and
    /// skipped; the rest still run.
    pub fn emit(&self, event: &WalletEvent) -> usize {
        let kind = event.kind();
        // snapshot so callbacks run without the lock held
        let snapshot: Vec<(ListenerId, Listener)> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        let mut delivered = 0;
        for (id, listener) in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(err)) => error!(event = %kind, ?id, "Error in {kind} listener: {err}"),
                Err(_) => error!(event = %kind, ?id, "Listener for {kind} panicked"),
            }
        }
        delivered
    }
}
