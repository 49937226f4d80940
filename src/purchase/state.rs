use crate::{
    config::MAX_TICKETS_PER_PURCHASE,
    gateway::TransactionHandle,
};
use std::fmt;
use tokio::sync::watch;
use tracing::debug;

const SUBMISSION_FALLBACK_MESSAGE: &str =
    "We couldn't process your ticket purchase. Want to try again?";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidNumbers,
    InsufficientFunds,
    TicketCountExceeded,
    /// Rejected dry run with no recognised reason.
    Generic,
    /// Broadcast or confirmation failed after a successful dry run.
    Submission,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseFailure {
    pub kind: FailureKind,
    /// Underlying message from the contract or chain client.
    pub detail: String,
}

impl PurchaseFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn submission(detail: impl Into<String>) -> Self {
        Self::new(FailureKind::Submission, detail)
    }

    pub fn user_message(&self) -> String {
        match self.kind {
            FailureKind::InvalidNumbers => "Invalid ticket numbers".to_owned(),
            FailureKind::InsufficientFunds => "Insufficient funds".to_owned(),
            FailureKind::TicketCountExceeded => {
                format!("Max {MAX_TICKETS_PER_PURCHASE} tickets per purchase")
            }
            FailureKind::Generic => "Transaction failed. Please try again".to_owned(),
            FailureKind::Submission if self.detail.trim().is_empty() => {
                SUBMISSION_FALLBACK_MESSAGE.to_owned()
            }
            FailureKind::Submission => self.detail.clone(),
        }
    }
}

impl fmt::Display for PurchaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_message())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TransactionState {
    #[default]
    Idle,
    Simulating,
    /// Dry run passed; the handle is known once the broadcast returns.
    Pending(Option<TransactionHandle>),
    Success(Option<TransactionHandle>),
    Failed(PurchaseFailure),
}

impl TransactionState {
    /// A purchase is in flight and the trigger must stay disabled.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            TransactionState::Simulating | TransactionState::Pending(_)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Success(_) | TransactionState::Failed(_)
        )
    }

    pub fn failure(&self) -> Option<&PurchaseFailure> {
        match self {
            TransactionState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionEvent {
    Start,
    Simulated,
    SimulationFailed(PurchaseFailure),
    Submitted(TransactionHandle),
    Confirmed,
    Failed(PurchaseFailure),
    Reset,
}

/// Events that do not apply to `state` leave it unchanged.
pub fn transition(state: &TransactionState, event: TransactionEvent) -> TransactionState {
    use TransactionEvent as E;
    use TransactionState as S;

    match (state, event) {
        (S::Idle, E::Start) => S::Simulating,
        (S::Simulating, E::Simulated) => S::Pending(None),
        (S::Simulating, E::SimulationFailed(failure)) => S::Failed(failure),
        (S::Pending(None), E::Submitted(handle)) => S::Pending(Some(handle)),
        (S::Pending(handle), E::Confirmed) => S::Success(*handle),
        (S::Pending(_), E::Failed(failure)) => S::Failed(failure),
        (S::Success(_) | S::Failed(_), E::Reset) => S::Idle,
        (current, _) => current.clone(),
    }
}

/// Holds the current [`TransactionState`] and publishes every change to subscribers.
#[derive(Debug)]
pub struct TransactionTracker {
    sender: watch::Sender<TransactionState>,
}

impl Default for TransactionTracker {
    fn default() -> Self {
        let (sender, _) = watch::channel(TransactionState::Idle);
        Self { sender }
    }
}

impl TransactionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransactionState {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.sender.subscribe()
    }

    pub fn dispatch(&self, event: TransactionEvent) -> TransactionState {
        let current = self.state();
        let label = format!("{event:?}");
        let next = transition(&current, event);
        if next == current {
            debug!("ignored {label} in state {current:?}");
        } else {
            debug!("transaction state {current:?} -> {next:?}");
            self.sender.send_replace(next.clone());
        }
        next
    }
}
