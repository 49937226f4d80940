use crate::{
    error::{
        SimulationError,
        SubmissionError,
    },
    game::{
        NUMBERS_PER_TICKET,
        TicketNumbers,
    },
};
use alloy::primitives::{
    Address,
    B256,
    U256,
};
use std::fmt;

/// A validated, priced purchase ready to be dry-run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub game_number: u64,
    pub ticket_count: u32,
    pub tickets: Vec<TicketNumbers>,
    pub payer: Address,
    /// `ticket_count * unit price`, in wei.
    pub total_value: U256,
}

impl PurchaseRequest {
    pub fn call_args(&self) -> Vec<[U256; NUMBERS_PER_TICKET]> {
        self.tickets.iter().map(TicketNumbers::to_call_arg).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransactionHandle {
    pub hash: B256,
}

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hash)
    }
}

/// Final outcome of a submitted transaction as reported by the chain client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    Confirmed { block_number: Option<u64> },
    Failed(String),
}

/// Simulate-then-submit access to the lottery contract. Implementations keep no state
/// between calls.
pub trait ContractGateway {
    /// Opaque call produced by a successful dry run.
    type Prepared;

    fn simulate(
        &self,
        request: &PurchaseRequest,
    ) -> impl Future<Output = Result<Self::Prepared, SimulationError>>;

    /// Broadcasts without waiting for inclusion.
    fn submit(
        &self,
        prepared: Self::Prepared,
    ) -> impl Future<Output = Result<TransactionHandle, SubmissionError>>;
}

pub trait StatusSource {
    fn wait_for_status(
        &self,
        handle: &TransactionHandle,
    ) -> impl Future<Output = TransactionStatus>;
}
