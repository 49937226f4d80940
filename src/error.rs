use crate::config::{
    MAX_TICKETS_PER_PURCHASE,
    MIN_TICKETS_PER_PURCHASE,
};
use alloy::primitives::U256;
use thiserror::Error;

/// Client-side bound violation. Raised before any network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "ticket count {count} is outside {}..={}",
        MIN_TICKETS_PER_PURCHASE,
        MAX_TICKETS_PER_PURCHASE
    )]
    TicketCount { count: u32 },

    #[error("expected {expected} tickets, got {actual}")]
    TicketsMismatch { expected: u32, actual: usize },

    #[error("ticket {ticket} number {slot} is {value}, expected {min}..={max}")]
    NumberOutOfRange {
        ticket: usize,
        slot: usize,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Structured reason decoded from the contract's custom errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionCode {
    InvalidNumbers,
    InsufficientFunds,
    TicketCountExceeded,
}

/// The dry run of a purchase did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// The contract (or the node executing it) rejected the call.
    #[error("purchase rejected: {message}")]
    Reverted {
        code: Option<RejectionCode>,
        message: String,
    },

    #[error("simulation request failed: {0}")]
    Transport(String),
}

impl SimulationError {
    pub fn reverted(message: impl Into<String>) -> Self {
        SimulationError::Reverted {
            code: None,
            message: message.into(),
        }
    }
}

/// Broadcast or confirmation failure after a successful simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SubmissionError {
    pub message: String,
}

impl SubmissionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum LogFetchError {
    #[error("event `{0}` not found in contract interface")]
    EventNotFound(String),

    #[error("log request failed: {0:#}")]
    Transport(anyhow::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("log is not a ticket purchase: {0}")]
    Malformed(String),

    #[error("{field} value {value} does not fit the ticket record")]
    Overflow { field: &'static str, value: U256 },

    #[error("log is missing its {0}")]
    MissingMetadata(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("invalid ether amount `{0}`")]
    Invalid(String),

    #[error("total cost overflows")]
    Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown difficulty `{0}`")]
pub struct UnknownDifficulty(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTicketError {
    #[error("expected 4 comma-separated numbers, got {0}")]
    WrongLength(usize),

    #[error("invalid ticket number `{0}`")]
    InvalidNumber(String),
}

/// Reasons a purchase is refused before anything is sent to the chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Price(#[from] PriceError),
}
