use std::time::Duration;

pub const DEFAULT_TESTNET_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://ethereum-holesky-rpc.publicnode.com";
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:8545/";

pub const MIN_TICKETS_PER_PURCHASE: u32 = 1;
pub const MAX_TICKETS_PER_PURCHASE: u32 = 100;

/// Blocks covered by one history window.
pub const BATCH_SIZE_FOR_FETCHING: u64 = 10_000;
/// Cap on decoded tickets returned by one history load.
pub const MAX_TICKETS_TO_DISPLAY: usize = 100;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const RECEIPT_POLL_ATTEMPTS: u32 = 90;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryConfig {
    pub batch_size: u64,
    pub max_tickets: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE_FOR_FETCHING,
            max_tickets: MAX_TICKETS_TO_DISPLAY,
        }
    }
}

/// How long to wait for a submitted transaction to be mined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiptPolling {
    pub interval: Duration,
    pub attempts: u32,
}

impl Default for ReceiptPolling {
    fn default() -> Self {
        Self {
            interval: RECEIPT_POLL_INTERVAL,
            attempts: RECEIPT_POLL_ATTEMPTS,
        }
    }
}
