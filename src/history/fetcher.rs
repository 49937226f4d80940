use crate::{
    error::LogFetchError,
    history::log_source::{
        LogQuery,
        LogSource,
    },
};
use alloy::{
    primitives::Address,
    rpc::types::Log,
};
use generated_abi::{
    ContractInterface,
    TICKET_PURCHASED_EVENT,
};
use tracing::debug;

/// Pulls raw `TicketPurchased` logs for one contract, one window per call.
pub struct LogFetcher<S> {
    source: S,
    contract: Address,
    interface: ContractInterface,
}

impl<S: LogSource> LogFetcher<S> {
    pub fn new(source: S, contract: Address, interface: ContractInterface) -> Self {
        Self {
            source,
            contract,
            interface,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub async fn head_block(&self) -> Result<u64, LogFetchError> {
        self.source
            .block_number()
            .await
            .map_err(LogFetchError::Transport)
    }

    /// Exactly one request covering `from..=to`; never pages past it.
    pub async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<Log>, LogFetchError> {
        let event = self
            .interface
            .event(TICKET_PURCHASED_EVENT)
            .ok_or_else(|| LogFetchError::EventNotFound(TICKET_PURCHASED_EVENT.to_owned()))?;
        let query = LogQuery {
            address: self.contract,
            event_signature: event.selector(),
            from_block: from,
            to_block: to,
        };
        debug!("fetching ticket logs in blocks {from}..={to}");
        let logs = self
            .source
            .logs(&query)
            .await
            .map_err(LogFetchError::Transport)?;
        debug!("received {} ticket logs", logs.len());
        Ok(logs)
    }
}
