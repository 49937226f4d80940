use alloy::{
    primitives::{
        Address,
        B256,
    },
    rpc::types::Log,
};

/// One bounded `eth_getLogs` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogQuery {
    pub address: Address,
    pub event_signature: B256,
    pub from_block: u64,
    pub to_block: u64,
}

pub trait LogSource {
    fn block_number(&self) -> impl Future<Output = anyhow::Result<u64>>;

    fn logs(&self, query: &LogQuery) -> impl Future<Output = anyhow::Result<Vec<Log>>>;
}
