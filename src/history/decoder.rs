use crate::{
    error::DecodeError,
    game::TicketNumbers,
};
use alloy::{
    primitives::{
        Address,
        B256,
        U256,
    },
    rpc::types::Log,
};
use generated_abi::lottery_types::Lottery;
use serde::Serialize;

/// A purchased ticket as recorded on chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ticket {
    pub owner: Address,
    pub game_number: u64,
    pub numbers: TicketNumbers,
    pub block_number: u64,
    pub transaction_hash: B256,
    pub log_index: Option<u64>,
}

pub struct TicketDecoder;

impl TicketDecoder {
    pub fn decode(log: &Log) -> Result<Ticket, DecodeError> {
        let decoded = log
            .log_decode::<Lottery::TicketPurchased>()
            .map_err(|err| DecodeError::Malformed(err.to_string()))?;
        let event = &decoded.inner.data;

        let [a, b, c] = event.numbers;
        let numbers = TicketNumbers::new(
            [
                narrow("number", a)?,
                narrow("number", b)?,
                narrow("number", c)?,
            ],
            narrow("etherball", event.etherball)?,
        );

        Ok(Ticket {
            owner: event.player,
            game_number: narrow("game number", event.gameNumber)?,
            numbers,
            block_number: log
                .block_number
                .ok_or(DecodeError::MissingMetadata("block number"))?,
            transaction_hash: log
                .transaction_hash
                .ok_or(DecodeError::MissingMetadata("transaction hash"))?,
            log_index: log.log_index,
        })
    }
}

fn narrow<T: TryFrom<U256>>(field: &'static str, value: U256) -> Result<T, DecodeError> {
    T::try_from(value).map_err(|_| DecodeError::Overflow { field, value })
}
