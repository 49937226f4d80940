use alloy::json_abi::{
    Event,
    Function,
    JsonAbi,
};
use anyhow::Context;

pub mod lottery_types {
    use alloy::sol;

    sol! {
        #[sol(rpc)]
        #[derive(Debug, PartialEq, Eq)]
        contract Lottery {
            enum Difficulty {
                Easy,
                Medium,
                Hard,
            }

            event TicketPurchased(
                address indexed player,
                uint256 gameNumber,
                uint256[3] numbers,
                uint256 etherball
            );

            error InvalidNumbers();
            error InsufficientFunds();
            error TicketCountExceeded();

            function buyTickets(uint256[4][] calldata tickets) external payable;
            function currentGameNumber() external view returns (uint256);
            function ticketPrice() external view returns (uint256);
            function gameDifficulty(uint256 gameNumber) external view returns (Difficulty);
            function secondsUntilDraw() external view returns (uint256);
        }
    }
}

/// Name of the event emitted once per purchased ticket.
pub const TICKET_PURCHASED_EVENT: &str = "TicketPurchased";

/// Name of the payable purchase function.
pub const BUY_TICKETS_FUNCTION: &str = "buyTickets";

pub const LOTTERY_ABI_JSON: &str = include_str!("../abi/lottery-abi.json");

/// Static description of the lottery contract's events and functions, as shipped
/// alongside the deployed bytecode.
#[derive(Clone, Debug)]
pub struct ContractInterface {
    abi: JsonAbi,
}

impl ContractInterface {
    /// The descriptor bundled with this crate.
    pub fn lottery() -> anyhow::Result<Self> {
        Self::from_json(LOTTERY_ABI_JSON)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let abi: JsonAbi =
            serde_json::from_str(raw).context("invalid lottery contract ABI JSON")?;
        Ok(Self { abi })
    }

    /// First event declared under `name`, if any.
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.abi.event(name).and_then(|overloads| overloads.first())
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.abi.function(name).and_then(|overloads| overloads.first())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::lottery_types::Lottery;
    use alloy::sol_types::{
        SolCall,
        SolEvent,
    };

    #[test]
    fn event__bundled_descriptor__matches_binding_signature() {
        // given
        let interface = ContractInterface::lottery().unwrap();

        // when
        let event = interface.event(TICKET_PURCHASED_EVENT).unwrap();

        // then
        assert_eq!(event.selector(), Lottery::TicketPurchased::SIGNATURE_HASH);
    }

    #[test]
    fn function__bundled_descriptor__matches_binding_selector() {
        // given
        let interface = ContractInterface::lottery().unwrap();

        // when
        let function = interface.function(BUY_TICKETS_FUNCTION).unwrap();

        // then
        assert_eq!(function.selector().0, Lottery::buyTicketsCall::SELECTOR);
    }

    #[test]
    fn event__descriptor_without_event__returns_none() {
        // given
        let interface = ContractInterface::from_json("[]").unwrap();

        // when
        let event = interface.event(TICKET_PURCHASED_EVENT);

        // then
        assert!(event.is_none());
    }

    #[test]
    fn from_json__malformed_input__fails() {
        let result = ContractInterface::from_json("{ not json");

        assert!(result.is_err());
    }
}
