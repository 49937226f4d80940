pub mod chain;
pub mod config;
pub mod error;
pub mod game;
pub mod gateway;
pub mod history;
pub mod numbers;
pub mod purchase;
pub mod validation;
pub mod wallets;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use generated_abi::{
    ContractInterface,
    lottery_types,
};
