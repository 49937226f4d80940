use crate::{
    config::ReceiptPolling,
    error::{
        RejectionCode,
        SimulationError,
        SubmissionError,
    },
    game::{
        DifficultyTier,
        GameContext,
        GameContextSource,
        NUMBERS_PER_TICKET,
        TicketPrice,
    },
    gateway::{
        ContractGateway,
        PurchaseRequest,
        StatusSource,
        TransactionHandle,
        TransactionStatus,
    },
    history::log_source::{
        LogQuery,
        LogSource,
    },
};
use alloy::{
    contract::Error as ContractError,
    network::{
        EthereumWallet,
        ReceiptResponse,
    },
    primitives::{
        Address,
        U256,
    },
    providers::{
        DynProvider,
        Provider,
        ProviderBuilder,
    },
    rpc::types::{
        Filter,
        Log,
        TransactionReceipt,
    },
    signers::local::PrivateKeySigner,
};
use anyhow::Context;
use generated_abi::lottery_types::Lottery::{
    self,
    LotteryErrors,
    LotteryInstance,
};
use tracing::{
    debug,
    warn,
};
use url::Url;

/// The lottery contract reached through an alloy provider.
#[derive(Clone)]
pub struct LotteryChain<P> {
    lottery: LotteryInstance<P>,
    polling: ReceiptPolling,
}

impl LotteryChain<DynProvider> {
    /// HTTP provider for `rpc_url`, signing with `signer` when one is given.
    pub fn connect(rpc_url: Url, contract: Address, signer: Option<PrivateKeySigner>) -> Self {
        let provider = match signer {
            Some(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer))
                .connect_http(rpc_url)
                .erased(),
            None => ProviderBuilder::new().connect_http(rpc_url).erased(),
        };
        Self::new(provider, contract)
    }
}

impl<P: Provider> LotteryChain<P> {
    pub fn new(provider: P, contract: Address) -> Self {
        Self {
            lottery: Lottery::new(contract, provider),
            polling: ReceiptPolling::default(),
        }
    }

    pub fn with_polling(mut self, polling: ReceiptPolling) -> Self {
        self.polling = polling;
        self
    }

    pub fn contract(&self) -> Address {
        *self.lottery.address()
    }
}

/// The `buyTickets` call that passed its dry run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedPurchase {
    tickets: Vec<[U256; NUMBERS_PER_TICKET]>,
    value: U256,
    from: Address,
}

impl From<&PurchaseRequest> for PreparedPurchase {
    fn from(request: &PurchaseRequest) -> Self {
        Self {
            tickets: request.call_args(),
            value: request.total_value,
            from: request.payer,
        }
    }
}

impl<P: Provider> ContractGateway for LotteryChain<P> {
    type Prepared = PreparedPurchase;

    async fn simulate(
        &self,
        request: &PurchaseRequest,
    ) -> Result<PreparedPurchase, SimulationError> {
        let prepared = PreparedPurchase::from(request);
        debug!(
            "simulating buyTickets with {} tickets from {}",
            prepared.tickets.len(),
            prepared.from
        );
        self.lottery
            .buyTickets(prepared.tickets.clone())
            .value(prepared.value)
            .from(prepared.from)
            .call()
            .await
            .map_err(simulation_error)?;
        Ok(prepared)
    }

    async fn submit(
        &self,
        prepared: PreparedPurchase,
    ) -> Result<TransactionHandle, SubmissionError> {
        let pending = self
            .lottery
            .buyTickets(prepared.tickets)
            .value(prepared.value)
            .from(prepared.from)
            .send()
            .await
            .map_err(|err| SubmissionError::new(err.to_string()))?;
        Ok(TransactionHandle {
            hash: *pending.tx_hash(),
        })
    }
}

/// Custom contract errors first, then node error responses, then everything else.
pub fn simulation_error(err: ContractError) -> SimulationError {
    if let Some(decoded) = err.as_decoded_interface_error::<LotteryErrors>() {
        let code = match decoded {
            LotteryErrors::InvalidNumbers(_) => RejectionCode::InvalidNumbers,
            LotteryErrors::InsufficientFunds(_) => RejectionCode::InsufficientFunds,
            LotteryErrors::TicketCountExceeded(_) => RejectionCode::TicketCountExceeded,
        };
        return SimulationError::Reverted {
            code: Some(code),
            message: err.to_string(),
        };
    }
    match &err {
        ContractError::TransportError(rpc) if rpc.is_error_resp() => {
            let message = rpc
                .as_error_resp()
                .map(|payload| payload.message.to_string())
                .unwrap_or_else(|| rpc.to_string());
            SimulationError::reverted(message)
        }
        _ => SimulationError::Transport(err.to_string()),
    }
}

fn status_from_receipt(receipt: &TransactionReceipt) -> TransactionStatus {
    if receipt.status() {
        TransactionStatus::Confirmed {
            block_number: receipt.block_number(),
        }
    } else {
        TransactionStatus::Failed(format!(
            "transaction {} reverted",
            receipt.transaction_hash()
        ))
    }
}

impl<P: Provider> StatusSource for LotteryChain<P> {
    async fn wait_for_status(&self, handle: &TransactionHandle) -> TransactionStatus {
        let provider = self.lottery.provider();
        for attempt in 1..=self.polling.attempts {
            match provider.get_transaction_receipt(handle.hash).await {
                Ok(Some(receipt)) => return status_from_receipt(&receipt),
                Ok(None) => debug!("no receipt for {handle} yet (attempt {attempt})"),
                Err(err) => warn!("receipt lookup for {handle} failed: {err}"),
            }
            tokio::time::sleep(self.polling.interval).await;
        }
        TransactionStatus::Failed(format!(
            "transaction {handle} was not mined after {} checks",
            self.polling.attempts
        ))
    }
}

impl<P: Provider> LogSource for LotteryChain<P> {
    async fn block_number(&self) -> anyhow::Result<u64> {
        self.lottery
            .provider()
            .get_block_number()
            .await
            .context("failed to read head block")
    }

    async fn logs(&self, query: &LogQuery) -> anyhow::Result<Vec<Log>> {
        let filter = Filter::new()
            .address(query.address)
            .event_signature(query.event_signature)
            .from_block(query.from_block)
            .to_block(query.to_block);
        self.lottery
            .provider()
            .get_logs(&filter)
            .await
            .with_context(|| {
                format!(
                    "failed to fetch logs in blocks {}..={}",
                    query.from_block, query.to_block
                )
            })
    }
}

fn tier_from_contract(difficulty: Lottery::Difficulty) -> DifficultyTier {
    match difficulty {
        Lottery::Difficulty::Medium => DifficultyTier::Medium,
        Lottery::Difficulty::Hard => DifficultyTier::Hard,
        _ => DifficultyTier::Easy,
    }
}

impl<P: Provider> GameContextSource for LotteryChain<P> {
    async fn game_context(&self) -> anyhow::Result<GameContext> {
        let game_number = self
            .lottery
            .currentGameNumber()
            .call()
            .await
            .context("failed to read current game number")?;
        let price = self
            .lottery
            .ticketPrice()
            .call()
            .await
            .context("failed to read ticket price")?;
        let difficulty = self
            .lottery
            .gameDifficulty(game_number)
            .call()
            .await
            .with_context(|| format!("failed to read difficulty of game {game_number}"))?;
        let seconds_until_draw = match self.lottery.secondsUntilDraw().call().await {
            Ok(seconds) => u64::try_from(seconds).ok(),
            Err(err) => {
                warn!("could not read time until draw: {err}");
                None
            }
        };

        Ok(GameContext {
            game_number: u64::try_from(game_number)
                .ok()
                .context("game number does not fit in 64 bits")?,
            ticket_price: TicketPrice::from_wei(price),
            difficulty: tier_from_contract(difficulty),
            seconds_until_draw,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use alloy::{
        primitives::hex,
        rpc::json_rpc::ErrorPayload,
        sol_types::SolError,
        transports::{
            RpcError,
            TransportErrorKind,
        },
    };
    use serde_json::value::RawValue;

    fn error_response(message: &str, data: Option<&str>) -> ContractError {
        ContractError::TransportError(RpcError::ErrorResp(ErrorPayload {
            code: 3,
            message: message.to_owned().into(),
            data: data.map(|raw| RawValue::from_string(format!("\"{raw}\"")).unwrap()),
        }))
    }

    #[test]
    fn simulation_error__custom_error_data__decodes_rejection_code() {
        // given
        let selector = hex::encode_prefixed(Lottery::TicketCountExceeded::SELECTOR);
        let err = error_response("execution reverted", Some(&selector));

        // when
        let result = simulation_error(err);

        // then
        assert!(matches!(
            result,
            SimulationError::Reverted {
                code: Some(RejectionCode::TicketCountExceeded),
                ..
            }
        ));
    }

    #[test]
    fn simulation_error__node_error_response__keeps_message() {
        // given
        let err = error_response("insufficient funds for gas * price + value", None);

        // when
        let result = simulation_error(err);

        // then
        assert_eq!(
            result,
            SimulationError::reverted("insufficient funds for gas * price + value")
        );
    }

    #[test]
    fn simulation_error__connection_failure__is_transport() {
        let err = ContractError::TransportError(TransportErrorKind::custom_str(
            "connection refused",
        ));

        assert!(matches!(
            simulation_error(err),
            SimulationError::Transport(_)
        ));
    }

    #[test]
    fn tier_from_contract__maps_each_variant() {
        assert_eq!(
            tier_from_contract(Lottery::Difficulty::Easy),
            DifficultyTier::Easy
        );
        assert_eq!(
            tier_from_contract(Lottery::Difficulty::Medium),
            DifficultyTier::Medium
        );
        assert_eq!(
            tier_from_contract(Lottery::Difficulty::Hard),
            DifficultyTier::Hard
        );
    }

    #[test]
    fn prepared_purchase__carries_value_and_payer() {
        // given
        let request = PurchaseRequest {
            game_number: 3,
            ticket_count: 1,
            tickets: vec![crate::game::TicketNumbers::new([1, 2, 3], 4)],
            payer: Address::repeat_byte(9),
            total_value: U256::from(10),
        };

        // when
        let prepared = PreparedPurchase::from(&request);

        // then
        assert_eq!(prepared.value, U256::from(10));
        assert_eq!(prepared.from, Address::repeat_byte(9));
        assert_eq!(prepared.tickets, request.call_args());
    }
}
