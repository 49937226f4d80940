use crate::{
    error::{
        SimulationError,
        SubmissionError,
    },
    game::{
        DifficultyTier,
        GameContext,
        GameContextSource,
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
    purchase::TransactionState,
};
use alloy::{
    primitives::{
        self,
        Address,
        B256,
        LogData,
        U256,
        keccak256,
    },
    rpc::types::Log,
    sol_types::SolEvent,
};
use generated_abi::lottery_types::Lottery;
use std::sync::{
    Arc,
    Mutex,
};
use tokio::sync::watch;

pub const TEST_CONTRACT: Address = Address::repeat_byte(0x42);
pub const TEST_PAYER: Address = Address::repeat_byte(0x11);
pub const FAKE_TX_HASH: B256 = B256::repeat_byte(0xab);

/// Game 7 at 0.01 ETH per ticket.
pub fn sample_game(difficulty: DifficultyTier) -> GameContext {
    GameContext {
        game_number: 7,
        ticket_price: TicketPrice::from_ether("0.01").unwrap(),
        difficulty,
        seconds_until_draw: Some(3_600),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GatewayCall {
    Simulate(PurchaseRequest),
    Submit(PurchaseRequest),
}

/// Records every call and, once observing a tracker, the state seen during each call.
#[derive(Clone, Default)]
pub struct FakeGateway {
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    simulation_error: Option<SimulationError>,
    submission_error: Option<SubmissionError>,
    probe: Arc<Mutex<Option<watch::Receiver<TransactionState>>>>,
    observed: Arc<Mutex<Vec<TransactionState>>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_simulation(error: SimulationError) -> Self {
        Self {
            simulation_error: Some(error),
            ..Self::default()
        }
    }

    pub fn failing_submission(error: SubmissionError) -> Self {
        Self {
            submission_error: Some(error),
            ..Self::default()
        }
    }

    pub fn observe(&self, receiver: watch::Receiver<TransactionState>) {
        *self.probe.lock().unwrap() = Some(receiver);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn simulate_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::Simulate(_)))
            .count()
    }

    pub fn submit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, GatewayCall::Submit(_)))
            .count()
    }

    pub fn observed_states(&self) -> Vec<TransactionState> {
        self.observed.lock().unwrap().clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().unwrap().push(call);
        if let Some(probe) = self.probe.lock().unwrap().as_ref() {
            self.observed.lock().unwrap().push(probe.borrow().clone());
        }
    }
}

impl ContractGateway for FakeGateway {
    type Prepared = PurchaseRequest;

    async fn simulate(
        &self,
        request: &PurchaseRequest,
    ) -> Result<PurchaseRequest, SimulationError> {
        self.record(GatewayCall::Simulate(request.clone()));
        match &self.simulation_error {
            Some(error) => Err(error.clone()),
            None => Ok(request.clone()),
        }
    }

    async fn submit(
        &self,
        prepared: PurchaseRequest,
    ) -> Result<TransactionHandle, SubmissionError> {
        self.record(GatewayCall::Submit(prepared));
        match &self.submission_error {
            Some(error) => Err(error.clone()),
            None => Ok(TransactionHandle { hash: FAKE_TX_HASH }),
        }
    }
}

pub struct FakeStatusSource {
    status: TransactionStatus,
    waited: Arc<Mutex<Vec<TransactionHandle>>>,
}

impl FakeStatusSource {
    pub fn new(status: TransactionStatus) -> Self {
        Self {
            status,
            waited: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn confirmed() -> Self {
        Self::new(TransactionStatus::Confirmed {
            block_number: Some(1),
        })
    }

    pub fn waited(&self) -> Vec<TransactionHandle> {
        self.waited.lock().unwrap().clone()
    }
}

impl StatusSource for FakeStatusSource {
    async fn wait_for_status(&self, handle: &TransactionHandle) -> TransactionStatus {
        self.waited.lock().unwrap().push(*handle);
        self.status.clone()
    }
}

pub struct FakeGameContextSource {
    context: Option<GameContext>,
}

impl FakeGameContextSource {
    pub fn new(context: Option<GameContext>) -> Self {
        Self { context }
    }
}

impl GameContextSource for FakeGameContextSource {
    async fn game_context(&self) -> anyhow::Result<GameContext> {
        self.context
            .clone()
            .ok_or_else(|| anyhow::anyhow!("game context not loaded"))
    }
}

/// Serves a fixed head block and log list, or fixed failures, and records queries.
#[derive(Clone)]
pub struct FakeLogSource {
    head: Result<u64, String>,
    logs: Result<Vec<Log>, String>,
    queries: Arc<Mutex<Vec<LogQuery>>>,
}

impl FakeLogSource {
    pub fn new(head: u64, logs: Vec<Log>) -> Self {
        Self {
            head: Ok(head),
            logs: Ok(logs),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_head(mut self, message: &str) -> Self {
        self.head = Err(message.to_owned());
        self
    }

    pub fn failing_logs(mut self, message: &str) -> Self {
        self.logs = Err(message.to_owned());
        self
    }

    pub fn queries(&self) -> Vec<LogQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl LogSource for FakeLogSource {
    async fn block_number(&self) -> anyhow::Result<u64> {
        self.head.clone().map_err(anyhow::Error::msg)
    }

    async fn logs(&self, query: &LogQuery) -> anyhow::Result<Vec<Log>> {
        self.queries.lock().unwrap().push(*query);
        self.logs.clone().map_err(anyhow::Error::msg)
    }
}

/// A mined `TicketPurchased` log emitted by [`TEST_CONTRACT`].
pub fn ticket_log(
    player: Address,
    game_number: u64,
    numbers: [u32; 3],
    etherball: u32,
    block_number: u64,
    log_index: u64,
) -> Log {
    let event = Lottery::TicketPurchased {
        player,
        gameNumber: U256::from(game_number),
        numbers: numbers.map(|n| U256::from(n)),
        etherball: U256::from(etherball),
    };
    raw_log(event.encode_log_data(), block_number, log_index)
}

pub fn raw_log(data: LogData, block_number: u64, log_index: u64) -> Log {
    Log {
        inner: primitives::Log {
            address: TEST_CONTRACT,
            data,
        },
        block_hash: None,
        block_number: Some(block_number),
        block_timestamp: None,
        transaction_hash: Some(keccak256(format!("{block_number}:{log_index}"))),
        transaction_index: None,
        log_index: Some(log_index),
        removed: false,
    }
}
