use crate::{
    error::{
        PurchaseError,
        ValidationError,
    },
    game::{
        GameContext,
        TicketNumbers,
    },
    gateway::{
        ContractGateway,
        PurchaseRequest,
        StatusSource,
        TransactionHandle,
        TransactionStatus,
    },
    numbers::NumberGenerator,
    validation::{
        validate_count,
        validate_tickets,
    },
};
use alloy::primitives::Address;
use rand::{
    Rng,
    rngs::ThreadRng,
};
use tokio::sync::watch;
use tracing::{
    error,
    info,
    warn,
};

pub use classify::classify_simulation_error;
pub use sheet::TicketSheet;
pub use state::{
    FailureKind,
    PurchaseFailure,
    TransactionEvent,
    TransactionState,
    TransactionTracker,
    transition,
};

pub mod classify;
pub mod sheet;
pub mod state;


/// How the numbers for a purchase are chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketSelection {
    /// Draw `count` tickets from the game's tier.
    Auto { count: u32 },
    /// Player-entered tickets, one per purchased ticket.
    Manual(Vec<TicketNumbers>),
}

impl TicketSelection {
    pub fn ticket_count(&self) -> u32 {
        match self {
            TicketSelection::Auto { count } => *count,
            TicketSelection::Manual(tickets) => {
                u32::try_from(tickets.len()).unwrap_or(u32::MAX)
            }
        }
    }
}

/// What a call to [`PurchaseOrchestrator::purchase`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PurchaseAttempt {
    WalletRequired,
    GameUnavailable,
    /// Another purchase is still simulating or pending.
    Busy,
    /// The dry run was rejected; nothing was broadcast.
    Rejected(PurchaseFailure),
    Submitted(TransactionHandle),
    SubmissionFailed(PurchaseFailure),
}

pub struct PurchaseOrchestrator<G, R = ThreadRng> {
    gateway: G,
    generator: NumberGenerator<R>,
    tracker: TransactionTracker,
}

impl<G: ContractGateway> PurchaseOrchestrator<G, ThreadRng> {
    pub fn new(gateway: G) -> Self {
        Self::with_generator(gateway, NumberGenerator::thread_local())
    }
}

impl<G: ContractGateway, R: Rng> PurchaseOrchestrator<G, R> {
    pub fn with_generator(gateway: G, generator: NumberGenerator<R>) -> Self {
        Self {
            gateway,
            generator,
            tracker: TransactionTracker::new(),
        }
    }

    pub fn state(&self) -> TransactionState {
        self.tracker.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.tracker.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.tracker.state().is_busy()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Resolves the selection into tickets, validates them and prices the purchase.
    pub fn build_request(
        &mut self,
        game: &GameContext,
        payer: Address,
        selection: &TicketSelection,
    ) -> Result<PurchaseRequest, PurchaseError> {
        let ticket_count = selection.ticket_count();
        let tickets = match selection {
            TicketSelection::Auto { count } => {
                if !validate_count(*count) {
                    return Err(ValidationError::TicketCount { count: *count }.into());
                }
                self.generator.generate_many(game.difficulty, *count)
            }
            TicketSelection::Manual(tickets) => tickets.clone(),
        };
        validate_tickets(ticket_count, &tickets, game.difficulty)?;
        let total_value = game.ticket_price.total_for(ticket_count)?;
        Ok(PurchaseRequest {
            game_number: game.game_number,
            ticket_count,
            tickets,
            payer,
            total_value,
        })
    }

    /// Runs one purchase through simulate then submit.
    ///
    /// Missing wallet or game context and in-flight purchases are reported as attempts
    /// and change nothing. Validation errors are returned before any network call and
    /// leave the state idle.
    pub async fn purchase(
        &mut self,
        game: Option<&GameContext>,
        payer: Option<Address>,
        selection: &TicketSelection,
    ) -> Result<PurchaseAttempt, PurchaseError> {
        if self.is_busy() {
            warn!("purchase ignored, another one is in flight");
            return Ok(PurchaseAttempt::Busy);
        }
        let Some(payer) = payer else {
            return Ok(PurchaseAttempt::WalletRequired);
        };
        let Some(game) = game else {
            return Ok(PurchaseAttempt::GameUnavailable);
        };

        let request = self.build_request(game, payer, selection)?;
        if self.tracker.state().is_terminal() {
            self.tracker.dispatch(TransactionEvent::Reset);
        }
        info!(
            "buying {} tickets for game {} ({} wei)",
            request.ticket_count, request.game_number, request.total_value
        );
        self.tracker.dispatch(TransactionEvent::Start);

        let prepared = match self.gateway.simulate(&request).await {
            Ok(prepared) => prepared,
            Err(err) => {
                let failure = classify_simulation_error(&err);
                error!("purchase simulation failed: {err}");
                self.tracker
                    .dispatch(TransactionEvent::SimulationFailed(failure.clone()));
                return Ok(PurchaseAttempt::Rejected(failure));
            }
        };
        self.tracker.dispatch(TransactionEvent::Simulated);

        match self.gateway.submit(prepared).await {
            Ok(handle) => {
                info!("purchase submitted in transaction {handle}");
                self.tracker.dispatch(TransactionEvent::Submitted(handle));
                Ok(PurchaseAttempt::Submitted(handle))
            }
            Err(err) => {
                let failure = PurchaseFailure::submission(err.message);
                error!("purchase submission failed: {}", failure.detail);
                self.tracker.dispatch(TransactionEvent::Failed(failure.clone()));
                Ok(PurchaseAttempt::SubmissionFailed(failure))
            }
        }
    }

    /// Applies the final status of the submitted transaction.
    pub fn apply_status(&self, status: TransactionStatus) -> TransactionState {
        match status {
            TransactionStatus::Confirmed { block_number } => {
                info!("purchase confirmed in block {block_number:?}");
                self.tracker.dispatch(TransactionEvent::Confirmed)
            }
            TransactionStatus::Failed(message) => {
                error!("purchase transaction failed: {message}");
                self.tracker
                    .dispatch(TransactionEvent::Failed(PurchaseFailure::submission(message)))
            }
        }
    }

    /// [`Self::purchase`] followed by waiting for the transaction's final status.
    pub async fn purchase_and_confirm<S: StatusSource>(
        &mut self,
        status: &S,
        game: Option<&GameContext>,
        payer: Option<Address>,
        selection: &TicketSelection,
    ) -> Result<PurchaseAttempt, PurchaseError> {
        let attempt = self.purchase(game, payer, selection).await?;
        if let PurchaseAttempt::Submitted(handle) = &attempt {
            let outcome = status.wait_for_status(handle).await;
            self.apply_status(outcome);
        }
        Ok(attempt)
    }

    /// Returns to idle from success or failure; ignored otherwise.
    pub fn reset(&self) -> TransactionState {
        self.tracker.dispatch(TransactionEvent::Reset)
    }
}
