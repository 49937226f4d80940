use crate::{
    config::HistoryConfig,
    history::{
        decoder::{
            Ticket,
            TicketDecoder,
        },
        fetcher::LogFetcher,
        log_source::LogSource,
    },
};
use alloy::primitives::Address;
use tracing::{
    debug,
    info,
    warn,
};

pub mod decoder;
pub mod fetcher;
pub mod log_source;


/// Inclusive block range scanned by one history load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryWindow {
    pub from_block: u64,
    pub to_block: u64,
}

impl HistoryWindow {
    /// The `batch_size` blocks ending at `head`, never starting below block 1.
    /// There is nothing to scan while the head is still block 0.
    pub fn trailing(head: u64, batch_size: u64) -> Option<Self> {
        if head == 0 {
            return None;
        }
        Some(Self {
            from_block: head.saturating_sub(batch_size).max(1),
            to_block: head,
        })
    }
}

/// Recent ticket purchases, reloaded wholesale from the latest block window.
pub struct HistoryEngine<S> {
    fetcher: LogFetcher<S>,
    config: HistoryConfig,
    tickets: Vec<Ticket>,
    loading: bool,
    last_window: Option<HistoryWindow>,
}

impl<S: LogSource> HistoryEngine<S> {
    pub fn new(fetcher: LogFetcher<S>, config: HistoryConfig) -> Self {
        Self {
            fetcher,
            config,
            tickets: Vec::new(),
            loading: true,
            last_window: None,
        }
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// True until the first load finishes, and while a load is running.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_window(&self) -> Option<HistoryWindow> {
        self.last_window
    }

    pub fn fetcher(&self) -> &LogFetcher<S> {
        &self.fetcher
    }

    /// Tickets bought by `owner` in game `game_number`.
    pub fn tickets_for(&self, owner: Address, game_number: u64) -> Vec<&Ticket> {
        self.tickets
            .iter()
            .filter(|ticket| ticket.owner == owner && ticket.game_number == game_number)
            .collect()
    }

    /// Replaces the result set with the tickets of the latest window.
    ///
    /// Any failure yields an empty result set; nothing is retried.
    pub async fn load_latest(&mut self) -> &[Ticket] {
        self.loading = true;
        let tickets = self.fetch_latest().await;
        info!("loaded {} tickets", tickets.len());
        self.tickets = tickets;
        self.loading = false;
        &self.tickets
    }

    async fn fetch_latest(&mut self) -> Vec<Ticket> {
        let head = match self.fetcher.head_block().await {
            Ok(head) => head,
            Err(err) => {
                warn!("could not read head block: {err}");
                self.last_window = None;
                return Vec::new();
            }
        };
        self.last_window = HistoryWindow::trailing(head, self.config.batch_size);
        let Some(window) = self.last_window else {
            debug!("chain has no blocks yet");
            return Vec::new();
        };

        let logs = match self
            .fetcher
            .fetch_range(window.from_block, window.to_block)
            .await
        {
            Ok(logs) => logs,
            Err(err) => {
                warn!("error fetching ticket logs: {err}");
                return Vec::new();
            }
        };

        logs.iter()
            .filter_map(|log| match TicketDecoder::decode(log) {
                Ok(ticket) => Some(ticket),
                Err(err) => {
                    warn!("skipping ticket log: {err}");
                    None
                }
            })
            .take(self.config.max_tickets)
            .collect()
    }
}
