use crate::{
    config::MIN_TICKETS_PER_PURCHASE,
    error::PriceError,
    game::{
        DifficultyTier,
        TicketNumbers,
        TicketPrice,
    },
    purchase::TicketSelection,
    validation::validate_count,
};
use alloy::primitives::U256;
use std::ops::RangeInclusive;

/// Editable purchase form: ticket count, auto-generate toggle and the manual number grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TicketSheet {
    ticket_count: u32,
    auto_generate: bool,
    manual: Vec<TicketNumbers>,
}

impl Default for TicketSheet {
    fn default() -> Self {
        Self {
            ticket_count: MIN_TICKETS_PER_PURCHASE,
            auto_generate: true,
            manual: blank_grid(MIN_TICKETS_PER_PURCHASE),
        }
    }
}

fn blank_grid(count: u32) -> Vec<TicketNumbers> {
    vec![TicketNumbers::default(); count as usize]
}

impl TicketSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket_count(&self) -> u32 {
        self.ticket_count
    }

    pub fn is_auto_generate(&self) -> bool {
        self.auto_generate
    }

    pub fn manual_numbers(&self) -> &[TicketNumbers] {
        &self.manual
    }

    /// Out-of-bounds counts are ignored. An accepted count clears the manual grid.
    pub fn set_ticket_count(&mut self, count: u32) -> bool {
        if !validate_count(count) {
            return false;
        }
        self.ticket_count = count;
        self.manual = blank_grid(count);
        true
    }

    /// Same as [`Self::set_ticket_count`] for raw text input; non-numbers are ignored.
    pub fn set_ticket_count_input(&mut self, raw: &str) -> bool {
        raw.trim()
            .parse::<u32>()
            .is_ok_and(|count| self.set_ticket_count(count))
    }

    pub fn set_auto_generate(&mut self, enabled: bool) {
        self.auto_generate = enabled;
    }

    pub fn toggle_auto_generate(&mut self) {
        self.auto_generate = !self.auto_generate;
    }

    /// Returns `false` when the ticket or slot does not exist.
    pub fn set_number(&mut self, ticket: usize, slot: usize, value: u32) -> bool {
        match self
            .manual
            .get_mut(ticket)
            .and_then(|numbers| numbers.slot_mut(slot))
        {
            Some(target) => {
                *target = value;
                true
            }
            None => false,
        }
    }

    pub fn set_ticket(&mut self, ticket: usize, numbers: TicketNumbers) -> bool {
        match self.manual.get_mut(ticket) {
            Some(target) => {
                *target = numbers;
                true
            }
            None => false,
        }
    }

    /// Input bounds for one number field.
    pub fn slot_range(tier: DifficultyTier, slot: usize) -> RangeInclusive<u32> {
        tier.range().slot(slot)
    }

    pub fn selection(&self) -> TicketSelection {
        if self.auto_generate {
            TicketSelection::Auto {
                count: self.ticket_count,
            }
        } else {
            TicketSelection::Manual(self.manual.clone())
        }
    }

    pub fn total_cost(&self, price: &TicketPrice) -> Result<U256, PriceError> {
        price.total_for(self.ticket_count)
    }
}
