//! Client-side checks run before a purchase touches the network. The contract stays the
//! authority; these only save a round-trip and bound the input fields.

use crate::{
    config::{
        MAX_TICKETS_PER_PURCHASE,
        MIN_TICKETS_PER_PURCHASE,
    },
    error::ValidationError,
    game::{
        DifficultyTier,
        TicketNumbers,
    },
};

pub fn validate_count(count: u32) -> bool {
    (MIN_TICKETS_PER_PURCHASE..=MAX_TICKETS_PER_PURCHASE).contains(&count)
}

pub fn validate_range(ticket: &TicketNumbers, tier: DifficultyTier) -> bool {
    first_out_of_range(ticket, tier).is_none()
}

fn first_out_of_range(ticket: &TicketNumbers, tier: DifficultyTier) -> Option<(usize, u32)> {
    let range = tier.range();
    ticket
        .slots()
        .iter()
        .enumerate()
        .find(|(slot, value)| !range.slot(*slot).contains(*value))
        .map(|(slot, value)| (slot, *value))
}

/// Checks the count bound, that `tickets` has exactly `count` entries, and every number.
pub fn validate_tickets(
    count: u32,
    tickets: &[TicketNumbers],
    tier: DifficultyTier,
) -> Result<(), ValidationError> {
    if !validate_count(count) {
        return Err(ValidationError::TicketCount { count });
    }
    if tickets.len() != count as usize {
        return Err(ValidationError::TicketsMismatch {
            expected: count,
            actual: tickets.len(),
        });
    }
    let range = tier.range();
    for (index, ticket) in tickets.iter().enumerate() {
        if let Some((slot, value)) = first_out_of_range(ticket, tier) {
            let bounds = range.slot(slot);
            return Err(ValidationError::NumberOutOfRange {
                ticket: index + 1,
                slot: slot + 1,
                value,
                min: *bounds.start(),
                max: *bounds.end(),
            });
        }
    }
    Ok(())
}
