use crate::{
    error::{
        RejectionCode,
        SimulationError,
    },
    purchase::state::{
        FailureKind,
        PurchaseFailure,
    },
};

/// Maps a failed dry run to the failure shown to the player.
///
/// A structured [`RejectionCode`] decoded by the gateway wins. Without one, the revert
/// message is matched against the contract's known revert strings, which breaks as soon
/// as the contract rewords them. Transport failures are never sub-classified.
pub fn classify_simulation_error(error: &SimulationError) -> PurchaseFailure {
    match error {
        SimulationError::Reverted { code, message } => {
            let kind = (*code)
                .or_else(|| code_from_message(message))
                .map(kind_for_code)
                .unwrap_or(FailureKind::Generic);
            PurchaseFailure::new(kind, message.clone())
        }
        SimulationError::Transport(message) => {
            PurchaseFailure::new(FailureKind::Generic, message.clone())
        }
    }
}

fn kind_for_code(code: RejectionCode) -> FailureKind {
    match code {
        RejectionCode::InvalidNumbers => FailureKind::InvalidNumbers,
        RejectionCode::InsufficientFunds => FailureKind::InsufficientFunds,
        RejectionCode::TicketCountExceeded => FailureKind::TicketCountExceeded,
    }
}

fn code_from_message(message: &str) -> Option<RejectionCode> {
    let message = message.to_lowercase();
    if message.contains("invalid numbers") {
        Some(RejectionCode::InvalidNumbers)
    } else if message.contains("insufficient funds") {
        Some(RejectionCode::InsufficientFunds)
    } else if message.contains("ticket count") {
        Some(RejectionCode::TicketCountExceeded)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    fn kind_of(error: SimulationError) -> FailureKind {
        classify_simulation_error(&error).kind
    }

    #[test]
    fn classify__known_revert_strings__map_to_distinct_kinds() {
        assert_eq!(
            kind_of(SimulationError::reverted(
                "execution reverted: Invalid numbers"
            )),
            FailureKind::InvalidNumbers
        );
        assert_eq!(
            kind_of(SimulationError::reverted(
                "insufficient funds for gas * price + value"
            )),
            FailureKind::InsufficientFunds
        );
        assert_eq!(
            kind_of(SimulationError::reverted(
                "execution reverted: Ticket count exceeds max"
            )),
            FailureKind::TicketCountExceeded
        );
        assert_eq!(
            kind_of(SimulationError::reverted("execution reverted: paused")),
            FailureKind::Generic
        );
    }

    #[test]
    fn classify__structured_code__wins_over_message() {
        // given
        let error = SimulationError::Reverted {
            code: Some(RejectionCode::TicketCountExceeded),
            message: "insufficient funds".to_owned(),
        };

        // when
        let failure = classify_simulation_error(&error);

        // then
        assert_eq!(failure.kind, FailureKind::TicketCountExceeded);
        assert_eq!(failure.user_message(), "Max 100 tickets per purchase");
    }

    #[test]
    fn classify__transport_failure__is_generic_even_with_known_words() {
        assert_eq!(
            kind_of(SimulationError::Transport(
                "insufficient funds in connection pool".to_owned()
            )),
            FailureKind::Generic
        );
    }

    #[test]
    fn classify__keeps_raw_message_as_detail() {
        let failure =
            classify_simulation_error(&SimulationError::reverted("Invalid numbers"));

        assert_eq!(failure.detail, "Invalid numbers");
        assert_eq!(failure.user_message(), "Invalid ticket numbers");
    }
}
