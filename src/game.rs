use crate::error::{
    ParseTicketError,
    PriceError,
    UnknownDifficulty,
};
use alloy::primitives::{
    U256,
    utils::{
        format_ether,
        parse_ether,
    },
};
use serde::Serialize;
use std::{
    fmt,
    ops::RangeInclusive,
    str::FromStr,
};

pub const MAIN_NUMBERS: usize = 3;
pub const NUMBERS_PER_TICKET: usize = MAIN_NUMBERS + 1;
pub const ETHERBALL_SLOT: usize = MAIN_NUMBERS;

/// Inclusive bounds for the main numbers and the etherball of one tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NumberRange {
    pub min: u32,
    pub max: u32,
    pub etherball_max: u32,
}

impl NumberRange {
    pub fn main(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }

    pub fn etherball(&self) -> RangeInclusive<u32> {
        self.min..=self.etherball_max
    }

    /// Allowed values for the number at `slot` of a ticket.
    pub fn slot(&self, slot: usize) -> RangeInclusive<u32> {
        if slot == ETHERBALL_SLOT {
            self.etherball()
        } else {
            self.main()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum DifficultyTier {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    pub const ALL: [DifficultyTier; 3] = [
        DifficultyTier::Easy,
        DifficultyTier::Medium,
        DifficultyTier::Hard,
    ];

    pub fn range(self) -> NumberRange {
        match self {
            DifficultyTier::Easy => NumberRange {
                min: 1,
                max: 50,
                etherball_max: 10,
            },
            DifficultyTier::Medium => NumberRange {
                min: 1,
                max: 100,
                etherball_max: 15,
            },
            DifficultyTier::Hard => NumberRange {
                min: 1,
                max: 150,
                etherball_max: 20,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Medium => "Medium",
            DifficultyTier::Hard => "Hard",
        }
    }

    /// Missing or unrecognised names fall back to [`DifficultyTier::Easy`].
    pub fn from_name_or_default(name: Option<&str>) -> Self {
        name.and_then(|raw| raw.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for DifficultyTier {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DifficultyTier::ALL
            .into_iter()
            .find(|tier| tier.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDifficulty(s.to_owned()))
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Three main numbers followed by the etherball.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct TicketNumbers([u32; NUMBERS_PER_TICKET]);

impl TicketNumbers {
    pub fn new(main: [u32; MAIN_NUMBERS], etherball: u32) -> Self {
        let [a, b, c] = main;
        Self([a, b, c, etherball])
    }

    pub fn from_slots(slots: [u32; NUMBERS_PER_TICKET]) -> Self {
        Self(slots)
    }

    pub fn main(&self) -> &[u32] {
        &self.0[..MAIN_NUMBERS]
    }

    pub fn etherball(&self) -> u32 {
        self.0[ETHERBALL_SLOT]
    }

    pub fn slots(&self) -> &[u32; NUMBERS_PER_TICKET] {
        &self.0
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> Option<&mut u32> {
        self.0.get_mut(slot)
    }

    pub fn to_call_arg(&self) -> [U256; NUMBERS_PER_TICKET] {
        self.0.map(|n| U256::from(n))
    }
}

impl FromStr for TicketNumbers {
    type Err = ParseTicketError;

    /// Parses `a,b,c,e` where `e` is the etherball.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(',').map(str::trim).collect::<Vec<_>>();
        let slots: [&str; NUMBERS_PER_TICKET] = parts
            .as_slice()
            .try_into()
            .map_err(|_| ParseTicketError::WrongLength(parts.len()))?;
        let mut numbers = [0u32; NUMBERS_PER_TICKET];
        for (target, raw) in numbers.iter_mut().zip(slots) {
            *target = raw
                .parse()
                .map_err(|_| ParseTicketError::InvalidNumber(raw.to_owned()))?;
        }
        Ok(Self(numbers))
    }
}

impl fmt::Display for TicketNumbers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, e] = self.0;
        write!(f, "{a:>3} {b:>3} {c:>3} | {e:>2}")
    }
}

/// Ticket price held in wei so totals are exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TicketPrice(U256);

impl TicketPrice {
    pub fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    /// Parses a decimal ether amount such as `"0.01"` without going through floats.
    pub fn from_ether(amount: &str) -> Result<Self, PriceError> {
        parse_ether(amount.trim())
            .map(Self)
            .map_err(|_| PriceError::Invalid(amount.to_owned()))
    }

    pub fn wei(&self) -> U256 {
        self.0
    }

    pub fn total_for(&self, ticket_count: u32) -> Result<U256, PriceError> {
        self.0
            .checked_mul(U256::from(ticket_count))
            .ok_or(PriceError::Overflow)
    }
}

impl fmt::Display for TicketPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", format_ether(self.0))
    }
}

/// Read-only view of the active game, supplied by a [`GameContextSource`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameContext {
    pub game_number: u64,
    pub ticket_price: TicketPrice,
    pub difficulty: DifficultyTier,
    pub seconds_until_draw: Option<u64>,
}

impl GameContext {
    pub fn range(&self) -> NumberRange {
        self.difficulty.range()
    }
}

pub trait GameContextSource {
    fn game_context(&self) -> impl Future<Output = anyhow::Result<GameContext>>;
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn from_str__difficulty_names__are_case_insensitive() {
        assert_eq!("easy".parse::<DifficultyTier>(), Ok(DifficultyTier::Easy));
        assert_eq!(" Medium ".parse::<DifficultyTier>(), Ok(DifficultyTier::Medium));
        assert_eq!("HARD".parse::<DifficultyTier>(), Ok(DifficultyTier::Hard));
        assert_eq!(
            "nightmare".parse::<DifficultyTier>(),
            Err(UnknownDifficulty("nightmare".to_owned()))
        );
    }

    #[test]
    fn from_name_or_default__unknown_or_missing__falls_back_to_easy() {
        assert_eq!(
            DifficultyTier::from_name_or_default(None),
            DifficultyTier::Easy
        );
        assert_eq!(
            DifficultyTier::from_name_or_default(Some("legendary")),
            DifficultyTier::Easy
        );
        assert_eq!(
            DifficultyTier::from_name_or_default(Some("Hard")),
            DifficultyTier::Hard
        );
    }

    #[test]
    fn slot__etherball_slot__uses_etherball_max() {
        let range = DifficultyTier::Easy.range();

        assert_eq!(range.slot(0), 1..=50);
        assert_eq!(range.slot(2), 1..=50);
        assert_eq!(range.slot(ETHERBALL_SLOT), 1..=10);
    }

    #[test]
    fn from_str__ticket_numbers__keeps_etherball_last() {
        // when
        let ticket: TicketNumbers = "4, 8,15,6".parse().unwrap();

        // then
        assert_eq!(ticket.main(), &[4, 8, 15]);
        assert_eq!(ticket.etherball(), 6);
    }

    #[test]
    fn from_str__ticket_numbers__rejects_wrong_shape() {
        assert_eq!(
            "1,2,3".parse::<TicketNumbers>(),
            Err(ParseTicketError::WrongLength(3))
        );
        assert_eq!(
            "1,2,x,4".parse::<TicketNumbers>(),
            Err(ParseTicketError::InvalidNumber("x".to_owned()))
        );
    }

    #[test]
    fn total_for__decimal_price__is_exact() {
        // given
        let price = TicketPrice::from_ether("0.01").unwrap();

        // when
        let total = price.total_for(3).unwrap();

        // then
        assert_eq!(total, U256::from(30_000_000_000_000_000u64));
        assert_eq!(total, parse_ether("0.03").unwrap());
    }

    #[test]
    fn total_for__overflowing_price__fails() {
        let price = TicketPrice::from_wei(U256::MAX);

        assert_eq!(price.total_for(2), Err(PriceError::Overflow));
    }

    #[test]
    fn from_ether__garbage__fails() {
        assert!(TicketPrice::from_ether("a lot").is_err());
    }
}
