use crate::game::{
    DifficultyTier,
    TicketNumbers,
};
use rand::{
    Rng,
    rngs::ThreadRng,
};

/// Draws ticket numbers for a difficulty tier from an injected random source.
pub struct NumberGenerator<R = ThreadRng> {
    rng: R,
}

impl NumberGenerator<ThreadRng> {
    pub fn thread_local() -> Self {
        Self::new(rand::rng())
    }
}

impl<R: Rng> NumberGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Independent uniform draws; duplicate main numbers are allowed.
    pub fn generate(&mut self, tier: DifficultyTier) -> TicketNumbers {
        let range = tier.range();
        let main = [
            self.rng.random_range(range.main()),
            self.rng.random_range(range.main()),
            self.rng.random_range(range.main()),
        ];
        let etherball = self.rng.random_range(range.etherball());
        TicketNumbers::new(main, etherball)
    }

    pub fn generate_many(&mut self, tier: DifficultyTier, count: u32) -> Vec<TicketNumbers> {
        (0..count).map(|_| self.generate(tier)).collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::validation::validate_range;
    use proptest::prelude::*;
    use rand::{
        SeedableRng,
        rngs::StdRng,
    };

    fn arb_tier() -> impl Strategy<Value = DifficultyTier> {
        prop::sample::select(DifficultyTier::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn generate__any_seed__stays_within_tier_ranges(seed in any::<u64>(), tier in arb_tier()) {
            // given
            let mut generator = NumberGenerator::new(StdRng::seed_from_u64(seed));
            let range = tier.range();

            // when
            let tickets = generator.generate_many(tier, 20);

            // then
            for ticket in tickets {
                prop_assert_eq!(ticket.slots().len(), 4);
                for value in ticket.main() {
                    prop_assert!(range.main().contains(value));
                }
                prop_assert!(range.etherball().contains(&ticket.etherball()));
                prop_assert!(validate_range(&ticket, tier));
            }
        }
    }

    #[test]
    fn generate__same_seed__yields_same_numbers() {
        // given
        let mut first = NumberGenerator::new(StdRng::seed_from_u64(42));
        let mut second = NumberGenerator::new(StdRng::seed_from_u64(42));

        // when
        let a = first.generate_many(DifficultyTier::Hard, 5);
        let b = second.generate_many(DifficultyTier::Hard, 5);

        // then
        assert_eq!(a, b);
    }

    #[test]
    fn generate_many__returns_requested_count() {
        let mut generator = NumberGenerator::new(StdRng::seed_from_u64(1));

        assert_eq!(generator.generate_many(DifficultyTier::Easy, 0).len(), 0);
        assert_eq!(generator.generate_many(DifficultyTier::Easy, 100).len(), 100);
    }
}
