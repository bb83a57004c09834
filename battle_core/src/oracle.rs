//! Chance oracle
//!
//! Every random decision in a battle goes through a [`ChanceOracle`], queried
//! in a fixed order for a given set of declared actions. Seeding an
//! [`RngOracle`] or scripting a [`ScriptedOracle`] therefore makes a whole
//! battle reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

/// Source of probabilistic answers
pub trait ChanceOracle {
    /// Whether an event with probability `probability` (0.0..=1.0) occurs
    fn event_occurs(&mut self, probability: f64) -> bool;

    /// Index of the weighted alternative that occurs
    fn which_event_occurs(&mut self, weights: &[f64]) -> usize;

    /// Index of one of `n` equally likely alternatives
    fn which_of(&mut self, n: usize) -> usize {
        let weights = vec![1.0; n];
        self.which_event_occurs(&weights)
    }
}

/// Oracle backed by a random number generator
#[derive(Debug, Clone)]
pub struct RngOracle<R: Rng> {
    rng: R,
}

impl<R: Rng> RngOracle<R> {
    pub fn new(rng: R) -> Self {
        RngOracle { rng }
    }
}

impl RngOracle<ChaCha8Rng> {
    /// Reproducible oracle for replays and tests
    pub fn seeded(seed: u64) -> Self {
        RngOracle::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> ChanceOracle for RngOracle<R> {
    fn event_occurs(&mut self, probability: f64) -> bool {
        if probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        let occurred = self.rng.gen_bool(probability);
        tracing::trace!(probability, occurred, "chance roll");
        occurred
    }

    fn which_event_occurs(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return 0;
        }
        let mut roll = self.rng.gen::<f64>() * total;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            if roll < *weight {
                tracing::trace!(index, alternatives = weights.len(), "weighted roll");
                return index;
            }
            roll -= weight;
        }
        weights.len().saturating_sub(1)
    }
}

/// One question asked of a [`ScriptedOracle`]
#[derive(Debug, Clone, PartialEq)]
pub enum OracleQuery {
    Event(f64),
    Choice(usize),
}

/// Test double answering from queued scripts
///
/// Once a script runs dry the fallback answer is used.
#[derive(Debug, Clone)]
pub struct ScriptedOracle {
    events: VecDeque<bool>,
    choices: VecDeque<usize>,
    fallback_event: bool,
    queries: Vec<OracleQuery>,
}

impl Default for ScriptedOracle {
    fn default() -> Self {
        ScriptedOracle {
            events: VecDeque::new(),
            choices: VecDeque::new(),
            fallback_event: true,
            queries: Vec::new(),
        }
    }
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle answering every event question with `answer`
    pub fn always(answer: bool) -> Self {
        ScriptedOracle {
            fallback_event: answer,
            ..Self::default()
        }
    }

    /// Queue answers for upcoming `event_occurs` calls
    pub fn with_events(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.events.extend(answers);
        self
    }

    /// Queue answers for upcoming `which_event_occurs` calls
    pub fn with_choices(mut self, answers: impl IntoIterator<Item = usize>) -> Self {
        self.choices.extend(answers);
        self
    }

    pub fn with_fallback(mut self, answer: bool) -> Self {
        self.fallback_event = answer;
        self
    }

    /// Questions asked so far, in order
    pub fn queries(&self) -> &[OracleQuery] {
        &self.queries
    }

    pub fn remaining_events(&self) -> usize {
        self.events.len()
    }
}

impl ChanceOracle for ScriptedOracle {
    fn event_occurs(&mut self, probability: f64) -> bool {
        self.queries.push(OracleQuery::Event(probability));
        self.events.pop_front().unwrap_or(self.fallback_event)
    }

    fn which_event_occurs(&mut self, weights: &[f64]) -> usize {
        self.queries.push(OracleQuery::Choice(weights.len()));
        let answer = self.choices.pop_front().unwrap_or(0);
        answer.min(weights.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_oracle_is_reproducible() {
        let mut a = RngOracle::seeded(42);
        let mut b = RngOracle::seeded(42);
        let rolls_a: Vec<bool> = (0..32).map(|_| a.event_occurs(0.5)).collect();
        let rolls_b: Vec<bool> = (0..32).map(|_| b.event_occurs(0.5)).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_certain_and_impossible_events() {
        let mut oracle = RngOracle::seeded(1);
        assert!(oracle.event_occurs(1.0));
        assert!(!oracle.event_occurs(0.0));
    }

    #[test]
    fn test_weighted_choice_skips_zero_weights() {
        let mut oracle = RngOracle::seeded(7);
        for _ in 0..50 {
            assert_eq!(oracle.which_event_occurs(&[0.0, 3.0, 0.0]), 1);
        }
        assert!(oracle.which_of(4) < 4);
    }

    #[test]
    fn test_scripted_answers_then_fallback() {
        let mut oracle = ScriptedOracle::new().with_events([false, true]).with_fallback(false);
        assert!(!oracle.event_occurs(0.9));
        assert!(oracle.event_occurs(0.1));
        assert!(!oracle.event_occurs(0.5));
        assert_eq!(
            oracle.queries(),
            &[OracleQuery::Event(0.9), OracleQuery::Event(0.1), OracleQuery::Event(0.5)]
        );
    }

    #[test]
    fn test_scripted_choice_is_clamped() {
        let mut oracle = ScriptedOracle::new().with_choices([9]);
        assert_eq!(oracle.which_event_occurs(&[1.0, 1.0]), 1);
        assert_eq!(oracle.which_of(3), 0);
    }
}
