//! Random number seam for the checkout simulator.

use rand::Rng;
use std::collections::VecDeque;

/// Source of the draws a checkout consumes.
pub trait RandomSource {
    /// Uniform float in `[0, 1)`.
    fn fraction(&mut self) -> f64;

    /// Uniform integer in `[low, high]`, both ends inclusive.
    fn int_inclusive(&mut self, low: u32, high: u32) -> u32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn fraction(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn int_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.gen_range(low..=high)
    }
}

/// Replays a fixed sequence of draws.
///
/// Fractions come from the script in order and fall back to `0.0` once it
/// runs out. Integers come from their own script and fall back to the low
/// bound; scripted integers are clamped into the requested range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    fractions: VecDeque<f64>,
    ints: VecDeque<u32>,
    fractions_drawn: usize,
}

impl ScriptedRandom {
    pub fn new(fractions: impl IntoIterator<Item = f64>) -> Self {
        Self {
            fractions: fractions.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn with_ints(mut self, ints: impl IntoIterator<Item = u32>) -> Self {
        self.ints = ints.into_iter().collect();
        self
    }

    /// Number of fraction draws served so far, scripted or not.
    pub fn fractions_drawn(&self) -> usize {
        self.fractions_drawn
    }

    /// Scripted fractions not yet consumed.
    pub fn remaining(&self) -> usize {
        self.fractions.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn fraction(&mut self) -> f64 {
        self.fractions_drawn += 1;
        self.fractions.pop_front().unwrap_or(0.0)
    }

    fn int_inclusive(&mut self, low: u32, high: u32) -> u32 {
        self.ints.pop_front().map_or(low, |n| n.clamp(low, high))
    }
}
