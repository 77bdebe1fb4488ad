//! ## Growth simulation
//! Drives a register sketch to arbitrarily large distinct counts without
//! inserting one element per count.
//!
//! A register reaches rank `nlz + 1` the first time a hash addresses it with
//! exactly `nlz` leading zero bits, an event of probability
//! `2^-min(64, 1 + p + nlz)` per distinct element. The number of distinct
//! elements until the first success is geometric and is modelled here by
//! `floor(E * 2^min(64, 1 + p + nlz)) + 1` with `E` standard exponential.
//! Sampling one such threshold per (register, level) pair and replaying the
//! events in threshold order reproduces the register state a real insertion
//! stream of that length would produce, up to the model's approximation.
//!
//! The approximation is weakest at small counts, so below a cutover the
//! simulator inserts real pseudo-random hashes one by one and the sampled
//! thresholds are offset past the cutover.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::counter::WideCounter;
use crate::error::Result;
use crate::sketch::RegisterSketch;

const TOP_BIT: u64 = 1 << 63;

/// One pre-sampled register transition: when the sketch's true distinct
/// count reaches `threshold`, inserting `hash` applies the transition.
#[derive(Debug, Clone, Copy)]
struct Transition {
    threshold: WideCounter,
    hash: u64,
}

/// Simulates the growth of one register sketch across a whole trial.
///
/// A trial is one `reset` (which re-samples all transitions from the trial
/// seed) followed by calls to [`advance_to`](Self::advance_to) with
/// non-decreasing targets. Within a trial the replay cursor only moves
/// forward, so advancing to a target directly or through intermediate
/// checkpoints yields identical register state.
pub struct GrowthSimulator<S> {
    precision: u32,
    sketch: S,
    transitions: Vec<Transition>,
    next_transition: usize,
    true_count: WideCounter,
    cutover: WideCounter,
    rng: ChaCha20Rng,
}

impl<S: RegisterSketch> GrowthSimulator<S> {
    /// Create a simulator for `2^precision` registers. Targets at or below
    /// `cutover` are reached by inserting real pseudo-random hashes.
    pub fn new(precision: u32, cutover: WideCounter) -> Result<Self> {
        let sketch = S::create(precision)?;
        let levels = (65 - precision) as usize;
        Ok(Self {
            precision,
            sketch,
            transitions: Vec::with_capacity((1usize << precision) * levels),
            next_transition: 0,
            true_count: WideCounter::zero(),
            cutover,
            rng: ChaCha20Rng::seed_from_u64(0),
        })
    }

    /// Start a new trial: reseed the generator, clear the sketch, and
    /// re-sample one transition per (register, level) pair, shifted past
    /// `offset`, sorted ascending by threshold.
    pub fn reset(&mut self, seed: u64, offset: WideCounter) {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
        self.sketch.reset();
        self.true_count = WideCounter::zero();
        self.next_transition = 0;
        self.transitions.clear();

        let m = 1u64 << self.precision;
        for nlz in 0..=64 - self.precision {
            let exponent = (1 + self.precision + nlz).min(64);
            let scale = 2f64.powi(exponent as i32);
            for idx in 0..m {
                let mut threshold = WideCounter::floor(self.next_exponential() * scale);
                // The threshold is 1-based: the earliest possible first
                // success is the very first distinct element.
                threshold.increment();
                threshold.add(offset);
                // A single level bit at position 63 - nlz (absent for the
                // capped top level) plus the register index in the low bits:
                // inserting this hash raises exactly register `idx` to rank
                // `nlz + 1`.
                let hash = (((TOP_BIT >> self.precision) >> nlz) << self.precision) | idx;
                self.transitions.push(Transition { threshold, hash });
            }
        }
        self.transitions
            .sort_by_key(|transition| transition.threshold);
    }

    /// Advance the true distinct count to `target`, updating the sketch on
    /// the way. Targets at or below the current count are no-ops.
    pub fn advance_to(&mut self, target: WideCounter) {
        let direct_limit = target.min(self.cutover);
        while self.true_count < direct_limit {
            let hash = self.rng.gen::<u64>();
            self.sketch.insert_hash(hash);
            self.true_count.increment();
        }
        if self.true_count < target {
            while self.next_transition < self.transitions.len() {
                let transition = self.transitions[self.next_transition];
                if transition.threshold > target {
                    break;
                }
                self.sketch.insert_hash(transition.hash);
                self.next_transition += 1;
            }
            self.true_count = target;
        }
    }

    pub fn sketch(&self) -> &S {
        &self.sketch
    }

    pub fn true_count(&self) -> WideCounter {
        self.true_count
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Standard exponential variate by inversion. `gen::<f64>()` is uniform
    /// in `[0, 1)`, so the logarithm argument stays in `(0, 1]`.
    fn next_exponential(&mut self) -> f64 {
        -(1.0 - self.rng.gen::<f64>()).ln()
    }
}
