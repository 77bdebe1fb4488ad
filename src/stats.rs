//! Per-checkpoint measurement accumulators.
//!
//! Trials contribute measurements independently; accumulators merge with a
//! commutative, associative operation whose identity is the empty
//! accumulator, so per-trial partial aggregates can be folded in any fixed
//! order without locks.

use crate::counter::WideCounter;
use crate::sketch::Encoding;

/// Count, sum, and extrema over a stream of byte sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeAccumulator {
    count: u64,
    sum: u64,
    min: u64,
    max: u64,
}

impl Default for SizeAccumulator {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0,
            min: u64::MAX,
            max: 0,
        }
    }
}

impl SizeAccumulator {
    pub fn record(&mut self, bytes: u64) {
        self.count += 1;
        self.sum += bytes;
        self.min = self.min.min(bytes);
        self.max = self.max.max(bytes);
    }

    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn mean(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }
}

/// Signed and squared estimation-error sums.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ErrorAccumulator {
    count: u64,
    sum_error: f64,
    sum_squared_error: f64,
}

impl ErrorAccumulator {
    pub fn record(&mut self, error: f64) {
        self.count += 1;
        self.sum_error += error;
        self.sum_squared_error += error * error;
    }

    pub fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum_error += other.sum_error;
        self.sum_squared_error += other.sum_squared_error;
    }
}

/// All measurements taken at one checkpoint of the schedule, across trials:
/// per-encoding memory and serialized sizes, estimation errors, and one
/// compressed-size accumulator per (encoding, codec) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointStats {
    true_count: f64,
    memory: [SizeAccumulator; 2],
    serialized: [SizeAccumulator; 2],
    error: ErrorAccumulator,
    compressed: Vec<SizeAccumulator>,
    codec_count: usize,
}

impl CheckpointStats {
    pub fn new(true_count: WideCounter, codec_count: usize) -> Self {
        Self {
            true_count: true_count.as_f64(),
            memory: [SizeAccumulator::default(); 2],
            serialized: [SizeAccumulator::default(); 2],
            error: ErrorAccumulator::default(),
            compressed: vec![SizeAccumulator::default(); Encoding::ALL.len() * codec_count],
            codec_count,
        }
    }

    pub fn record_memory(&mut self, encoding: Encoding, bytes: u64) {
        self.memory[encoding.index()].record(bytes);
    }

    pub fn record_serialized(&mut self, encoding: Encoding, bytes: u64) {
        self.serialized[encoding.index()].record(bytes);
    }

    pub fn record_estimate(&mut self, estimate: f64, true_count: f64) {
        self.error.record(estimate - true_count);
    }

    pub fn record_compressed(&mut self, encoding: Encoding, codec: usize, bytes: u64) {
        self.compressed[encoding.index() * self.codec_count + codec].record(bytes);
    }

    /// Fold another checkpoint's measurements into this one. Both sides must
    /// describe the same checkpoint and codec grid.
    pub fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.true_count.to_bits(), other.true_count.to_bits());
        debug_assert_eq!(self.codec_count, other.codec_count);
        for (lhs, rhs) in self.memory.iter_mut().zip(&other.memory) {
            lhs.merge(rhs);
        }
        for (lhs, rhs) in self.serialized.iter_mut().zip(&other.serialized) {
            lhs.merge(rhs);
        }
        self.error.merge(&other.error);
        for (lhs, rhs) in self.compressed.iter_mut().zip(&other.compressed) {
            lhs.merge(rhs);
        }
    }

    pub fn true_count(&self) -> f64 {
        self.true_count
    }

    pub fn memory(&self, encoding: Encoding) -> &SizeAccumulator {
        &self.memory[encoding.index()]
    }

    pub fn serialized(&self, encoding: Encoding) -> &SizeAccumulator {
        &self.serialized[encoding.index()]
    }

    pub fn mean_compressed(&self, encoding: Encoding, codec: usize) -> f64 {
        self.compressed[encoding.index() * self.codec_count + codec].mean()
    }

    /// Mean signed estimation error relative to the true count.
    pub fn relative_bias(&self) -> f64 {
        (self.error.sum_error / self.error.count as f64) / self.true_count
    }

    /// Root-mean-square estimation error relative to the true count.
    pub fn relative_rmse(&self) -> f64 {
        (self.error.sum_squared_error / self.error.count as f64).sqrt() / self.true_count
    }

    /// Memory-variance product: in-memory size in bits times the relative
    /// mean squared error. Lower is better; the product is scale-free for a
    /// well-behaved sketch.
    pub fn memory_mvp(&self, encoding: Encoding) -> f64 {
        self.mvp(self.memory[encoding.index()].mean())
    }

    /// Serialization-variance product, the serialized-size analogue of
    /// [`memory_mvp`](Self::memory_mvp).
    pub fn serialized_mvp(&self, encoding: Encoding) -> f64 {
        self.mvp(self.serialized[encoding.index()].mean())
    }

    fn mvp(&self, mean_size_bytes: f64) -> f64 {
        mean_size_bytes * 8.0 * self.error.sum_squared_error
            / (self.error.count as f64 * self.true_count * self.true_count)
    }
}
