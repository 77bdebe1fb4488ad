//! Trial orchestration.
//!
//! A study runs `sample_size` independent trials, each walking the full
//! target schedule with its own seeded simulator, and aggregates per-checkpoint
//! measurements across trials. Trials run in parallel over fixed-size chunks;
//! each chunk folds its trials in order and the chunk partials are folded in
//! chunk order afterwards, so floating-point sums come out identical for any
//! worker-thread count.

use indicatif::ProgressBar;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;

use crate::compress::{Codec, Compressor};
use crate::counter::WideCounter;
use crate::schedule::target_counts;
use crate::simulate::GrowthSimulator;
use crate::sketch::{Encoding, HyperLogLog, RegisterSketch};
use crate::stats::CheckpointStats;
use crate::Result;

/// Default master seed; trial seeds are derived from it.
pub const DEFAULT_MASTER_SEED: u64 = 0xd722301e3c920bc8;

/// Trials per parallel work unit. Large enough to amortize simulator setup,
/// small enough to keep all workers busy at typical sample sizes.
const TRIAL_CHUNK: usize = 32;

#[derive(Debug, Clone)]
pub struct StudyConfig {
    pub precision: u32,
    pub sample_size: usize,
    pub master_seed: u64,
    /// True counts up to this limit are reached by inserting real hashes;
    /// beyond it the simulator replays sampled register transitions.
    pub cutover: u64,
    pub max_target: f64,
    pub relative_step: f64,
    pub codecs: Vec<Codec>,
    pub progress: bool,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            precision: 12,
            sample_size: 100,
            master_seed: DEFAULT_MASTER_SEED,
            cutover: 1_000_000,
            max_target: 1e21,
            relative_step: 0.05,
            codecs: Codec::all(),
            progress: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StudyResults {
    pub config: StudyConfig,
    pub targets: Vec<WideCounter>,
    pub checkpoints: Vec<CheckpointStats>,
}

/// Run all trials of a study and aggregate their measurements.
pub fn run_study(config: StudyConfig) -> Result<StudyResults> {
    assert!(config.sample_size > 0, "sample_size must be positive");

    let targets = target_counts(config.max_target, config.relative_step);
    let offset = WideCounter::from_u64(config.cutover);

    let mut seed_rng = ChaCha20Rng::seed_from_u64(config.master_seed);
    let seeds: Vec<u64> = (0..config.sample_size).map(|_| seed_rng.gen()).collect();

    let bar = if config.progress {
        ProgressBar::new(config.sample_size as u64)
    } else {
        ProgressBar::hidden()
    };

    let partials = seeds
        .par_chunks(TRIAL_CHUNK)
        .map(|chunk| {
            let mut stats: Vec<CheckpointStats> = targets
                .iter()
                .map(|&target| CheckpointStats::new(target, config.codecs.len()))
                .collect();
            let mut simulator = GrowthSimulator::<HyperLogLog>::new(config.precision, offset)?;
            for &seed in chunk {
                simulator.reset(seed, offset);
                for (&target, checkpoint) in targets.iter().zip(stats.iter_mut()) {
                    simulator.advance_to(target);
                    measure(simulator.sketch(), target, &config.codecs, checkpoint)?;
                }
                bar.inc(1);
            }
            Ok(stats)
        })
        .collect::<Result<Vec<_>>>()?;
    bar.finish_and_clear();

    let mut checkpoints: Vec<CheckpointStats> = targets
        .iter()
        .map(|&target| CheckpointStats::new(target, config.codecs.len()))
        .collect();
    for partial in &partials {
        for (total, part) in checkpoints.iter_mut().zip(partial) {
            total.merge(part);
        }
    }

    Ok(StudyResults {
        config,
        targets,
        checkpoints,
    })
}

/// Take every measurement for one sketch state at one checkpoint.
fn measure(
    sketch: &HyperLogLog,
    target: WideCounter,
    codecs: &[Codec],
    stats: &mut CheckpointStats,
) -> Result<()> {
    let packed = sketch.register_bytes();
    let expanded = sketch.expand_registers();

    stats.record_memory(Encoding::Packed6, sketch.size_of() as u64);
    stats.record_memory(
        Encoding::Dense8,
        (std::mem::size_of::<HyperLogLog>() + expanded.len()) as u64,
    );
    stats.record_serialized(Encoding::Packed6, packed.len() as u64);
    stats.record_serialized(Encoding::Dense8, expanded.len() as u64);
    stats.record_estimate(sketch.estimate(), target.as_f64());

    for (index, codec) in codecs.iter().enumerate() {
        stats.record_compressed(Encoding::Packed6, index, codec.compressed_len(packed)? as u64);
        stats.record_compressed(Encoding::Dense8, index, codec.compressed_len(&expanded)? as u64);
    }
    Ok(())
}
