use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use cardinality_lab::compress::Codec;
use cardinality_lab::driver::{run_study, StudyConfig, DEFAULT_MASTER_SEED};
use cardinality_lab::report::{write_compression_report, write_efficiency_report};
use cardinality_lab::sketch::Encoding;

#[derive(Parser)]
#[command(name = "cardinality-lab", version, about = "Space-efficiency studies for distinct-count sketches")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Measure compressed register-array sizes across the target schedule.
    Compression(CompressionArgs),
    /// Measure memory, serialization, and estimation error across the target schedule.
    Efficiency(EfficiencyArgs),
}

#[derive(Args)]
struct CompressionArgs {
    /// File the report is written to.
    output: PathBuf,
    /// Precision of the evaluated sketch.
    #[arg(short, long, default_value_t = 12)]
    precision: u32,
    /// Number of independent trials.
    #[arg(short = 'n', long, default_value_t = 100)]
    sample_size: usize,
    /// Largest true distinct count to evaluate.
    #[arg(long, default_value_t = 1e21)]
    max: f64,
    /// Relative spacing between consecutive targets.
    #[arg(long, default_value_t = 0.05)]
    step: f64,
    /// Master seed all trial seeds are derived from.
    #[arg(long, default_value_t = DEFAULT_MASTER_SEED)]
    seed: u64,
    /// Largest count reached with real hash insertions.
    #[arg(long, default_value_t = 1_000_000)]
    cutover: u64,
    /// Suppress the progress bar.
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args)]
struct EfficiencyArgs {
    /// Directory the per-encoding reports are written to.
    output: PathBuf,
    /// Precision of the evaluated sketch.
    #[arg(short, long, default_value_t = 12)]
    precision: u32,
    /// Number of independent trials.
    #[arg(short = 'n', long, default_value_t = 1000)]
    sample_size: usize,
    /// Largest true distinct count to evaluate.
    #[arg(long, default_value_t = 1e6)]
    max: f64,
    /// Relative spacing between consecutive targets.
    #[arg(long, default_value_t = 0.05)]
    step: f64,
    /// Master seed all trial seeds are derived from.
    #[arg(long, default_value_t = DEFAULT_MASTER_SEED)]
    seed: u64,
    /// Largest count reached with real hash insertions.
    #[arg(long, default_value_t = 1_000_000)]
    cutover: u64,
    /// Suppress the progress bar.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Compression(args) => run_compression(args),
        Command::Efficiency(args) => run_efficiency(args),
    }
}

fn run_compression(args: CompressionArgs) -> anyhow::Result<()> {
    let results = run_study(StudyConfig {
        precision: args.precision,
        sample_size: args.sample_size,
        master_seed: args.seed,
        cutover: args.cutover,
        max_target: args.max,
        relative_step: args.step,
        codecs: Codec::all(),
        progress: !args.quiet,
    })?;

    let file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    write_compression_report(&mut out, &results)?;
    out.flush()?;
    Ok(())
}

fn run_efficiency(args: EfficiencyArgs) -> anyhow::Result<()> {
    let results = run_study(StudyConfig {
        precision: args.precision,
        sample_size: args.sample_size,
        master_seed: args.seed,
        cutover: args.cutover,
        max_target: args.max,
        relative_step: args.step,
        codecs: Vec::new(),
        progress: !args.quiet,
    })?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    for encoding in Encoding::ALL {
        let path = args.output.join(format!("{}.csv", encoding.label()));
        let file =
            File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        write_efficiency_report(&mut out, &results, encoding)?;
        out.flush()?;
    }
    Ok(())
}
