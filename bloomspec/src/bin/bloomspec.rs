use std::hint::black_box;

use anyhow::anyhow;
use bloomspec::{
    compute_bloom_spec, max_buckets_per_element, table,
    utils::{benchmark, ByteSize},
    BloomSpec,
};
use clap::Parser;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
pub struct Args {
    /// Verbose output (overridden by RUST_LOG)
    #[clap(short, long)]
    verbose: bool,
    /// Bloomspec commands
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Compute the number of hash functions and buckets per element
    /// needed to reach a false positive probability
    Spec(Spec),
    /// Show the largest number of buckets per element usable
    /// for a given number of elements
    MaxBuckets(MaxBuckets),
    /// Show the false positive probability table
    Table,
    /// Benchmark parameter computation on random probabilities
    Bench(Bench),
}

#[derive(Debug, Parser)]
struct Spec {
    /// Maximum number of buckets per element allowed
    #[clap(short = 'b', long, default_value_t = 20, conflicts_with = "capacity")]
    max_buckets: usize,
    /// Expected number of elements in the filter, the maximum number
    /// of buckets per element is derived from it
    #[clap(short, long)]
    capacity: Option<u64>,
    /// False positive probability
    #[clap(short, long, default_value_t = 0.01)]
    probability: f64,
}

#[derive(Debug, Parser)]
struct MaxBuckets {
    /// Expected number of elements in the filter
    num_elements: u64,
}

#[derive(Debug, Parser)]
struct Bench {
    /// Number of runs to compute statistics
    #[clap(short, long, default_value_t = 50)]
    runs: u32,
    /// Number of random probabilities computed per run
    #[clap(short = 'n', long, default_value_t = 100_000)]
    samples: usize,
}

fn show_spec(s: &BloomSpec, capacity: Option<u64>) -> Result<(), anyhow::Error> {
    println!("\tk (number of hash functions)       : {}", s.k);
    println!(
        "\tbuckets per element                : {}",
        s.buckets_per_element
    );
    println!("\tfpp (false positive probability)   : {}", s.fpp());

    if let Some(cap) = capacity {
        let bits = s
            .bit_size(cap)
            .ok_or_else(|| anyhow!("filter for {cap} elements does not fit in 64 bits"))?;
        let size = ByteSize::from_bits(bits);
        println!("\tsize in bits                       : {bits}");
        println!("\tsize in bytes                      : {}", size.in_bytes());
        println!("\tsize of bloom filter               : {size}");
    }
    Ok(())
}

fn show_table() {
    for b in 0..table::rows() {
        let row = table::row(b)
            .iter()
            .skip(1)
            .map(|p| format!("{p:e}"))
            .collect::<Vec<String>>()
            .join(" ");
        println!("{b:>2} (k={:>2}): {row}", table::optimal_k(b));
    }
}

fn init_logging(verbose: bool) -> Result<(), anyhow::Error> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    match args.command {
        Command::Spec(o) => {
            let max_buckets = match o.capacity {
                Some(cap) => max_buckets_per_element(cap)?,
                None => o.max_buckets,
            };
            info!(max_buckets, fpp = o.probability, "computing bloom spec");

            let s = compute_bloom_spec(max_buckets, o.probability)?;
            show_spec(&s, o.capacity)?;
        }
        Command::MaxBuckets(o) => {
            println!("{}", max_buckets_per_element(o.num_elements)?);
        }
        Command::Table => show_table(),
        Command::Bench(o) => {
            let mut rng: StdRng = SeedableRng::from_seed([42; 32]);
            let max_buckets = table::rows() - 1;
            let best = table::probability(max_buckets, table::max_k(max_buckets));

            // targets achievable within the largest row
            let targets = (0..o.samples)
                .map(|_| rng.gen_range(best..1.0))
                .collect::<Vec<f64>>();

            let dur = benchmark(
                || {
                    targets.iter().for_each(|&p| {
                        let _ = black_box(compute_bloom_spec(
                            black_box(max_buckets),
                            black_box(p),
                        ));
                    })
                },
                o.runs,
            );

            println!("\tsamples: {}", targets.len());
            println!("\trun duration: {dur:?}");
            println!(
                "\tspeed: {:.1} specs/s",
                targets.len() as f64 / dur.as_secs_f64()
            );
        }
    }
    Ok(())
}
