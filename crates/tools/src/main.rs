use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use cache_key::{CacheKeyBuilder, DirectIdentity};
use clap::{ArgAction, Parser, Subcommand};
use tools::{bench, manifest, perf_log};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Derive the key for identities given on the command line
    Key {
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        all: Vec<i64>,
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        any: Vec<i64>,
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        exclude: Vec<i64>,
    },
    /// Key every query of a TOML manifest, one JSON line per query
    Manifest { path: PathBuf },
    /// Time key derivation and append the result to the perf log
    Bench {
        #[arg(short, long, default_value_t = 8)]
        scale: u32,
        #[arg(short, long, default_value_t = 10_000)]
        iterations: u32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Perf log directory; the record is only printed when omitted
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Compare perf logs recorded on two dates (YYYY-MM-DD)
    Compare {
        #[arg(short, long, default_value = "reports/perf")]
        dir: PathBuf,
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
        /// Percent change needed to count as improvement or regression
        #[arg(short, long, default_value_t = 5.0)]
        threshold: f64,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    tools::init_logging(args.verbose);

    match args.command {
        Command::Key { all, any, exclude } => {
            let mut builder = CacheKeyBuilder::new();
            let key = builder.build(&all, &any, &exclude, &DirectIdentity);
            println!("Layout: {:?}", builder.last_layout());
            println!("Key: {key}");
            println!("Key (hex): {}", key.to_hex());
        }
        Command::Manifest { path } => {
            let entries = manifest::load_manifest(&path)
                .with_context(|| format!("Failed to load manifest: {}", path.display()))?;
            let report = manifest::key_queries(&entries);
            for query in &report.queries {
                println!("{}", serde_json::to_string(query)?);
            }
            for (first, second) in &report.aliases {
                eprintln!("alias: {first} == {second}");
            }
            if !report.collisions.is_empty() {
                for collision in &report.collisions {
                    eprintln!(
                        "collision: {} and {} share key {}",
                        collision.first, collision.second, collision.key
                    );
                }
                bail!("{} cache key collision(s) in manifest", report.collisions.len());
            }
        }
        Command::Bench { scale, iterations, seed, out } => {
            let config = bench::BenchConfig { scale, iterations, seed };
            let outcome = bench::run(&config);
            let record = outcome.to_record(&config);
            println!("{}", serde_json::to_string(&record)?);
            if let Some(dir) = out {
                let path = perf_log::append_record(&dir, &record)
                    .with_context(|| format!("Failed to append perf record in {}", dir.display()))?;
                println!("Appended to {}", path.display());
            }
        }
        Command::Compare { dir, old, new, threshold } => {
            let by_test = perf_log::load_dir(&dir)
                .with_context(|| format!("Failed to read perf logs in {}", dir.display()))?;
            let results = perf_log::compare(&by_test, &old, &new, threshold);
            println!("Performance comparison: {old} vs {new}");
            for result in &results {
                print_comparison(result);
            }
        }
    }

    Ok(())
}

fn print_comparison(result: &perf_log::TestComparison) {
    use perf_log::Verdict;

    let label = match result.verdict {
        Verdict::Improvement => "[+]",
        Verdict::Regression => "[-]",
        Verdict::Unchanged => "[=]",
        Verdict::New => "[new]",
        Verdict::Missing => "[gone]",
    };
    match (result.old, result.new, result.diff_pct) {
        (Some(old), Some(new), Some(diff_pct)) => println!(
            "{label:<7}{:<50} {:>8.2}ms -> {:>8.2}ms  ({diff_pct:>+6.1}%)",
            result.test, old.avg, new.avg
        ),
        (_, Some(stats), _) | (Some(stats), None, _) => println!(
            "{label:<7}{:<50} {:>8.2}ms  (n={})",
            result.test, stats.avg, stats.count
        ),
        (None, None, _) => {}
    }
}
