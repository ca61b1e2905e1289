use anyhow::{Result, bail};
use clap::{ArgAction, Parser};
use tools::survey::{SurveyConfig, run};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 100_000)]
    queries: u32,
    /// Size of the identity pool queries draw from
    #[arg(short, long, default_value_t = 32)]
    universe: u64,
    #[arg(short, long, default_value_t = 4)]
    max_per_domain: u32,
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tools::init_logging(args.verbose);

    println!(
        "Surveying {} queries on seed {} (universe {}, up to {} per domain)...",
        args.queries, args.seed, args.universe, args.max_per_domain
    );
    let config = SurveyConfig {
        seed: args.seed,
        queries: args.queries,
        universe: args.universe,
        max_per_domain: args.max_per_domain,
    };
    let report = run(&config);

    println!("Distinct shapes: {}", report.distinct_shapes);
    println!("Repeated shapes: {}", report.repeats);
    println!("Collisions: {}", report.collisions.len());
    for collision in &report.collisions {
        println!(
            "  key {}: layout digest {:#018x} vs {:#018x} ({:?})",
            collision.key, collision.first_digest, collision.second_digest, collision.second_layout
        );
    }
    if !report.collisions.is_empty() {
        bail!("found {} cache key collision(s)", report.collisions.len());
    }
    Ok(())
}
