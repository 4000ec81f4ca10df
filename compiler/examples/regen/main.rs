use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use regen_compiler::{compile, parse, Config};
use regen_runtime::{Context, ParallelExecutor};

/// generate random strings matching a regular expression
#[derive(Parser, Debug)]
#[command(name = "regen")]
struct Cli {
    /// the pattern to generate from
    pattern: String,

    /// number of strings to generate, one per line
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// seed for reproducible output (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// invoke concatenation and repetition children on the rayon pool
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// repetition count substituted for `*`, `+` and `{n,}`
    #[arg(long, default_value_t = Config::DEFAULT_MAX_UNBOUNDED_REPEAT)]
    max_repeat: u32,

    /// print the simplified syntax tree before generating
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::default().with_max_unbounded_repeat(cli.max_repeat);
    let config = if cli.parallel {
        config.with_executor(ParallelExecutor::new())
    } else {
        config
    };

    let regexp = parse(&cli.pattern).map_err(|e| e.to_string())?;

    if cli.debug {
        println!(
            "DEBUG
--------
{}--------
",
            regexp.simplify().inspect()
        )
    }

    let generator = compile(&regexp, &config).map_err(|e| e.to_string())?;

    let seed = cli.seed.unwrap_or_else(|| rand::rng().random());
    tracing::info!(seed, pattern = %generator, "generating");

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..cli.count {
        let mut ctx = Context::new(&mut rng);
        println!("{}", generator.generate(&mut ctx));
    }

    Ok(())
}
