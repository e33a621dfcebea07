use clap::Parser;
use tracing_subscriber::EnvFilter;
use u_binpack::binpack::{
    solve, BinPackingConfig, ModeKind, SearchMode, DEFAULT_MAX_LOAD, SAMPLE_BINS,
};
use u_binpack::cp::{ExhaustiveConfig, ExhaustiveEngine, ValueOrder};

/// Puts items into bins so that the lightest bin is as heavy as possible,
/// and lists the optimal assignments.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Item weights. Defaults to the twelve-item sample instance.
    #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
    weights: Option<Vec<i64>>,

    /// Number of bins.
    #[arg(short, long, default_value_t = SAMPLE_BINS)]
    bins: usize,

    /// Upper bound on each bin load.
    #[arg(
        short = 'l',
        long,
        default_value_t = DEFAULT_MAX_LOAD,
        allow_hyphen_values = true
    )]
    max_load: i64,

    /// Search mode: fixed-target (0), maximize (1) or two-phase (2).
    #[arg(short, long, default_value = "two-phase")]
    mode: ModeKind,

    /// Minimum load to enumerate in fixed-target mode.
    #[arg(short, long)]
    target: Option<i64>,

    /// Try values in a seeded random order instead of ascending.
    #[arg(long)]
    seed: Option<u64>,

    /// Print every recorded solution.
    #[arg(long)]
    print_solutions: bool,
}

fn main() -> u_binpack::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("u_binpack=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let mut config = BinPackingConfig::default()
        .with_bins(cli.bins)
        .with_max_load(cli.max_load);
    if let Some(weights) = cli.weights {
        config = config.with_weights(weights);
    }
    let mode = SearchMode::new(cli.mode, cli.target)?;

    let engine_config = match cli.seed {
        Some(seed) => ExhaustiveConfig::default()
            .with_value_order(ValueOrder::Shuffled)
            .with_seed(seed),
        None => ExhaustiveConfig::default(),
    };
    let result = solve(ExhaustiveEngine::with_config(engine_config), &config, &mode)?;

    match result.optimum.or(result.target) {
        Some(value) => println!("minimum load {value}: {} solution(s)", result.count()),
        None => println!("no solution"),
    }
    if result.truncated {
        println!("(enumeration truncated)");
    }
    if cli.print_solutions {
        for record in &result.solutions {
            println!("{record}");
        }
    }
    Ok(())
}
