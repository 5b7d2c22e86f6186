use std::io;

use clap::Parser;
use rookery::chess::core::Promotion;
use rookery::interface::Session;
use tracing_subscriber::EnvFilter;

/// Plays a game of chess on the console: type `help` for the list of
/// commands. Logs are written to stderr and filtered with `RUST_LOG`.
#[derive(Parser, Debug)]
#[command(version, about, long_version = rookery::build::CLAP_LONG_VERSION)]
struct Config {
    /// Starting position instead of the standard one.
    #[arg(long)]
    fen: Option<String>,
    /// Always promote to this piece (q, r, b or n) instead of asking.
    #[arg(long, value_parser = parse_promotion)]
    promotion: Option<Promotion>,
}

fn parse_promotion(input: &str) -> anyhow::Result<Promotion> {
    Promotion::try_from(input)
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "rookery=warn".into()),
        )
        .with_writer(io::stderr)
        .init();
    tracing::debug!(?config, "starting");

    rookery::print_binary_info();
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let mut session = match config.fen {
        Some(fen) => Session::from_fen(&fen, &mut input, &mut output, config.promotion)?,
        None => Session::new(&mut input, &mut output, config.promotion),
    };
    session.run()
}
