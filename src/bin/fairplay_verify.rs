//! Fairplay Verifier Binary
//!
//! Replays a bet from its revealed seeds and nonce, optionally checking the
//! commitment shown before the bet and the outcome the house reported.

use clap::Parser;
use fairplay::games::{Game, GameRegistry, GameType, Outcome, RiskTier, RouletteVariant};
use fairplay::verification::{verify_record, VerificationRequest};
use fairplay::{ConfigLoader, FairplayError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "fairplay-verify")]
#[command(about = "Verify a provably-fair game outcome", long_about = None)]
struct Args {
    /// Revealed server seed
    #[arg(long)]
    server_seed: String,

    /// Client seed in use for the bet
    #[arg(long)]
    client_seed: String,

    /// Nonce of the bet
    #[arg(long)]
    nonce: u64,

    /// Game type (dice, coin, dice2, limbo, wheel, keno, mines, plinko, roulette)
    #[arg(long)]
    game: GameType,

    /// Mine count for mines, row count for plinko
    #[arg(long)]
    param: Option<u32>,

    /// Plinko risk tier (low, medium, high)
    #[arg(long)]
    risk: Option<RiskTier>,

    /// Roulette variant (european, american)
    #[arg(long)]
    variant: Option<RouletteVariant>,

    /// Commitment published before the bet
    #[arg(long)]
    server_seed_hash: Option<String>,

    /// Reported outcome as JSON, e.g. '{"game":"dice","face":4}'
    #[arg(long)]
    expected: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file (only the logging section is used)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loader = match &args.config {
        Some(path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let game = Game::from_parts(args.game, args.param, args.risk, args.variant)?;
    let reported = args
        .expected
        .as_deref()
        .map(serde_json::from_str::<Outcome>)
        .transpose()
        .map_err(|e| format!("Invalid --expected outcome: {}", e))?;

    let request = VerificationRequest {
        server_seed: args.server_seed,
        server_seed_hash: args.server_seed_hash,
        client_seed: args.client_seed,
        nonce: args.nonce,
        game,
        reported,
    };

    let registry = GameRegistry::new();
    let report = match verify_record(&registry, &request) {
        Ok(report) => report,
        Err(FairplayError::FairnessViolation(violation)) => {
            eprintln!("❌ Commitment check failed: {}", violation);
            return Ok(ExitCode::from(2));
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("🎲 {} (protocol {})", game, report.protocol);
        println!("   Server seed hash: {}", report.server_seed_hash);
        println!("   Client seed:      {}", request.client_seed);
        println!("   Nonce:            {}", report.nonce);
        println!("   Outcome:          {}", serde_json::to_string(&report.recomputed)?);
        match &report.reported {
            Some(_) if report.matches => println!("✅ Reported outcome matches"),
            Some(reported) => println!("❌ Reported outcome differs: {}", serde_json::to_string(reported)?),
            None => {}
        }
    }

    Ok(if report.matches { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
