//! Command-line front end for the renju engine
//!
//! `best` searches one position; `analyze` evaluates every position of a
//! game history in parallel and prints one JSON record per position.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rayon::prelude::*;

use renju::protocol::{format_move, parse_moves, side_to_move, EvalRequest, EvalResponse};
use renju::{Board, Engine, EngineConfig, EngineError};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON engine configuration; defaults apply to missing fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the deepest alpha-beta iteration
    #[arg(short, long, global = true)]
    depth: Option<u32>,

    /// Override the alpha-beta time budget in milliseconds
    #[arg(short, long, global = true)]
    time_ms: Option<u64>,

    /// Seed for root move randomness
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Best move for the side to move after the whole history
    Best {
        /// Move history such as "h8 i9 j10"
        #[arg(short, long, default_value = "")]
        moves: String,
    },
    /// Evaluate each position of a history
    Analyze {
        /// Move history such as "h8 i9 j10"
        #[arg(short, long)]
        moves: String,

        /// Only look for forced wins
        #[arg(long, action = clap::ArgAction::SetTrue)]
        light: bool,

        /// First position to evaluate (number of moves replayed)
        #[arg(long, default_value_t = 0)]
        from: usize,

        /// Last position to evaluate; defaults to the final one
        #[arg(long)]
        to: Option<usize>,
    },
}

fn load_config(args: &Args) -> Result<EngineConfig, EngineError> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    if let Some(ms) = args.time_ms {
        config.time_limit_ms = ms;
    }
    config.validate()?;
    Ok(config)
}

fn build_engine(config: &EngineConfig, seed: Option<u64>) -> Result<Engine, EngineError> {
    let engine = Engine::new(config.clone())?;
    Ok(match seed {
        Some(seed) => engine.with_seed(seed),
        None => engine,
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;

    match &args.command {
        Command::Best { moves } => {
            let history = parse_moves(moves)?;
            let board = Board::from_moves(&history)?;
            let side = side_to_move(history.len());
            let mut engine = build_engine(&config, args.seed)?;

            let result = engine.get_move(&board, side)?;
            log::info!(
                "{} plays {} ({:?}, score {}, {}ms)",
                side,
                format_move(result.best_move),
                result.search_type,
                result.score,
                result.time_ms
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Analyze {
            moves,
            light,
            from,
            to,
        } => {
            let total = parse_moves(moves)?.len();
            let last = to.unwrap_or(total).min(total);
            if *from > last {
                return Err(EngineError::InvalidInput(format!(
                    "empty range {}..={} for a history of {} moves",
                    from, last, total
                ))
                .into());
            }

            let responses: Vec<Result<EvalResponse, EngineError>> = (*from..=last)
                .into_par_iter()
                .map(|move_index| {
                    let request = EvalRequest {
                        moves: moves.clone(),
                        move_index,
                        light: *light,
                    };
                    build_engine(&config, args.seed)?.evaluate_request(&request)
                })
                .collect();

            for response in responses {
                match response {
                    Ok(response) => println!("{}", serde_json::to_string(&response)?),
                    Err(e) => log::error!("evaluation failed: {}", e),
                }
            }
        }
    }
    Ok(())
}
