//! Session CLI
//!
//! Play against the search AI, run self-play matches, or generate a synthetic
//! training set.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, bail};
use chess_core::{Color, File, Piece, Position, Rank, Square, color_name};
use clap::{Args, Parser, Subcommand};
use game_session::{
    EvaluatorKind, GameOrchestrator, MatchConfig, MatchRunner, PlayerType, SessionConfig,
};
use neural_engine::generate_synthetic;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chess_session", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play from the terminal, moves in square-pair notation (e2e4, e7e8q)
    Play(#[clap(flatten)] SessionArgs),
    /// Let two AI players play a series of games
    Selfplay(#[clap(flatten)] SelfplayArgs),
    /// Generate a synthetic training set
    GenData(#[clap(flatten)] GenDataArgs),
}

#[derive(Debug, Clone, Args)]
struct SessionArgs {
    /// TOML session config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// human, random_ai or search_ai
    #[arg(long)]
    white: Option<PlayerType>,
    /// human, random_ai or search_ai
    #[arg(long)]
    black: Option<PlayerType>,
    /// Search depth in plies
    #[arg(long)]
    depth: Option<u8>,
    /// Prune with alpha-beta
    #[arg(long)]
    alpha_beta: bool,
    /// Per-move deadline in milliseconds
    #[arg(long)]
    move_time_ms: Option<u64>,
    /// Learned model (.json or .onnx); random evaluation if absent
    #[arg(long)]
    model: Option<PathBuf>,
    /// Seed for the random evaluators
    #[arg(long)]
    seed: Option<u64>,
    /// Start from this position instead of the initial one
    #[arg(long)]
    fen: Option<String>,
}

#[derive(Debug, Clone, Args)]
struct SelfplayArgs {
    #[clap(flatten)]
    session: SessionArgs,
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: u32,
    /// Plies per game before it is called a draw
    #[arg(long, default_value_t = 200)]
    max_plies: u32,
}

#[derive(Debug, Clone, Args)]
struct GenDataArgs {
    /// Number of positions to generate
    #[arg(long, default_value_t = 1000)]
    samples: usize,
    /// Output file path
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Play(args) => play(&args),
        Command::Selfplay(args) => selfplay(&args),
        Command::GenData(args) => gen_data(&args),
    }
}

impl SessionArgs {
    /// Config file (or defaults) with command-line overrides applied.
    fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)?,
            None => SessionConfig::default(),
        };
        if let Some(white) = self.white {
            config.players.white = white;
        }
        if let Some(black) = self.black {
            config.players.black = black;
        }
        if let Some(depth) = self.depth {
            config.search.depth = depth;
        }
        if self.alpha_beta {
            config.search.alpha_beta = true;
        }
        if let Some(ms) = self.move_time_ms {
            config.search.move_time_ms = Some(ms);
        }
        if let Some(model) = &self.model {
            config.evaluator.kind = EvaluatorKind::Learned;
            config.evaluator.model = Some(model.clone());
        }
        if let Some(seed) = self.seed {
            config.evaluator.seed = Some(seed);
        }
        config.validate()?;
        Ok(config)
    }

    fn build(&self) -> anyhow::Result<GameOrchestrator> {
        let (mut session, source) = self.session_config()?.build()?;
        // a fallback was already reported by the config layer
        if !source.is_fallback() {
            info!(?source, "evaluator ready");
        }
        if let Some(fen) = &self.fen {
            let position = Position::from_fen(fen).context("bad --fen")?;
            session.load_position(position);
        }
        Ok(session)
    }
}

fn play(args: &SessionArgs) -> anyhow::Result<()> {
    let mut session = args.build()?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Commands: a move such as e2e4, `fen`, `reset`, `quit`");
    loop {
        print_board(session.position());
        let status = session.query_status();
        if status.is_game_over {
            let ending = status
                .terminal
                .map_or_else(String::new, |t| format!(" by {t}"));
            println!("{}{ending}", status.state);
            break;
        }
        if status.in_check {
            println!("Check!");
        }

        if session.is_ai_turn() {
            println!(
                "{} ({}) is thinking...",
                color_name(status.side_to_move),
                status.player_type
            );
            let outcome = session.step_ai_turn()?;
            if let Some(notation) = outcome.notation {
                println!("AI plays {notation}");
            }
            continue;
        }

        print!("{}> ", status.state);
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "fen" => println!("{}", session.fen()),
            "reset" => session.reset(),
            text => {
                if let Err(e) = session.request_move_notation(text) {
                    println!("{e}");
                }
            }
        }
    }

    if !session.history().is_empty() {
        println!("Moves: {}", session.history().join(" "));
    }
    Ok(())
}

fn selfplay(args: &SelfplayArgs) -> anyhow::Result<()> {
    let mut session = args.session.build()?;
    let players = session.players();
    if players.human_side().is_some() {
        bail!("selfplay needs --white and --black set to random_ai or search_ai");
    }

    let runner = MatchRunner::new(MatchConfig {
        num_games: args.games,
        max_plies: args.max_plies,
    });
    let result = runner.run_match(&mut session)?;

    println!(
        "{} (white) vs {} (black): +{} ={} -{} over {} games, White scores {:.1}%",
        players.white,
        players.black,
        result.white_wins,
        result.draws,
        result.black_wins,
        result.total_games(),
        result.white_score() * 100.0
    );
    Ok(())
}

fn gen_data(args: &GenDataArgs) -> anyhow::Result<()> {
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let dataset = generate_synthetic(args.samples, &mut rng)?;
    dataset
        .save(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;
    println!("Wrote {} samples to {}", dataset.len(), args.out.display());
    Ok(())
}

fn print_board(pos: &Position) {
    println!();
    for rank in Rank::ALL.into_iter().rev() {
        let mut row = format!("{} ", rank as usize + 1);
        for file in File::ALL {
            let ch = match pos.piece_at(Square::new(file, rank)) {
                Some((color, piece)) => piece_char(color, piece),
                None => '.',
            };
            row.push(' ');
            row.push(ch);
        }
        println!("{row}");
    }
    println!("   a b c d e f g h");
}

fn piece_char(color: Color, piece: Piece) -> char {
    let ch = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    };
    match color {
        Color::White => ch.to_ascii_uppercase(),
        Color::Black => ch,
    }
}
