//! ninegrid -- command-line driver for the card placement game.
//!
//! `ninegrid play` seats a human against one to three bots and reads moves
//! from stdin as `x y card`. `ninegrid selfplay` plays bot-only games and
//! writes one JSON record per game.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ninegrid::board::PlayerId;
use ninegrid::config::{ConfigError, GameConfig};
use ninegrid::error::GameError;
use ninegrid::eval::HeuristicWeights;
use ninegrid::game::{GameStatus, SeatSpec};
use ninegrid::room::{BotTurn, LogBroadcaster, MemoryStore, RoomManager};
use ninegrid::selfplay::{self, SelfPlayConfig, SelfPlayError};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config file (overrides NINEGRID_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Play against bots on the terminal
    Play(PlayArgs),
    /// Bot-only games written as JSON lines
    Selfplay(SelfPlayArgs),
}

#[derive(Debug, Args)]
struct PlayArgs {
    /// Number of bot opponents
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
    bots: u8,

    /// Random seed, 0 for entropy
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Your name
    #[arg(long, default_value = "you")]
    name: String,
}

#[derive(Debug, Args)]
struct SelfPlayArgs {
    /// Number of games to play
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Seats per game
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=4))]
    players: u8,

    /// Random seed, 0 for entropy
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Number of parallel threads
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Opening plies played at random
    #[arg(long, default_value_t = 0)]
    random_plies: usize,

    /// JSON array of weight tables, one per seat id
    #[arg(long)]
    seat_weights: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    SelfPlay(#[from] SelfPlayError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid seat weights: {0}")]
    SeatWeights(String),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = GameConfig::resolve(cli.config.as_deref())
        .map_err(CliError::from)
        .and_then(|config| match cli.mode {
            Mode::Play(args) => run_play(&args, config),
            Mode::Selfplay(args) => run_selfplay(&args, config),
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// One line of player input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Move { x: usize, y: usize, card: u8 },
    Moves,
    Rank,
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.as_slice() {
        ["quit"] | ["exit"] => Some(Input::Quit),
        ["moves"] => Some(Input::Moves),
        ["rank"] => Some(Input::Rank),
        [x, y, card] => Some(Input::Move {
            x: x.parse().ok()?,
            y: y.parse().ok()?,
            card: card.parse().ok()?,
        }),
        _ => None,
    }
}

fn print_bot_turns<W: Write>(out: &mut W, turns: &[BotTurn]) -> io::Result<()> {
    for turn in turns {
        match turn {
            BotTurn::Played { choice, .. } => writeln!(out, "{} (score {})", choice.mv, choice.score)?,
            BotTurn::Skipped(advance) => {
                for id in &advance.skipped {
                    writeln!(out, "{id} passes")?;
                }
            }
        }
    }
    Ok(())
}

fn run_play(args: &PlayArgs, config: GameConfig) -> Result<(), CliError> {
    let manager = if args.seed != 0 {
        RoomManager::with_seed(MemoryStore::new(), LogBroadcaster, config, args.seed)
    } else {
        RoomManager::new(MemoryStore::new(), LogBroadcaster, config)
    };
    let me = PlayerId(0);
    let mut seats = vec![SeatSpec::human(args.name.clone())];
    seats.extend((1..=args.bots).map(|i| SeatSpec::bot(format!("bot {i}"))));
    let room = manager.create_room(&seats)?;
    let code = room.code.clone();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let order: Vec<String> = room.lock().players.iter().map(|p| format!("{} ({})", p.id, p.name)).collect();
    writeln!(out, "room {code}, turn order: {}", order.join(", "))?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let turns = manager.run_bots(&code)?;
        print_bot_turns(&mut out, &turns)?;

        let state = manager.snapshot(&code)?;
        write!(out, "{}", state.board)?;
        match &state.status {
            GameStatus::InProgress => {}
            GameStatus::Won { winner } => {
                writeln!(out, "game over: {winner} wins with four in a row")?;
                break;
            }
            GameStatus::Ended { winner, ranking } => {
                for row in ranking {
                    writeln!(out, "{}: line {} total {}", row.player, row.line_sum, row.total_sum)?;
                }
                match winner {
                    Some(w) => writeln!(out, "game over: {w} wins on points")?,
                    None => writeln!(out, "game over: draw")?,
                }
                break;
            }
        }
        let hand = state.player(me).map(|p| p.hand.clone()).unwrap_or_default();
        writeln!(out, "your hand: {hand:?}")?;
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        match parse_input(&line?) {
            Some(Input::Quit) => break,
            Some(Input::Moves) => {
                let moves = state.legal_moves_for(me)?;
                let list: Vec<String> = moves.iter().map(|m| format!("{},{}:{}", m.x, m.y, m.card)).collect();
                writeln!(out, "legal: {}", list.join(" "))?;
            }
            Some(Input::Rank) => {
                for row in manager.rank(&code)? {
                    writeln!(out, "{}: line {} total {}", row.player, row.line_sum, row.total_sum)?;
                }
            }
            Some(Input::Move { x, y, card }) => {
                if let Err(e) = manager.apply_move(&code, me, x, y, card) {
                    writeln!(out, "error: {e}")?;
                }
            }
            None => writeln!(out, "expected `x y card`, `moves`, `rank` or `quit`")?,
        }
    }
    out.flush()?;
    Ok(())
}

fn load_seat_weights(path: &Path) -> Result<Vec<HeuristicWeights>, CliError> {
    let data = std::fs::read_to_string(path)?;
    let weights: Vec<HeuristicWeights> =
        serde_json::from_str(&data).map_err(|e| CliError::SeatWeights(e.to_string()))?;
    for w in &weights {
        w.validate().map_err(|e| CliError::SeatWeights(e.to_string()))?;
    }
    Ok(weights)
}

fn run_selfplay(args: &SelfPlayArgs, config: GameConfig) -> Result<(), CliError> {
    let seat_weights = match &args.seat_weights {
        Some(path) => load_seat_weights(path)?,
        None => Vec::new(),
    };
    let seed = if args.seed != 0 { args.seed } else { selfplay::fresh_seed() };
    let config = SelfPlayConfig {
        games: args.games,
        players: args.players as usize,
        seed,
        threads: args.threads.max(1),
        random_plies: args.random_plies,
        seat_weights,
        game: config,
    };
    info!(games = config.games, players = config.players, seed, threads = config.threads, "self-play starting");

    let start = Instant::now();
    let games = selfplay::run_self_play(&config)?;
    let summary = selfplay::summarize(&games, config.players);
    info!(
        elapsed_s = start.elapsed().as_secs_f64(),
        wins = ?summary.wins,
        draws = summary.draws,
        four_in_a_row = summary.four_in_a_row,
        "self-play finished"
    );

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            selfplay::write_jsonl(&games, &mut writer)?;
            info!(path = %path.display(), games = games.len(), "wrote games");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)?;
        }
    }
    Ok(())
}
