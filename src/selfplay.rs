//! Bot-versus-bot game generation.
//!
//! Plays full games with every seat driven by the greedy bot, optionally with
//! a few random opening plies for variety and a different weight table per
//! seat. Records are written as JSON lines for offline weight tuning.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::board::{Move, PlayerId, CARD_MAX};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::eval::HeuristicWeights;
use crate::game::{GameState, GameStatus, SeatSpec};
use crate::movegen::random_move;
use crate::room::EndReason;
use crate::rules::RankRow;
use crate::search::choose_move;

/// Errors that can stop a self-play batch.
#[derive(Debug, thiserror::Error)]
pub enum SelfPlayError {
    #[error("game failed: {0}")]
    Game(#[from] GameError),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for self-play game generation.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub games: usize,
    /// Seats per game (2-4).
    pub players: usize,
    /// Random seed (0 = use entropy). Game `i` is seeded with `seed + i`.
    pub seed: u64,
    /// Worker threads for concurrent games.
    pub threads: usize,
    /// Opening plies played at random before the bots take over.
    pub random_plies: usize,
    /// Weights per seat id, cycled; empty means `game.weights` for everyone.
    pub seat_weights: Vec<HeuristicWeights>,
    pub game: GameConfig,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            games: 10,
            players: 2,
            seed: 0,
            threads: 1,
            random_plies: 0,
            seat_weights: Vec::new(),
            game: GameConfig::default(),
        }
    }
}

impl SelfPlayConfig {
    fn weights_for(&self, id: PlayerId) -> &HeuristicWeights {
        if self.seat_weights.is_empty() {
            &self.game.weights
        } else {
            &self.seat_weights[id.0 as usize % self.seat_weights.len()]
        }
    }

    fn rng_for(&self, game_id: usize) -> SmallRng {
        if self.seed != 0 {
            SmallRng::seed_from_u64(self.seed.wrapping_add(game_id as u64))
        } else {
            SmallRng::from_entropy()
        }
    }
}

/// Complete record of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    /// Turn order after the seat shuffle.
    pub order: Vec<PlayerId>,
    pub moves: Vec<Move>,
    /// Seats that had to pass, in order.
    pub skips: Vec<PlayerId>,
    pub winner: Option<PlayerId>,
    pub reason: EndReason,
    pub ranking: Vec<RankRow>,
}

/// Plays one game to completion.
pub fn play_game(config: &SelfPlayConfig, game_id: usize, rng: &mut SmallRng) -> Result<GameRecord, GameError> {
    let seats: Vec<SeatSpec> = (0..config.players).map(|i| SeatSpec::bot(format!("bot {i}"))).collect();
    let mut state = GameState::deal(&seats, &config.game, rng)?;
    let order: Vec<PlayerId> = state.players.iter().map(|p| p.id).collect();
    let mut skips = Vec::new();

    // Every move spends a card, so this bounds the game length.
    let max_plies = config.players * config.game.copies_per_value * CARD_MAX as usize + config.players;
    let mut plies = 0;

    while let Some(player) = state.current_player() {
        if plies > max_plies {
            warn!(game_id, plies, "game did not terminate, abandoning");
            break;
        }
        plies += 1;
        let (id, hand) = (player.id, player.hand.clone());

        let mv = if state.history.len() < config.random_plies {
            random_move(&state.board, &hand, id, rng)
        } else {
            match choose_move(&state.board, &hand, id, config.weights_for(id)) {
                Ok(choice) => Some(choice.mv),
                Err(e) if e.is_skip() => None,
                Err(e) => return Err(e),
            }
        };

        let advance = match mv {
            Some(mv) => state.apply_move(id, mv.x, mv.y, mv.card)?.advance,
            None => state.skip_turn(id)?,
        };
        skips.extend(advance.skipped);
    }

    let reason = match state.status {
        GameStatus::Won { .. } => EndReason::FourInARow,
        _ => EndReason::NoMovesLeft,
    };
    Ok(GameRecord {
        game_id,
        order,
        winner: state.status.winner(),
        reason,
        ranking: state.ranking(),
        skips,
        moves: state.history,
    })
}

/// Runs self-play generation, producing records ordered by game id.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, SelfPlayError> {
    let mut games = Vec::with_capacity(config.games);
    let mut failure = None;
    run_self_play_with_callback(config, |res| match res {
        Ok(game) => games.push(game),
        Err(e) => {
            failure.get_or_insert(e);
        }
    })?;
    if let Some(e) = failure {
        return Err(e.into());
    }
    games.sort_by_key(|g| g.game_id);
    Ok(games)
}

/// Runs self-play generation, calling `on_game` as each game completes.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(Result<GameRecord, GameError>) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, on_game)
    } else {
        run_self_play_sequential(config, on_game);
        Ok(())
    }
}

fn log_game(config: &SelfPlayConfig, n: usize, game: &Result<GameRecord, GameError>, start: Instant) {
    let elapsed_ms = start.elapsed().as_millis() as u64;
    match game {
        Ok(g) => {
            let outcome = match g.winner {
                Some(w) => format!("{w} wins"),
                None => "draw".to_string(),
            };
            info!(game = n, of = config.games, %outcome, moves = g.moves.len(), elapsed_ms, "self-play game finished");
        }
        Err(e) => warn!(game = n, error = %e, "self-play game failed"),
    }
}

/// Sequential self-play: plays games one at a time.
fn run_self_play_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(Result<GameRecord, GameError>),
{
    for i in 0..config.games {
        let start = Instant::now();
        let game = play_game(config, i, &mut config.rng_for(i));
        log_game(config, i + 1, &game, start);
        on_game(game);
    }
}

/// Parallel self-play on a dedicated rayon pool. Completed games travel back
/// over a channel so the callback runs on the calling thread.
fn run_self_play_parallel<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<(), SelfPlayError>
where
    F: FnMut(Result<GameRecord, GameError>) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<GameRecord, GameError>>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.games).into_par_iter().for_each_with(tx, |tx, i| {
                    let start = Instant::now();
                    let game = play_game(config, i, &mut config.rng_for(i));
                    let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    log_game(config, n, &game, start);
                    let _ = tx.send(game);
                });
            });
        });

        for game in rx {
            on_game(game);
        }
    });
    Ok(())
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Win counts per seat id across a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfPlaySummary {
    pub games: usize,
    pub wins: Vec<usize>,
    pub draws: usize,
    pub four_in_a_row: usize,
}

pub fn summarize(games: &[GameRecord], players: usize) -> SelfPlaySummary {
    let mut summary = SelfPlaySummary {
        games: games.len(),
        wins: vec![0; players],
        draws: 0,
        four_in_a_row: 0,
    };
    for g in games {
        match g.winner {
            Some(w) if (w.0 as usize) < players => summary.wins[w.0 as usize] += 1,
            Some(_) => {}
            None => summary.draws += 1,
        }
        if g.reason == EndReason::FourInARow {
            summary.four_in_a_row += 1;
        }
    }
    summary
}

/// Draws a seed for a batch when the caller asked for entropy.
pub fn fresh_seed() -> u64 {
    rand::thread_rng().gen_range(1..u64::MAX)
}
