//! Endgame scoring when nobody completes four in a row.
//!
//! Players are ranked by their best contiguous segment sum, then by the total
//! value of everything they own. What happens when both numbers tie is a
//! product decision, so it is a [`TiePolicy`] instead of a hard rule.

use serde::{Deserialize, Serialize};

use crate::board::{Board, Player, PlayerId, LINE_DIRECTIONS};

/// Best segment sum for `player`.
///
/// Walks every forward run of `player`'s cells starting at each owned cell in
/// each of the four axes. Runs of length two or more count; without any, the
/// player's single highest card is used. Owning nothing scores zero.
pub fn tie_breaker_line_sum(board: &Board, player: PlayerId) -> i32 {
    let mut best: Option<i32> = None;
    let mut solo = 0i32;

    for (start, value) in board.owned_by(player) {
        solo = solo.max(value as i32);
        for &(dx, dy) in LINE_DIRECTIONS.iter() {
            let mut sum = value as i32;
            let mut len = 1;
            let mut cur = board.step(start, dx, dy);
            while let Some(p) = cur {
                let cell = board.cell(p);
                if !cell.is_owned_by(player) {
                    break;
                }
                sum += cell.value() as i32;
                len += 1;
                cur = board.step(p, dx, dy);
            }
            if len >= 2 {
                best = Some(best.map_or(sum, |b| b.max(sum)));
            }
        }
    }

    best.unwrap_or(solo)
}

/// Sum of all card values owned by `player`.
pub fn total_owned_sum(board: &Board, player: PlayerId) -> i32 {
    board.owned_by(player).map(|(_, v)| v as i32).sum()
}

/// One line of the endgame ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankRow {
    pub player: PlayerId,
    /// Position in the turn order.
    pub seat: usize,
    pub line_sum: i32,
    pub total_sum: i32,
}

impl RankRow {
    fn key(&self) -> (i32, i32) {
        (self.line_sum, self.total_sum)
    }
}

/// Ranks `players` (given in turn order) best first. Equal rows keep turn order.
pub fn rank(board: &Board, players: &[Player]) -> Vec<RankRow> {
    let mut rows: Vec<RankRow> = players
        .iter()
        .enumerate()
        .map(|(seat, p)| RankRow {
            player: p.id,
            seat,
            line_sum: tie_breaker_line_sum(board, p.id),
            total_sum: total_owned_sum(board, p.id),
        })
        .collect();
    rows.sort_by(|a, b| b.key().cmp(&a.key()));
    rows
}

/// Resolution of a tie on both line sum and total sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// Nobody wins.
    #[default]
    Draw,
    /// The tied player latest in turn order wins.
    EarlierSeatLoses,
    /// The tied player earliest in turn order wins.
    EarlierSeatWins,
}

/// Picks the winner from a ranking, or None for a draw.
pub fn resolve_winner(ranking: &[RankRow], policy: TiePolicy) -> Option<PlayerId> {
    let top = ranking.first()?;
    let tied: Vec<&RankRow> = ranking.iter().filter(|r| r.key() == top.key()).collect();
    if tied.len() == 1 {
        return Some(top.player);
    }
    match policy {
        TiePolicy::Draw => None,
        TiePolicy::EarlierSeatLoses => tied.iter().max_by_key(|r| r.seat).map(|r| r.player),
        TiePolicy::EarlierSeatWins => tied.iter().min_by_key(|r| r.seat).map(|r| r.player),
    }
}
