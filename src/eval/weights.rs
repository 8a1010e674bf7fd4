//! Heuristic weight table.
//!
//! Weights are plain configuration values handed to the evaluator on every
//! call. A room may override any subset of them with a JSON object; the
//! override is merged onto the defaults and validated before use.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::board::{CARD_MAX, CARD_MIN};
use crate::error::GameError;

/// Named, non-negative coefficients of the move-scoring function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicWeights {
    /// Base value of any legal move.
    pub legal_move: i32,
    /// Completing four in a row.
    pub w_win: i32,
    /// Occupying the open slot of an opponent's three.
    pub w_threat: i32,
    /// Overwriting a card that belongs to an opponent run of three or more.
    pub replace_when_threat: i32,
    /// Overwriting any other opponent card.
    pub replace_potential: i32,
    /// Overwritten cell has opponent cells on both sides of the run.
    pub replace_pos_center: i32,
    /// Overwritten cell has opponent cells on one side only.
    pub replace_pos_side: i32,
    /// Empty cell cuts an opponent run of three or more.
    pub block_when_threat: i32,
    /// Empty cell cuts an opponent run of two.
    pub block_potential: i32,
    pub build_alignment_2: i32,
    pub build_alignment_3: i32,
    /// Per-card value when answering a threat, indexed by card - 1.
    pub card_values_threat: [i32; 9],
    /// Per-card value otherwise, indexed by card - 1.
    pub card_values_potential: [i32; 9],
    pub play_smallest_card: i32,
    /// Landing next to one of our own cards.
    pub keep_near_card: i32,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        HeuristicWeights {
            legal_move: 30,
            w_win: 10_000,
            w_threat: 200,
            replace_when_threat: 200,
            replace_potential: 125,
            replace_pos_center: 75,
            replace_pos_side: 50,
            block_when_threat: 100,
            block_potential: 70,
            build_alignment_2: 50,
            build_alignment_3: 100,
            card_values_threat: [20, 30, 40, 50, 60, 70, 80, 90, 100],
            card_values_potential: [100, 90, 80, 70, 60, 50, 40, 30, 20],
            play_smallest_card: 60,
            keep_near_card: 60,
        }
    }
}

impl HeuristicWeights {
    /// Looks up a card in one of the per-card tables.
    #[inline]
    pub fn card_value(table: &[i32; 9], card: u8) -> i32 {
        let idx = card.clamp(CARD_MIN, CARD_MAX) - CARD_MIN;
        table[idx as usize]
    }

    /// Rejects negative coefficients.
    pub fn validate(&self) -> Result<(), GameError> {
        let scalars = [
            ("legal_move", self.legal_move),
            ("w_win", self.w_win),
            ("w_threat", self.w_threat),
            ("replace_when_threat", self.replace_when_threat),
            ("replace_potential", self.replace_potential),
            ("replace_pos_center", self.replace_pos_center),
            ("replace_pos_side", self.replace_pos_side),
            ("block_when_threat", self.block_when_threat),
            ("block_potential", self.block_potential),
            ("build_alignment_2", self.build_alignment_2),
            ("build_alignment_3", self.build_alignment_3),
            ("play_smallest_card", self.play_smallest_card),
            ("keep_near_card", self.keep_near_card),
        ];
        if let Some((name, v)) = scalars.iter().find(|(_, v)| *v < 0) {
            return Err(GameError::InvalidWeights(format!("{name} is negative ({v})")));
        }
        for (name, table) in [
            ("card_values_threat", &self.card_values_threat),
            ("card_values_potential", &self.card_values_potential),
        ] {
            if let Some(i) = table.iter().position(|&v| v < 0) {
                return Err(GameError::InvalidWeights(format!(
                    "{name} entry for card {} is negative",
                    i + 1
                )));
            }
        }
        Ok(())
    }

    /// Returns a copy with the given keys replaced.
    ///
    /// Unknown keys, mistyped values and negative results are rejected and
    /// leave `self` untouched.
    pub fn with_overrides(&self, overrides: &Map<String, Value>) -> Result<Self, GameError> {
        let mut merged = serde_json::to_value(self)
            .map_err(|e| GameError::InvalidWeights(e.to_string()))?;
        let fields = merged
            .as_object_mut()
            .ok_or_else(|| GameError::InvalidWeights("weights are not an object".into()))?;
        for (key, value) in overrides {
            if !fields.contains_key(key) {
                return Err(GameError::InvalidWeights(format!("unknown weight '{key}'")));
            }
            fields.insert(key.clone(), value.clone());
        }
        let weights: HeuristicWeights = serde_json::from_value(merged)
            .map_err(|e| GameError::InvalidWeights(e.to_string()))?;
        weights.validate()?;
        Ok(weights)
    }

    /// Parses a JSON object of overrides and merges it.
    pub fn with_overrides_json(&self, json: &str) -> Result<Self, GameError> {
        let map: Map<String, Value> =
            serde_json::from_str(json).map_err(|e| GameError::InvalidWeights(e.to_string()))?;
        self.with_overrides(&map)
    }

    /// True if any weight differs from the defaults.
    pub fn is_customized(&self) -> bool {
        *self != HeuristicWeights::default()
    }
}
