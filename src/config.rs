use serde::{Deserialize, Serialize};

use crate::piece::PieceType;

/// Rule switches for a game. The draw rules are off by default: only
/// checkmate, stalemate and insufficient material end a game on their own.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RulesConfig {
    /// Draw once 100 plies pass without a capture or pawn move.
    pub enforce_fifty_move_rule: bool,
    /// Draw on the third occurrence of the same repetition string.
    pub enforce_threefold_repetition: bool,
    /// Piece a pawn becomes when the caller names none. Anything other than
    /// a queen, rook, bishop or knight falls back to a queen.
    pub default_promotion: PieceType,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesConfig {
    pub fn new() -> Self {
        RulesConfig {
            enforce_fifty_move_rule: false,
            enforce_threefold_repetition: false,
            default_promotion: PieceType::Queen,
        }
    }

    /// Parse a possibly partial JSON object; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn promotion_piece(&self) -> PieceType {
        if self.default_promotion.is_promotion_choice() {
            self.default_promotion
        } else {
            PieceType::Queen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = RulesConfig::from_json(r#"{"enforce_fifty_move_rule": true}"#)
            .expect("valid config");
        assert!(config.enforce_fifty_move_rule);
        assert!(!config.enforce_threefold_repetition);
        assert_eq!(config.default_promotion, PieceType::Queen);
    }

    #[test]
    fn king_is_not_a_promotion_default() {
        let config = RulesConfig {
            default_promotion: PieceType::King,
            ..RulesConfig::new()
        };
        assert_eq!(config.promotion_piece(), PieceType::Queen);
    }
}
