use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::PieceType;

/// A square on the board. Row 0 is rank 8 (Black's back rank), row 7 is
/// rank 1; column 0 is the a-file.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Build a position from signed coordinates, `None` when off the board.
    pub fn from_signed(row: i32, col: i32) -> Option<Position> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Position::new(row as usize, col as usize))
        } else {
            None
        }
    }

    pub fn signed(self) -> (i32, i32) {
        (self.row as i32, self.col as i32)
    }

    pub fn offset(self, dr: i32, dc: i32) -> Option<Position> {
        let (row, col) = self.signed();
        Position::from_signed(row + dr, col + dc)
    }

    pub fn is_on_board(self) -> bool {
        self.row < 8 && self.col < 8
    }

    /// a8 and h1 are light, so light squares have an even row + col.
    pub fn is_light(self) -> bool {
        (self.row + self.col) % 2 == 0
    }

    /// Algebraic name, e.g. (6, 4) -> "e2". Only meaningful on the board.
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.col as u8) as char;
        let rank = (b'8' - self.row as u8) as char;
        format!("{file}{rank}")
    }

    pub fn from_algebraic(s: &str) -> Option<Position> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let (file, rank) = (bytes[0], bytes[1]);
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return None;
        }
        Some(Position::new((b'8' - rank) as usize, (file - b'a') as usize))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_on_board() {
            write!(f, "{}", self.to_algebraic())
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Position, to: Position) -> Self {
        Move { from, to, promotion: None }
    }

    /// Convert to UCI notation, e.g. "e2e4", "a7a8q"
    pub fn to_uci(&self) -> String {
        let promo = self
            .promotion
            .map(|pt| pt.symbol().to_ascii_lowercase().to_string())
            .unwrap_or_default();
        format!("{}{}{promo}", self.from, self.to)
    }

    /// Parse from UCI notation
    pub fn from_uci(s: &str) -> Option<Move> {
        if s.len() != 4 && s.len() != 5 {
            return None;
        }
        let from = Position::from_algebraic(s.get(0..2)?)?;
        let to = Position::from_algebraic(s.get(2..4)?)?;
        let promotion = match s.get(4..)? {
            "" => None,
            p => {
                let pt = PieceType::from_symbol(p.chars().next()?)?;
                if !pt.is_promotion_choice() {
                    return None;
                }
                Some(pt)
            }
        };
        Some(Move { from, to, promotion })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}
