use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::moves::Position;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a pawn step. White moves towards row 0.
    pub fn forward(self) -> i32 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row holding this side's king and rooks in the starting layout.
    pub fn back_row(self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }

    pub fn pawn_row(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn promotion_row(self) -> usize {
        self.opposite().back_row()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("White"),
            Color::Black => f.write_str("Black"),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceType {
    pub const PROMOTION_CHOICES: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    /// Uppercase FEN letter.
    pub fn symbol(self) -> char {
        match self {
            PieceType::Pawn => 'P',
            PieceType::Knight => 'N',
            PieceType::Bishop => 'B',
            PieceType::Rook => 'R',
            PieceType::Queen => 'Q',
            PieceType::King => 'K',
        }
    }

    /// Case-insensitive inverse of [`PieceType::symbol`].
    pub fn from_symbol(c: char) -> Option<PieceType> {
        match c.to_ascii_uppercase() {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn is_promotion_choice(self) -> bool {
        Self::PROMOTION_CHOICES.contains(&self)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::Pawn => "Pawn",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Rook => "Rook",
            PieceType::Queen => "Queen",
            PieceType::King => "King",
        };
        f.write_str(name)
    }
}

const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

const KING_OFFSETS: [(i32, i32); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    (0, -1), (0, 1),
    (1, -1), (1, 0), (1, 1),
];

const ROOK_DIRS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
const BISHOP_DIRS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const QUEEN_DIRS: [(i32, i32); 8] = [
    (0, 1), (0, -1), (1, 0), (-1, 0),
    (1, 1), (1, -1), (-1, 1), (-1, -1),
];

/// One piece on the board. A plain value: copying a piece (as board cloning
/// does) never shares state with the original.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
    pub position: Position,
    /// Sticky once set. Only kings and rooks consult it (castling rights).
    #[serde(default)]
    pub has_moved: bool,
    /// Set on a pawn right after its double step, cleared on the next ply.
    #[serde(default)]
    pub en_passant_eligible: bool,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color, position: Position) -> Self {
        Piece {
            piece_type,
            color,
            position,
            has_moved: false,
            en_passant_eligible: false,
        }
    }

    /// FEN letter: uppercase for White, lowercase for Black.
    pub fn symbol(&self) -> char {
        match self.color {
            Color::White => self.piece_type.symbol(),
            Color::Black => self.piece_type.symbol().to_ascii_lowercase(),
        }
    }

    /// Pseudo-legal destinations, castling included. Does not test whether
    /// the move leaves the mover's own king in check.
    pub fn valid_moves(&self, board: &Board) -> Vec<Position> {
        let mut moves = self.valid_moves_ignoring_check(board);
        if self.piece_type == PieceType::King {
            self.push_castling_moves(board, &mut moves);
        }
        moves
    }

    /// Destinations reachable by the movement pattern alone. Never asks
    /// whether a square is attacked, so attack detection may call it.
    pub fn valid_moves_ignoring_check(&self, board: &Board) -> Vec<Position> {
        let mut moves = Vec::new();
        match self.piece_type {
            PieceType::Pawn => self.push_pawn_moves(board, &mut moves),
            PieceType::Knight => self.push_step_moves(board, &KNIGHT_OFFSETS, &mut moves),
            PieceType::Bishop => self.push_sliding_moves(board, &BISHOP_DIRS, &mut moves),
            PieceType::Rook => self.push_sliding_moves(board, &ROOK_DIRS, &mut moves),
            PieceType::Queen => self.push_sliding_moves(board, &QUEEN_DIRS, &mut moves),
            PieceType::King => self.push_step_moves(board, &KING_OFFSETS, &mut moves),
        }
        moves
    }

    /// Whether this piece attacks `target`. Kings and pawns use their capture
    /// pattern directly; castling and pawn pushes never attack.
    pub fn attacks(&self, board: &Board, target: Position) -> bool {
        let (row, col) = self.position.signed();
        let (tr, tc) = target.signed();
        match self.piece_type {
            PieceType::King => {
                let (dr, dc) = ((tr - row).abs(), (tc - col).abs());
                dr <= 1 && dc <= 1 && (dr, dc) != (0, 0)
            }
            PieceType::Pawn => tr == row + self.color.forward() && (tc - col).abs() == 1,
            _ => self.valid_moves_ignoring_check(board).contains(&target),
        }
    }

    fn push_pawn_moves(&self, board: &Board, moves: &mut Vec<Position>) {
        let (row, col) = self.position.signed();
        let forward = row + self.color.forward();

        // Single push, then double push from the starting row
        if board.is_empty(forward, col) {
            moves.push(Position::new(forward as usize, col as usize));
            let double = forward + self.color.forward();
            if self.position.row == self.color.pawn_row() && board.is_empty(double, col) {
                moves.push(Position::new(double as usize, col as usize));
            }
        }

        for dc in [-1, 1] {
            let target_col = col + dc;
            if board.is_enemy_piece(forward, target_col, self.color) {
                moves.push(Position::new(forward as usize, target_col as usize));
                continue;
            }
            // En passant: the eligible pawn sits beside us, we land behind it
            if board.is_empty(forward, target_col) {
                let beside = Position::from_signed(row, target_col).and_then(|p| board.piece_at(p));
                if let Some(p) = beside {
                    if p.color != self.color
                        && p.piece_type == PieceType::Pawn
                        && p.en_passant_eligible
                    {
                        moves.push(Position::new(forward as usize, target_col as usize));
                    }
                }
            }
        }
    }

    fn push_step_moves(&self, board: &Board, offsets: &[(i32, i32)], moves: &mut Vec<Position>) {
        let (row, col) = self.position.signed();
        for &(dr, dc) in offsets {
            let (r, c) = (row + dr, col + dc);
            if board.is_empty(r, c) || board.is_enemy_piece(r, c, self.color) {
                moves.push(Position::new(r as usize, c as usize));
            }
        }
    }

    fn push_sliding_moves(&self, board: &Board, directions: &[(i32, i32)], moves: &mut Vec<Position>) {
        let (row, col) = self.position.signed();
        for &(dr, dc) in directions {
            let (mut r, mut c) = (row + dr, col + dc);
            while board.is_within_bounds(r, c) {
                if board.is_empty(r, c) {
                    moves.push(Position::new(r as usize, c as usize));
                } else {
                    if board.is_enemy_piece(r, c, self.color) {
                        moves.push(Position::new(r as usize, c as usize));
                    }
                    break;
                }
                r += dr;
                c += dc;
            }
        }
    }

    fn push_castling_moves(&self, board: &Board, moves: &mut Vec<Position>) {
        let back_row = self.color.back_row();
        if self.has_moved || self.position != Position::new(back_row, 4) {
            return;
        }
        let enemy = self.color.opposite();
        if board.is_square_under_attack(self.position, enemy).is_some() {
            return;
        }

        // (rook column, step towards it)
        for (rook_col, step) in [(7usize, 1i32), (0, -1)] {
            let rook_ready = board.squares[back_row][rook_col].map_or(false, |p| {
                p.piece_type == PieceType::Rook && p.color == self.color && !p.has_moved
            });
            if !rook_ready {
                continue;
            }
            let (lo, hi) = (rook_col.min(4) + 1, rook_col.max(4));
            if (lo..hi).any(|c| board.squares[back_row][c].is_some()) {
                continue;
            }
            let pass = Position::new(back_row, (4 + step) as usize);
            let dest = Position::new(back_row, (4 + 2 * step) as usize);
            if board.is_square_under_attack(pass, enemy).is_none()
                && board.is_square_under_attack(dest, enemy).is_none()
            {
                moves.push(dest);
            }
        }
    }
}
