use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::moves::Position;
use crate::piece::{Color, Piece, PieceType};

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// What a move did to the board, for callers that report it.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveEffects {
    pub piece_type: PieceType,
    pub captured: Option<Piece>,
    pub en_passant: bool,
    pub castled: bool,
    pub promotion: Option<PieceType>,
}

/// 8×8 grid of optional pieces. `Clone` is a deep copy: pieces are values, so
/// a cloned board never shares state with its source.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Board {
    pub squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// Standard starting layout, Black on rows 0-1 and White on rows 6-7.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for (col, &piece_type) in BACK_RANK.iter().enumerate() {
            board.place(Piece::new(piece_type, Color::Black, Position::new(0, col)));
            board.place(Piece::new(PieceType::Pawn, Color::Black, Position::new(1, col)));
            board.place(Piece::new(PieceType::Pawn, Color::White, Position::new(6, col)));
            board.place(Piece::new(piece_type, Color::White, Position::new(7, col)));
        }
        board
    }

    /// Put a piece on the cell named by its own position, replacing any occupant.
    pub fn place(&mut self, piece: Piece) {
        self.squares[piece.position.row][piece.position.col] = Some(piece);
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        if !pos.is_on_board() {
            return None;
        }
        self.squares[pos.row][pos.col].as_ref()
    }

    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        if !pos.is_on_board() {
            return None;
        }
        self.squares[pos.row][pos.col].take()
    }

    pub fn pieces(&self, color: Color) -> impl Iterator<Item = &Piece> + '_ {
        self.squares
            .iter()
            .flatten()
            .flatten()
            .filter(move |p| p.color == color)
    }

    pub fn piece_count(&self) -> usize {
        self.squares.iter().flatten().flatten().count()
    }

    pub fn is_within_bounds(&self, row: i32, col: i32) -> bool {
        (0..8).contains(&row) && (0..8).contains(&col)
    }

    pub fn is_empty(&self, row: i32, col: i32) -> bool {
        self.is_within_bounds(row, col) && self.squares[row as usize][col as usize].is_none()
    }

    pub fn is_enemy_piece(&self, row: i32, col: i32, color: Color) -> bool {
        self.is_within_bounds(row, col)
            && self.squares[row as usize][col as usize].map_or(false, |p| p.color != color)
    }

    pub fn find_king(&self, color: Color) -> Option<Position> {
        self.pieces(color)
            .find(|p| p.piece_type == PieceType::King)
            .map(|p| p.position)
    }

    /// First piece of `by` that attacks `target`, if any.
    pub fn is_square_under_attack(&self, target: Position, by: Color) -> Option<&Piece> {
        self.pieces(by).find(|piece| piece.attacks(self, target))
    }

    /// Panics when `color` has no king: every board reachable through the
    /// public API has been validated to hold one.
    pub fn is_king_in_check(&self, color: Color) -> bool {
        let king = self
            .find_king(color)
            .unwrap_or_else(|| panic!("no {color} king on the board"));
        match self.is_square_under_attack(king, color.opposite()) {
            Some(attacker) => {
                log::trace!(
                    "{color} king on {king} is in check by {} {} on {}",
                    attacker.color,
                    attacker.piece_type,
                    attacker.position
                );
                true
            }
            None => false,
        }
    }

    /// Move a piece without any legality test. Handles captures, en passant,
    /// the castling rook, promotion and the per-ply flag bookkeeping.
    /// Returns `None` when `from` is empty.
    pub fn apply_move(
        &mut self,
        from: Position,
        to: Position,
        promotion: PieceType,
    ) -> Option<MoveEffects> {
        let mut piece = self.remove(from)?;
        let piece_type = piece.piece_type;
        let mut captured = self.remove(to);

        let mut en_passant = false;
        if piece_type == PieceType::Pawn && captured.is_none() && from.col != to.col {
            let behind = Position::new(from.row, to.col);
            let eligible = self.piece_at(behind).map_or(false, |p| {
                p.piece_type == PieceType::Pawn && p.color != piece.color && p.en_passant_eligible
            });
            if eligible {
                captured = self.remove(behind);
                en_passant = true;
            }
        }

        // Eligibility lasts exactly one opponent ply
        for p in self.squares.iter_mut().flatten().flatten() {
            p.en_passant_eligible = false;
        }

        piece.position = to;
        piece.has_moved = true;
        piece.en_passant_eligible = piece_type == PieceType::Pawn && from.row.abs_diff(to.row) == 2;

        let promoted = piece_type == PieceType::Pawn && to.row == piece.color.promotion_row();
        if promoted {
            piece.piece_type = promotion;
        }
        self.place(piece);

        let castled = piece_type == PieceType::King && from.col.abs_diff(to.col) == 2;
        if castled {
            let (rook_from, rook_to) = if to.col > from.col { (7, 5) } else { (0, 3) };
            if let Some(mut rook) = self.remove(Position::new(from.row, rook_from)) {
                rook.position = Position::new(from.row, rook_to);
                rook.has_moved = true;
                self.place(rook);
            }
        }

        Some(MoveEffects {
            piece_type,
            captured,
            en_passant,
            castled,
            promotion: promoted.then_some(promotion),
        })
    }

    /// Simulate the move on a clone and report whether the mover's king ends
    /// up attacked.
    pub fn leaves_king_in_check(&self, from: Position, to: Position) -> bool {
        let color = match self.piece_at(from) {
            Some(p) => p.color,
            None => return false,
        };
        let mut clone = self.clone();
        clone.apply_move(from, to, PieceType::Queen);
        clone.is_king_in_check(color)
    }

    /// Pseudo-legal moves of the piece on `from` that keep its king safe.
    pub fn legal_moves_from(&self, from: Position) -> Vec<Position> {
        let piece = match self.piece_at(from) {
            Some(p) => *p,
            None => return Vec::new(),
        };
        piece
            .valid_moves(self)
            .into_iter()
            .filter(|&to| !self.leaves_king_in_check(from, to))
            .collect()
    }

    pub fn are_any_moves_available(&self, color: Color) -> bool {
        self.pieces(color).any(|piece| {
            piece
                .valid_moves(self)
                .into_iter()
                .any(|to| !self.leaves_king_in_check(piece.position, to))
        })
    }

    pub fn is_stalemate(&self, color: Color) -> bool {
        !self.is_king_in_check(color) && !self.are_any_moves_available(color)
    }

    pub fn is_checkmate(&self, color: Color) -> bool {
        self.is_king_in_check(color) && !self.are_any_moves_available(color)
    }

    /// K vs K, K + minor vs K, and K + B vs K + B with same-colored bishops.
    pub fn is_insufficient_material(&self) -> bool {
        let white = self.non_king_pieces(Color::White);
        let black = self.non_king_pieces(Color::Black);
        match (white.as_slice(), black.as_slice()) {
            ([], []) => true,
            ([minor], []) | ([], [minor]) => {
                matches!(minor.piece_type, PieceType::Bishop | PieceType::Knight)
            }
            ([w], [b]) => {
                w.piece_type == PieceType::Bishop
                    && b.piece_type == PieceType::Bishop
                    && w.position.is_light() == b.position.is_light()
            }
            _ => false,
        }
    }

    fn non_king_pieces(&self, color: Color) -> Vec<&Piece> {
        self.pieces(color)
            .filter(|p| p.piece_type != PieceType::King)
            .collect()
    }

    /// Exactly one king per side, and every piece's stored position matches its cell.
    pub fn validate(&self) -> Result<(), BoardError> {
        for color in [Color::White, Color::Black] {
            let count = self
                .pieces(color)
                .filter(|p| p.piece_type == PieceType::King)
                .count();
            if count != 1 {
                return Err(BoardError::KingCount { color, count });
            }
        }
        for (row, cells) in self.squares.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Some(p) = cell {
                    let cell = Position::new(row, col);
                    if p.position != cell {
                        return Err(BoardError::PositionMismatch {
                            cell,
                            recorded: p.position,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// [`Board::validate`] plus the rule that the side that just moved cannot
    /// be in check, otherwise its king would be capturable.
    pub fn validate_turn(&self, turn: Color) -> Result<(), BoardError> {
        self.validate()?;
        let waiting = turn.opposite();
        if self.is_king_in_check(waiting) {
            return Err(BoardError::OpponentInCheck(waiting));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Position strings
    // -------------------------------------------------------------------------

    fn placement(&self) -> String {
        let ranks: Vec<String> = self
            .squares
            .iter()
            .map(|cells| {
                let mut rank = String::new();
                let mut empty = 0;
                for cell in cells {
                    match cell {
                        Some(p) => {
                            if empty > 0 {
                                rank.push_str(&empty.to_string());
                                empty = 0;
                            }
                            rank.push(p.symbol());
                        }
                        None => empty += 1,
                    }
                }
                if empty > 0 {
                    rank.push_str(&empty.to_string());
                }
                rank
            })
            .collect();
        ranks.join("/")
    }

    /// Unmoved king on its start square plus an unmoved rook in `rook_col`.
    fn can_castle(&self, color: Color, rook_col: usize) -> bool {
        let row = color.back_row();
        let unmoved = |col: usize, piece_type: PieceType| {
            self.squares[row][col].map_or(false, |p| {
                p.piece_type == piece_type && p.color == color && !p.has_moved
            })
        };
        unmoved(4, PieceType::King) && unmoved(rook_col, PieceType::Rook)
    }

    pub fn castling_token(&self) -> String {
        let mut token = String::new();
        for (color, rook_col, symbol) in [
            (Color::White, 7, 'K'),
            (Color::White, 0, 'Q'),
            (Color::Black, 7, 'k'),
            (Color::Black, 0, 'q'),
        ] {
            if self.can_castle(color, rook_col) {
                token.push(symbol);
            }
        }
        if token.is_empty() {
            token.push('-');
        }
        token
    }

    /// Square of the pawn that may be captured en passant this ply.
    pub fn en_passant_square(&self) -> Option<Position> {
        self.squares
            .iter()
            .flatten()
            .flatten()
            .find(|p| p.piece_type == PieceType::Pawn && p.en_passant_eligible)
            .map(|p| p.position)
    }

    /// Placement, side to move, castling and en passant fields only, so that
    /// positions differing only in their move counters compare equal.
    pub fn generate_repetition_fen(&self, turn: Color) -> String {
        let side = match turn {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let en_passant = self
            .en_passant_square()
            .map(|p| p.to_algebraic())
            .unwrap_or_else(|| "-".to_string());
        format!("{} {side} {} {en_passant}", self.placement(), self.castling_token())
    }

    pub fn generate_fen(&self, turn: Color, halfmove_clock: u32, fullmove_number: u32) -> String {
        format!(
            "{} {halfmove_clock} {fullmove_number}",
            self.generate_repetition_fen(turn)
        )
    }
}
