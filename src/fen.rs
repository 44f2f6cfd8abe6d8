//! Position-string import. Export lives on [`Board`] itself.
//!
//! The en passant field may name either the pawn that just made a double
//! step (the form [`Board::generate_fen`] writes) or the standard skipped
//! square. The move counters are optional.

use crate::board::Board;
use crate::error::FenError;
use crate::moves::Position;
use crate::piece::{Color, Piece, PieceType};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedFen {
    pub board: Board,
    pub turn: Color,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

pub fn parse_fen(fen: &str) -> Result<ParsedFen, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(FenError::TooFewFields { found: fields.len() });
    }

    let mut board = parse_placement(fields[0])?;

    let turn = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(FenError::InvalidSideToMove(other.to_string())),
    };

    apply_castling(&mut board, fields[2])?;
    apply_en_passant(&mut board, fields[3], turn.opposite())?;

    let halfmove_clock = parse_counter(fields.get(4).copied(), 0)?;
    let fullmove_number = parse_counter(fields.get(5).copied(), 1)?;

    board.validate_turn(turn)?;

    Ok(ParsedFen {
        board,
        turn,
        halfmove_clock,
        fullmove_number,
    })
}

fn parse_placement(placement: &str) -> Result<Board, FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount { found: ranks.len() });
    }

    let mut board = Board::empty();
    for (row, rank) in ranks.iter().enumerate() {
        let mut col = 0usize;
        for c in rank.chars() {
            if let Some(skip) = c.to_digit(10) {
                col += skip as usize;
                continue;
            }
            let piece_type = PieceType::from_symbol(c).ok_or(FenError::InvalidPiece(c))?;
            if col >= 8 {
                return Err(FenError::RankLength { rank: 8 - row, files: col + 1 });
            }
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let square = Position::new(row, col);
            if piece_type == PieceType::Pawn && (row == 0 || row == 7) {
                return Err(FenError::PawnOnEdgeRank(square));
            }
            let mut piece = Piece::new(piece_type, color, square);
            // Kings and rooks regain their rights only through the castling field
            piece.has_moved = match piece_type {
                PieceType::King | PieceType::Rook => true,
                PieceType::Pawn => row != color.pawn_row(),
                _ => false,
            };
            board.place(piece);
            col += 1;
        }
        if col != 8 {
            return Err(FenError::RankLength { rank: 8 - row, files: col });
        }
    }
    Ok(board)
}

fn apply_castling(board: &mut Board, field: &str) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }
    for c in field.chars() {
        let (color, rook_col) = match c {
            'K' => (Color::White, 7),
            'Q' => (Color::White, 0),
            'k' => (Color::Black, 7),
            'q' => (Color::Black, 0),
            _ => return Err(FenError::InvalidCastling(c)),
        };
        let row = color.back_row();
        let in_place = |col: usize, piece_type: PieceType| {
            board.squares[row][col].map_or(false, |p| p.piece_type == piece_type && p.color == color)
        };
        if !in_place(4, PieceType::King) || !in_place(rook_col, PieceType::Rook) {
            return Err(FenError::InvalidCastling(c));
        }
        for col in [4, rook_col] {
            if let Some(p) = board.squares[row][col].as_mut() {
                p.has_moved = false;
            }
        }
    }
    Ok(())
}

/// `mover` is the side that made the double step, i.e. not the side to move.
fn apply_en_passant(board: &mut Board, field: &str, mover: Color) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }
    let pawn = Position::from_algebraic(field)
        .and_then(|named| find_double_stepped_pawn(board, named, mover))
        .ok_or_else(|| FenError::InvalidEnPassant(field.to_string()))?;
    if let Some(p) = board.squares[pawn.row][pawn.col].as_mut() {
        p.en_passant_eligible = true;
        p.has_moved = true;
    }
    Ok(())
}

/// Accepts the pawn's own square or the empty square it skipped.
fn find_double_stepped_pawn(board: &Board, named: Position, mover: Color) -> Option<Position> {
    let is_mover_pawn = |pos: Position| {
        board
            .piece_at(pos)
            .map_or(false, |p| p.piece_type == PieceType::Pawn && p.color == mover)
    };
    let pawn = if is_mover_pawn(named) {
        named
    } else if board.piece_at(named).is_none() {
        named.offset(mover.forward(), 0).filter(|&pos| is_mover_pawn(pos))?
    } else {
        return None;
    };
    // The pawn must stand where a double step from its start row lands
    let landing_row = mover.pawn_row() as i32 + 2 * mover.forward();
    (pawn.row as i32 == landing_row).then_some(pawn)
}

fn parse_counter(field: Option<&str>, default: u32) -> Result<u32, FenError> {
    match field {
        None => Ok(default),
        Some(s) => s.parse().map_err(|_| FenError::InvalidCounter(s.to_string())),
    }
}
