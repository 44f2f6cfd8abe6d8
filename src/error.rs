//! Error types for move application, board validation, FEN import and
//! session snapshots.

use crate::moves::Position;
use crate::piece::{Color, PieceType};

/// Why a move was refused. The game is untouched whenever one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("the game is already over")]
    GameOver,

    #[error("square ({row}, {col}) is off the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("no piece on {0}")]
    NoPiece(Position),

    #[error("it is not {0}'s turn")]
    WrongTurn(Color),

    #[error("illegal move {from} -> {to}")]
    Illegal { from: Position, to: Position },

    #[error("cannot promote to {0} here")]
    InvalidPromotion(PieceType),

    #[error("cannot parse move '{0}'")]
    Unparseable(String),
}

/// A board that breaks the one-king-per-side or position bookkeeping rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("expected exactly one {color} king, found {count}")]
    KingCount { color: Color, count: usize },

    #[error("piece on {cell} records its position as {recorded}")]
    PositionMismatch { cell: Position, recorded: Position },

    #[error("{0} is in check but it is not {0}'s turn")]
    OpponentInCheck(Color),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FenError {
    #[error("FEN must have at least 4 fields, found {found}")]
    TooFewFields { found: usize },

    #[error("FEN placement must have 8 ranks, found {found}")]
    RankCount { found: usize },

    #[error("rank {rank} describes {files} files instead of 8")]
    RankLength { rank: usize, files: usize },

    #[error("invalid piece character '{0}'")]
    InvalidPiece(char),

    #[error("pawn on {0} cannot stand on the first or last rank")]
    PawnOnEdgeRank(Position),

    #[error("invalid side to move '{0}', expected 'w' or 'b'")]
    InvalidSideToMove(String),

    #[error("invalid castling character '{0}'")]
    InvalidCastling(char),

    #[error("invalid en passant square '{0}'")]
    InvalidEnPassant(String),

    #[error("invalid move counter '{0}'")]
    InvalidCounter(String),

    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("inconsistent snapshot: {0}")]
    Board(#[from] BoardError),
}
