// =============================================================================
// Game
//
// One Game per session. It owns the board, whose turn it is and the move
// counters, validates every move fully before touching the board, and
// re-evaluates termination after each ply. Resignation and draw agreement are
// direct transitions that skip board validation.
//
// State round-trips through serde (`to_snapshot` / `from_snapshot`) so the
// session store can persist it as an opaque JSON string.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::board::{Board, MoveEffects};
use crate::config::RulesConfig;
use crate::error::{BoardError, FenError, MoveError, SnapshotError};
use crate::fen::parse_fen;
use crate::moves::{Move, Position};
use crate::piece::{Color, PieceType};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
    Resignation,
    Agreement,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct GameOutcome {
    /// `None` for a draw.
    pub winner: Option<Color>,
    pub reason: Termination,
}

impl GameOutcome {
    pub fn win(winner: Color, reason: Termination) -> Self {
        GameOutcome { winner: Some(winner), reason }
    }

    pub fn draw(reason: Termination) -> Self {
        GameOutcome { winner: None, reason }
    }

    /// Human-readable result, e.g. "White wins by checkmate".
    pub fn description(&self) -> String {
        let reason = match self.reason {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::InsufficientMaterial => "insufficient material",
            Termination::FiftyMoveRule => "fifty-move rule",
            Termination::ThreefoldRepetition => "threefold repetition",
            Termination::Resignation => "resignation",
            Termination::Agreement => "agreement",
        };
        match self.winner {
            Some(color) => format!("{color} wins by {reason}"),
            None => format!("Draw by {reason}"),
        }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Over(GameOutcome),
}

/// Snapshot of what a front end shows after each request.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct StatusReport {
    pub turn: Color,
    pub white_in_check: bool,
    pub black_in_check: bool,
    pub game_over: bool,
    pub result: Option<String>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub fen: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub mv: Move,
    pub effects: MoveEffects,
    /// The side now to move is in check.
    pub gives_check: bool,
    pub status: StatusReport,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Game {
    board: Board,
    turn: Color,
    halfmove_clock: u32,
    fullmove_number: u32,
    status: GameStatus,
    #[serde(default)]
    position_history: Vec<String>,
    #[serde(default)]
    config: RulesConfig,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::new_with_config(RulesConfig::default())
    }

    pub fn new_with_config(config: RulesConfig) -> Self {
        let board = Board::new();
        let position_history = vec![board.generate_repetition_fen(Color::White)];
        Game {
            board,
            turn: Color::White,
            halfmove_clock: 0,
            fullmove_number: 1,
            status: GameStatus::InProgress,
            position_history,
            config,
        }
    }

    /// Start from an arbitrary validated position with fresh counters.
    pub fn from_board(board: Board, turn: Color, config: RulesConfig) -> Result<Self, BoardError> {
        board.validate_turn(turn)?;
        Ok(Self::set_up(board, turn, 0, 1, config))
    }

    pub fn from_fen(fen: &str, config: RulesConfig) -> Result<Self, FenError> {
        let parsed = parse_fen(fen).map_err(|err| {
            log::warn!("rejected FEN '{fen}': {err}");
            err
        })?;
        Ok(Self::set_up(
            parsed.board,
            parsed.turn,
            parsed.halfmove_clock,
            parsed.fullmove_number,
            config,
        ))
    }

    fn set_up(
        board: Board,
        turn: Color,
        halfmove_clock: u32,
        fullmove_number: u32,
        config: RulesConfig,
    ) -> Self {
        let position_history = vec![board.generate_repetition_fen(turn)];
        let mut game = Game {
            board,
            turn,
            halfmove_clock,
            fullmove_number,
            status: GameStatus::InProgress,
            position_history,
            config,
        };
        if let Some(outcome) = game.evaluate_termination() {
            game.finish(outcome);
        }
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.status, GameStatus::Over(_))
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.status {
            GameStatus::Over(outcome) => Some(outcome),
            GameStatus::InProgress => None,
        }
    }

    pub fn result(&self) -> Option<String> {
        self.outcome().map(|o| o.description())
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.board.is_king_in_check(color)
    }

    pub fn fen(&self) -> String {
        self.board
            .generate_fen(self.turn, self.halfmove_clock, self.fullmove_number)
    }

    pub fn repetition_fen(&self) -> String {
        self.board.generate_repetition_fen(self.turn)
    }

    pub fn position_history(&self) -> &[String] {
        &self.position_history
    }

    /// How often the current position has occurred, this occurrence included.
    pub fn repetition_count(&self) -> usize {
        let current = self.repetition_fen();
        self.position_history.iter().filter(|&p| *p == current).count()
    }

    pub fn status_report(&self) -> StatusReport {
        StatusReport {
            turn: self.turn,
            white_in_check: self.board.is_king_in_check(Color::White),
            black_in_check: self.board.is_king_in_check(Color::Black),
            game_over: self.is_game_over(),
            result: self.result(),
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            fen: self.fen(),
        }
    }

    /// Legal destinations for the piece on `pos`. Empty for off-board or
    /// empty squares, pieces of the side not to move, and finished games.
    pub fn valid_moves(&self, pos: Position) -> Vec<Position> {
        if self.is_game_over() {
            return Vec::new();
        }
        match self.board.piece_at(pos) {
            Some(p) if p.color == self.turn => self.board.legal_moves_from(pos),
            _ => Vec::new(),
        }
    }

    /// Every legal move for the side to move. Promotions carry no piece
    /// choice and fall back to the configured default.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.board
            .pieces(self.turn)
            .flat_map(|p| {
                let from = p.position;
                self.board
                    .legal_moves_from(from)
                    .into_iter()
                    .map(move |to| Move::new(from, to))
            })
            .collect()
    }

    /// Validate and play a move. On error nothing has changed.
    pub fn make_move(
        &mut self,
        from: Position,
        to: Position,
        promotion: Option<PieceType>,
    ) -> Result<MoveReport, MoveError> {
        let promote_to = self.check_move(from, to, promotion).map_err(|err| {
            log::debug!("rejected move {from} -> {to}: {err}");
            err
        })?;

        let mover = self.turn;
        let effects = self
            .board
            .apply_move(from, to, promote_to)
            .ok_or(MoveError::NoPiece(from))?;

        if effects.piece_type == PieceType::Pawn || effects.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if mover == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.turn = mover.opposite();
        self.position_history.push(self.repetition_fen());

        let mv = Move {
            from,
            to,
            promotion: effects.promotion,
        };
        log::debug!("{mover} played {mv}");

        if let Some(outcome) = self.evaluate_termination() {
            self.finish(outcome);
        }

        Ok(MoveReport {
            mv,
            effects,
            gives_check: self.board.is_king_in_check(self.turn),
            status: self.status_report(),
        })
    }

    pub fn apply(&mut self, mv: Move) -> Result<MoveReport, MoveError> {
        self.make_move(mv.from, mv.to, mv.promotion)
    }

    pub fn make_uci_move(&mut self, uci: &str) -> Result<MoveReport, MoveError> {
        let mv = Move::from_uci(uci).ok_or_else(|| MoveError::Unparseable(uci.to_string()))?;
        self.apply(mv)
    }

    /// The side to move resigns.
    pub fn resign(&mut self) -> Result<GameOutcome, MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        let outcome = GameOutcome::win(self.turn.opposite(), Termination::Resignation);
        self.finish(outcome);
        Ok(outcome)
    }

    pub fn agree_draw(&mut self) -> Result<GameOutcome, MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        let outcome = GameOutcome::draw(Termination::Agreement);
        self.finish(outcome);
        Ok(outcome)
    }

    pub fn to_snapshot(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild a game from [`Game::to_snapshot`] output, rejecting boards
    /// without exactly one king per side or with the waiting side in check.
    pub fn from_snapshot(json: &str) -> Result<Self, SnapshotError> {
        let mut game: Game = serde_json::from_str(json)?;
        if let Err(err) = game.board.validate_turn(game.turn) {
            log::warn!("rejected snapshot: {err}");
            return Err(err.into());
        }
        if game.position_history.is_empty() {
            game.position_history.push(game.repetition_fen());
        }
        Ok(game)
    }

    /// Everything that can be refused, checked before any mutation.
    /// Returns the piece a promoting pawn turns into.
    fn check_move(
        &self,
        from: Position,
        to: Position,
        promotion: Option<PieceType>,
    ) -> Result<PieceType, MoveError> {
        if self.is_game_over() {
            return Err(MoveError::GameOver);
        }
        for pos in [from, to] {
            if !pos.is_on_board() {
                return Err(MoveError::OutOfBounds { row: pos.row, col: pos.col });
            }
        }
        let piece = *self.board.piece_at(from).ok_or(MoveError::NoPiece(from))?;
        if piece.color != self.turn {
            return Err(MoveError::WrongTurn(piece.color));
        }
        if !self.board.legal_moves_from(from).contains(&to) {
            return Err(MoveError::Illegal { from, to });
        }

        let promotes = piece.piece_type == PieceType::Pawn && to.row == piece.color.promotion_row();
        match promotion {
            Some(pt) if !promotes || !pt.is_promotion_choice() => Err(MoveError::InvalidPromotion(pt)),
            Some(pt) => Ok(pt),
            None => Ok(self.config.promotion_piece()),
        }
    }

    /// Termination for the side to move, in priority order: checkmate,
    /// stalemate, insufficient material, then the optional draw rules.
    fn evaluate_termination(&self) -> Option<GameOutcome> {
        let side = self.turn;
        if !self.board.are_any_moves_available(side) {
            return Some(if self.board.is_king_in_check(side) {
                GameOutcome::win(side.opposite(), Termination::Checkmate)
            } else {
                GameOutcome::draw(Termination::Stalemate)
            });
        }
        if self.board.is_insufficient_material() {
            return Some(GameOutcome::draw(Termination::InsufficientMaterial));
        }
        if self.config.enforce_fifty_move_rule && self.halfmove_clock >= 100 {
            return Some(GameOutcome::draw(Termination::FiftyMoveRule));
        }
        if self.config.enforce_threefold_repetition && self.repetition_count() >= 3 {
            return Some(GameOutcome::draw(Termination::ThreefoldRepetition));
        }
        None
    }

    fn finish(&mut self, outcome: GameOutcome) {
        log::info!("game over: {}", outcome.description());
        self.status = GameStatus::Over(outcome);
    }
}
