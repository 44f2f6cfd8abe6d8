use crate::config::RulesConfig;
use crate::game::{Game, StatusReport};
use crate::moves::Position;
use crate::piece::PieceType;
use crate::strategy::{strategy_by_name, MoveStrategy, RandomMover};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: String,
}

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<Option<SquarePiece>>>,
    #[serde(flatten)]
    status: StatusReport,
}

#[derive(Serialize)]
struct MoveFlags {
    capture: bool,
    castle: bool,
    en_passant: bool,
    promotion: Option<String>,
    check: bool,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    flags: Option<MoveFlags>,
    error: Option<String>,
}

fn string_to_piece_type(s: &str) -> Option<PieceType> {
    match s {
        "Queen" => Some(PieceType::Queen),
        "Rook" => Some(PieceType::Rook),
        "Bishop" => Some(PieceType::Bishop),
        "Knight" => Some(PieceType::Knight),
        _ => None,
    }
}

fn build_board_state(game: &Game) -> BoardState {
    let squares: Vec<Vec<Option<SquarePiece>>> = game
        .board()
        .squares
        .iter()
        .map(|cells| {
            cells
                .iter()
                .map(|cell| {
                    cell.map(|p| SquarePiece {
                        piece_type: p.piece_type.to_string(),
                        color: p.color.to_string(),
                    })
                })
                .collect()
        })
        .collect();

    BoardState {
        squares,
        status: game.status_report(),
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn error_result(message: String) -> JsValue {
    to_js(&MoveResult {
        board_state: None,
        flags: None,
        error: Some(message),
    })
}

/// One browser session. The JS side owns persistence through
/// `export_snapshot` / `import_snapshot`.
#[wasm_bindgen(js_name = Game)]
pub struct WasmGame {
    game: Game,
    opponent: Box<dyn MoveStrategy>,
}

#[wasm_bindgen(js_class = Game)]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            game: Game::new(),
            opponent: Box::new(RandomMover),
        }
    }

    /// Start over with rules given as a (possibly partial) JSON object.
    pub fn restart(&mut self, config_json: Option<String>) -> JsValue {
        let config = match config_json.as_deref().map(RulesConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(err)) => return error_result(format!("Invalid rules: {err}")),
            None => RulesConfig::new(),
        };
        self.game = Game::new_with_config(config);
        to_js(&build_board_state(&self.game))
    }

    pub fn set_opponent(&mut self, name: &str) -> bool {
        match strategy_by_name(name) {
            Some(strategy) => {
                self.opponent = strategy;
                true
            }
            None => false,
        }
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.game))
    }

    pub fn make_move(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
        promotion: Option<String>,
    ) -> JsValue {
        let promo_pt = match promotion.as_deref() {
            Some(name) => match string_to_piece_type(name) {
                Some(pt) => Some(pt),
                None => return error_result(format!("Unknown promotion piece '{name}'")),
            },
            None => None,
        };

        let from = Position::new(from_row, from_col);
        let to = Position::new(to_row, to_col);
        match self.game.make_move(from, to, promo_pt) {
            Ok(report) => to_js(&MoveResult {
                board_state: Some(build_board_state(&self.game)),
                flags: Some(MoveFlags {
                    capture: report.effects.captured.is_some(),
                    castle: report.effects.castled,
                    en_passant: report.effects.en_passant,
                    promotion: report.effects.promotion.map(|pt| pt.to_string()),
                    check: report.gives_check,
                }),
                error: None,
            }),
            Err(err) => error_result(err.to_string()),
        }
    }

    pub fn make_ai_move(&mut self) -> JsValue {
        let mv = match self.opponent.choose_move(&self.game) {
            Some(mv) => mv,
            None => return to_js(&build_board_state(&self.game)),
        };
        match self.game.apply(mv) {
            Ok(_) => to_js(&build_board_state(&self.game)),
            Err(err) => error_result(format!("{} chose a rejected move: {err}", self.opponent.name())),
        }
    }

    pub fn get_legal_moves_for_square(&self, row: usize, col: usize) -> JsValue {
        let targets: Vec<[usize; 2]> = self
            .game
            .valid_moves(Position::new(row, col))
            .iter()
            .map(|p| [p.row, p.col])
            .collect();
        to_js(&targets)
    }

    pub fn resign(&mut self) -> JsValue {
        match self.game.resign() {
            Ok(_) => to_js(&build_board_state(&self.game)),
            Err(err) => error_result(err.to_string()),
        }
    }

    pub fn agree_draw(&mut self) -> JsValue {
        match self.game.agree_draw() {
            Ok(_) => to_js(&build_board_state(&self.game)),
            Err(err) => error_result(err.to_string()),
        }
    }

    pub fn fen(&self) -> String {
        self.game.fen()
    }

    pub fn export_snapshot(&self) -> Result<String, JsValue> {
        self.game
            .to_snapshot()
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn import_snapshot(&mut self, json: &str) -> Result<(), JsValue> {
        self.game = Game::from_snapshot(json).map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(())
    }
}
