// =============================================================================
// Move strategies
//
// The rules engine does not pick moves. A strategy is an outside player that
// reads `Game::legal_moves` and returns one of them; the caller still submits
// it through `Game::apply`, so a strategy can never bypass validation.
// =============================================================================

use crate::game::Game;
use crate::moves::Move;
use crate::piece::PieceType;

/// Platform-appropriate random number in [0, 1).
/// Uses js_sys::Math::random() in WASM builds, rand crate natively.
fn random_f64() -> f64 {
    #[cfg(target_arch = "wasm32")]
    {
        js_sys::Math::random()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        use rand::Rng;
        rand::thread_rng().gen::<f64>()
    }
}

fn pick_random(moves: &[Move]) -> Option<Move> {
    if moves.is_empty() {
        return None;
    }
    let index = (random_f64() * moves.len() as f64) as usize;
    Some(moves[index.min(moves.len() - 1)])
}

pub trait MoveStrategy {
    fn name(&self) -> &str;

    /// `None` when the side to move has no legal move or the game is over.
    fn choose_move(&mut self, game: &Game) -> Option<Move>;
}

/// Uniformly random legal move.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomMover;

impl MoveStrategy for RandomMover {
    fn name(&self) -> &str {
        "Random"
    }

    fn choose_move(&mut self, game: &Game) -> Option<Move> {
        pick_random(&game.legal_moves())
    }
}

/// Random capture when one exists, otherwise a random move.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptureFirst;

impl MoveStrategy for CaptureFirst {
    fn name(&self) -> &str {
        "CaptureFirst"
    }

    fn choose_move(&mut self, game: &Game) -> Option<Move> {
        let moves = game.legal_moves();
        let board = game.board();
        let captures: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|m| {
                let target_occupied = board.piece_at(m.to).is_some();
                let en_passant = board.piece_at(m.from).map_or(false, |p| {
                    p.piece_type == PieceType::Pawn && m.from.col != m.to.col
                });
                target_occupied || en_passant
            })
            .collect();
        pick_random(&captures).or_else(|| pick_random(&moves))
    }
}

/// Look a strategy up by its [`MoveStrategy::name`], case-insensitively.
pub fn strategy_by_name(name: &str) -> Option<Box<dyn MoveStrategy>> {
    match name.to_ascii_lowercase().as_str() {
        "random" => Some(Box::new(RandomMover)),
        "capturefirst" => Some(Box::new(CaptureFirst)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;

    #[test]
    fn random_mover_returns_a_legal_move() {
        let game = Game::new();
        let mv = RandomMover.choose_move(&game).expect("white has moves");
        assert!(game.legal_moves().contains(&mv));
    }

    #[test]
    fn capture_first_takes_the_hanging_queen() {
        // The only capture available is Rxd8
        let game = Game::from_fen("3qk3/8/8/8/8/8/8/3RK3 w - - 0 1", RulesConfig::new())
            .expect("valid fen");
        let mv = CaptureFirst.choose_move(&game).expect("white has moves");
        assert_eq!(mv.to_uci(), "d1d8");
    }

    #[test]
    fn no_move_once_the_game_is_over() {
        let mut game = Game::new();
        game.resign().expect("in progress");
        assert!(RandomMover.choose_move(&game).is_none());
    }

    #[test]
    fn lookup_by_name() {
        assert_eq!(strategy_by_name("random").map(|s| s.name().to_string()).as_deref(), Some("Random"));
        assert!(strategy_by_name("CAPTUREFIRST").is_some());
        assert!(strategy_by_name("stockfish").is_none());
    }
}
