//! Property-based tests over random playouts.

use chess_rules::fen::parse_fen;
use chess_rules::game::Game;
use chess_rules::moves::Move;
use chess_rules::piece::PieceType;
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

fn random_move(game: &Game, rng: &mut StdRng) -> Option<Move> {
    let moves = game.legal_moves();
    if moves.is_empty() {
        return None;
    }
    let mut mv = moves[rng.gen_range(0..moves.len())];
    let promotes = game
        .board()
        .piece_at(mv.from)
        .map_or(false, |p| p.piece_type == PieceType::Pawn && mv.to.row == p.color.promotion_row());
    if promotes {
        mv.promotion = PieceType::PROMOTION_CHOICES.choose(rng).copied();
    }
    Some(mv)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: no applied move leaves the mover in check, and the piece
    /// count drops by exactly one on a capture and is unchanged otherwise
    #[test]
    fn prop_moves_keep_king_safe_and_count_pieces(seed in any::<u64>(), plies in 1..60usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new();

        for _ in 0..plies {
            let Some(mv) = random_move(&game, &mut rng) else { break };
            let mover = game.turn();
            let before = game.board().piece_count();

            let report = game.apply(mv).expect("listed moves are legal");

            prop_assert!(!game.is_in_check(mover));
            let expected = if report.effects.captured.is_some() { before - 1 } else { before };
            prop_assert_eq!(game.board().piece_count(), expected);
        }
    }

    /// Property: simulating on a clone never changes the original board
    #[test]
    fn prop_clone_is_independent(seed in any::<u64>(), plies in 0..30usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new();
        for _ in 0..plies {
            let Some(mv) = random_move(&game, &mut rng) else { break };
            game.apply(mv).expect("listed moves are legal");
        }

        let original = game.board().clone();
        let fen = game.fen();
        if let Some(mv) = random_move(&game, &mut rng) {
            let mut clone = game.board().clone();
            clone.apply_move(mv.from, mv.to, PieceType::Queen);
            prop_assert_ne!(&clone, &original);
        }
        prop_assert_eq!(game.board(), &original);
        prop_assert_eq!(game.fen(), fen);
    }

    /// Property: exported FEN parses back to the same board and counters
    #[test]
    fn prop_fen_round_trip(seed in any::<u64>(), plies in 0..40usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new();
        for _ in 0..plies {
            let Some(mv) = random_move(&game, &mut rng) else { break };
            game.apply(mv).expect("listed moves are legal");
        }

        let fen = game.fen();
        let parsed = parse_fen(&fen).expect("exported FEN parses");
        prop_assert_eq!(parsed.turn, game.turn());
        prop_assert_eq!(
            parsed.board.generate_fen(parsed.turn, parsed.halfmove_clock, parsed.fullmove_number),
            fen
        );
        prop_assert_eq!(
            parsed.board.generate_repetition_fen(parsed.turn),
            game.repetition_fen()
        );
    }

    /// Property: every listed legal move is accepted by make_move
    #[test]
    fn prop_legal_moves_are_accepted(seed in any::<u64>(), plies in 0..40usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new();
        for _ in 0..plies {
            let Some(mv) = random_move(&game, &mut rng) else { break };
            game.apply(mv).expect("listed moves are legal");
        }
        for mv in game.legal_moves() {
            let mut copy = game.clone();
            prop_assert!(copy.apply(mv).is_ok(), "{} was listed but refused", mv);
        }
    }
}
