//! Termination, rejection, repetition and snapshot behavior of `Game`.

use chess_rules::board::Board;
use chess_rules::config::RulesConfig;
use chess_rules::error::{BoardError, FenError, MoveError, SnapshotError};
use chess_rules::game::{Game, GameOutcome, GameStatus, Termination};
use chess_rules::moves::Position;
use chess_rules::piece::{Color, Piece, PieceType};

fn pos(s: &str) -> Position {
    Position::from_algebraic(s).expect("valid square")
}

fn play(game: &mut Game, moves: &[&str]) {
    for uci in moves {
        game.make_uci_move(uci)
            .unwrap_or_else(|err| panic!("{uci} should be legal: {err}"));
    }
}

#[test]
fn fools_mate_ends_in_checkmate() {
    let mut game = Game::new();
    play(&mut game, &["f2f3", "e7e5", "g2g4"]);
    let report = game.make_uci_move("d8h4").expect("legal");
    assert!(report.gives_check);
    assert!(report.status.game_over);
    assert!(report.status.white_in_check);
    assert_eq!(
        game.status(),
        GameStatus::Over(GameOutcome::win(Color::Black, Termination::Checkmate))
    );
    assert_eq!(game.result().as_deref(), Some("Black wins by checkmate"));
    assert!(game.board().is_checkmate(Color::White));
    assert_eq!(game.make_uci_move("a2a3").unwrap_err(), MoveError::GameOver);
}

#[test]
fn quiet_king_move_can_stalemate() {
    let mut game = Game::from_fen("7k/5Q2/8/6K1/8/8/8/8 w - - 0 1", RulesConfig::new())
        .expect("valid fen");
    let report = game.make_uci_move("g5g6").expect("legal");
    assert!(!report.gives_check);
    assert_eq!(game.result().as_deref(), Some("Draw by stalemate"));
    assert!(game.board().is_stalemate(Color::Black));
}

#[test]
fn capturing_the_last_piece_draws_on_material() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1", RulesConfig::new())
        .expect("valid fen");
    game.make_uci_move("e1e2").expect("king takes rook");
    assert_eq!(
        game.outcome(),
        Some(GameOutcome::draw(Termination::InsufficientMaterial))
    );
}

#[test]
fn set_up_positions_are_evaluated_immediately() {
    let game = Game::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1", RulesConfig::new())
        .expect("valid fen");
    assert!(game.is_game_over());
    assert!(game.legal_moves().is_empty());
}

#[test]
fn rejected_moves_leave_the_game_untouched() {
    let mut game = Game::new();
    play(&mut game, &["e2e4"]);
    let before = game.fen();
    let history = game.position_history().len();

    assert_eq!(
        game.make_move(Position::new(8, 0), pos("a6"), None).unwrap_err(),
        MoveError::OutOfBounds { row: 8, col: 0 }
    );
    assert_eq!(
        game.make_move(pos("a7"), Position::new(5, 12), None).unwrap_err(),
        MoveError::OutOfBounds { row: 5, col: 12 }
    );
    assert_eq!(
        game.make_move(pos("e5"), pos("e6"), None).unwrap_err(),
        MoveError::NoPiece(pos("e5"))
    );
    assert_eq!(
        game.make_move(pos("d2"), pos("d4"), None).unwrap_err(),
        MoveError::WrongTurn(Color::White)
    );
    assert_eq!(
        game.make_move(pos("e7"), pos("e4"), None).unwrap_err(),
        MoveError::Illegal { from: pos("e7"), to: pos("e4") }
    );
    assert!(matches!(
        game.make_uci_move("nonsense"),
        Err(MoveError::Unparseable(_))
    ));

    assert_eq!(game.fen(), before);
    assert_eq!(game.position_history().len(), history);
    assert_eq!(game.turn(), Color::Black);
}

#[test]
fn fen_export_after_first_move() {
    let mut game = Game::new();
    play(&mut game, &["e2e4"]);
    assert_eq!(
        game.fen(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e4 0 1"
    );
    assert_eq!(
        game.repetition_fen(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e4"
    );
}

#[test]
fn repetition_string_ignores_move_counters() {
    let mut game = Game::new();
    let start_full = game.fen();
    let start_rep = game.repetition_fen();
    play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert_eq!(game.repetition_fen(), start_rep);
    assert_ne!(game.fen(), start_full);
    assert_eq!(game.repetition_count(), 2);
    assert!(!game.is_game_over(), "repetition is not enforced by default");
}

#[test]
fn threefold_repetition_when_enabled() {
    let config = RulesConfig {
        enforce_threefold_repetition: true,
        ..RulesConfig::new()
    };
    let mut game = Game::new_with_config(config);
    play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert!(!game.is_game_over(), "second occurrence is not a draw");
    play(&mut game, &["g1f3", "g8f6", "f3g1"]);
    assert!(!game.is_game_over());
    play(&mut game, &["f6g8"]);
    assert_eq!(game.result().as_deref(), Some("Draw by threefold repetition"));
}

#[test]
fn fifty_move_rule_only_when_enabled() {
    let fen = "4k3/8/8/8/8/8/8/R3K3 w - - 99 70";

    let mut relaxed = Game::from_fen(fen, RulesConfig::new()).expect("valid fen");
    relaxed.make_uci_move("a1a2").expect("legal");
    assert_eq!(relaxed.halfmove_clock(), 100);
    assert!(!relaxed.is_game_over());

    let config = RulesConfig {
        enforce_fifty_move_rule: true,
        ..RulesConfig::new()
    };
    let mut strict = Game::from_fen(fen, config).expect("valid fen");
    strict.make_uci_move("a1a2").expect("legal");
    assert_eq!(strict.result().as_deref(), Some("Draw by fifty-move rule"));
}

#[test]
fn snapshot_round_trip_keeps_every_flag() {
    let config = RulesConfig {
        enforce_threefold_repetition: true,
        ..RulesConfig::new()
    };
    let mut game = Game::new_with_config(config);
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);

    let json = game.to_snapshot().expect("serializable");
    let mut restored = Game::from_snapshot(&json).expect("valid snapshot");

    assert_eq!(restored.fen(), game.fen());
    assert_eq!(restored.board(), game.board());
    assert_eq!(restored.position_history(), game.position_history());
    assert_eq!(restored.config(), game.config());
    assert_eq!(restored.halfmove_clock(), game.halfmove_clock());
    assert_eq!(restored.fullmove_number(), 3);

    // The en passant right survives the round trip
    let report = restored.make_uci_move("e5d6").expect("en passant");
    assert!(report.effects.en_passant);
}

#[test]
fn snapshot_of_finished_game_stays_finished() {
    let mut game = Game::new();
    game.resign().expect("in progress");
    let restored = Game::from_snapshot(&game.to_snapshot().expect("serializable"))
        .expect("valid snapshot");
    assert_eq!(restored.result().as_deref(), Some("Black wins by resignation"));
}

#[test]
fn snapshot_without_a_king_is_rejected() {
    let mut board = Board::empty();
    board.place(Piece::new(PieceType::King, Color::White, pos("e1")));
    board.place(Piece::new(PieceType::King, Color::Black, pos("e8")));
    let game = Game::from_board(board, Color::White, RulesConfig::new()).expect("valid board");

    let mut value: serde_json::Value =
        serde_json::from_str(&game.to_snapshot().expect("serializable")).expect("json");
    value["board"]["squares"][0][4] = serde_json::Value::Null;

    let err = Game::from_snapshot(&value.to_string()).unwrap_err();
    assert!(matches!(err, SnapshotError::Board(_)), "got {err}");
    assert!(matches!(
        Game::from_snapshot("{not json"),
        Err(SnapshotError::Json(_))
    ));
}

#[test]
fn status_report_reflects_check() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "f7f6", "d2d4", "g7g5"]);
    let report = game.make_uci_move("d1h5").expect("legal");
    assert!(report.gives_check);
    assert!(report.status.black_in_check);
    assert!(!report.status.white_in_check);
    assert_eq!(report.status.result.as_deref(), Some("White wins by checkmate"));
}

#[test]
fn setups_with_the_waiting_side_in_check_are_rejected() {
    assert_eq!(
        Game::from_fen("4k3/8/8/8/8/8/8/4R1K1 w - - 0 1", RulesConfig::new()).unwrap_err(),
        FenError::Board(BoardError::OpponentInCheck(Color::Black))
    );

    let game = Game::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - - 0 1", RulesConfig::new())
        .expect("black to move out of check");
    let mut value: serde_json::Value =
        serde_json::from_str(&game.to_snapshot().expect("serializable")).expect("json");
    value["turn"] = serde_json::Value::from("White");

    let err = Game::from_snapshot(&value.to_string()).unwrap_err();
    assert!(
        matches!(err, SnapshotError::Board(BoardError::OpponentInCheck(Color::Black))),
        "got {err}"
    );
}
