use chess_rules::game::Game;
use chess_rules::piece::Color;
use chess_rules::strategy::{strategy_by_name, MoveStrategy, RandomMover};

const MAX_PLIES: u32 = 400;

/// Usage: selfplay [games] [white-strategy] [black-strategy]
fn main() {
    let mut args = std::env::args().skip(1);
    let games: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let mut white = pick(args.next());
    let mut black = pick(args.next());

    for n in 1..=games {
        let mut game = Game::new();
        let mut plies = 0;

        while !game.is_game_over() && plies < MAX_PLIES {
            let strategy = if game.turn() == Color::White { &mut white } else { &mut black };
            let Some(mv) = strategy.choose_move(&game) else {
                break;
            };
            if let Err(err) = game.apply(mv) {
                eprintln!("Game {n}: {} chose a rejected move {mv}: {err}", strategy.name());
                break;
            }
            plies += 1;
        }

        let result = game.result().unwrap_or_else(|| "unfinished".to_string());
        eprintln!("Game {n} over after {plies} plies: {result}");
        eprintln!("  {}", game.fen());
    }
}

fn pick(name: Option<String>) -> Box<dyn MoveStrategy> {
    name.as_deref()
        .and_then(strategy_by_name)
        .unwrap_or_else(|| Box::new(RandomMover))
}
