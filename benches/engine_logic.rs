use criterion::{black_box, criterion_group, criterion_main, Criterion};
use super_ttt::core::{legal_moves, select_move, validate_and_apply_move, GameState, MoveContext, SimpleRng};
use super_ttt::sync::{decode_game, encode_game};
use super_ttt::types::{Move, Side};

/// A mid-game position reached by random legal play.
fn midgame() -> GameState {
    let mut rng = SimpleRng::new(12345);
    let mut state = GameState::new();
    let mut side = Side::X;
    for i in 0..30 {
        let moves = legal_moves(&state);
        let Some(&mv) = rng.pick(&moves) else { break };
        if state.apply_move(side, mv, MoveContext::automated(i)).is_err() {
            break;
        }
        side = side.opponent();
    }
    state
}

fn bench_apply_move(c: &mut Criterion) {
    let state = GameState::new();
    let mv = Move { board: 4, cell: 4 };

    c.bench_function("validate_and_apply_move", |b| {
        b.iter(|| validate_and_apply_move(black_box(&state), Side::X, mv, MoveContext::automated(0)))
    });
}

fn bench_legal_moves(c: &mut Criterion) {
    let state = midgame();

    c.bench_function("legal_moves_midgame", |b| b.iter(|| legal_moves(black_box(&state))));
}

fn bench_select_move(c: &mut Criterion) {
    let state = midgame();
    let mut rng = SimpleRng::new(7);

    c.bench_function("ai_select_move", |b| {
        b.iter(|| select_move(black_box(&state), Side::X, &mut rng))
    });
}

fn bench_decode_game(c: &mut Criterion) {
    let payload = encode_game(&midgame());

    c.bench_function("decode_game_payload", |b| b.iter(|| decode_game(black_box(&payload))));
}

criterion_group!(
    benches,
    bench_apply_move,
    bench_legal_moves,
    bench_select_move,
    bench_decode_game
);
criterion_main!(benches);
