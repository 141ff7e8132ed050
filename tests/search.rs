use othello_mcts::MctsError;
use othello_mcts::board::{GameOutcome, Move, Player};
use othello_mcts::evaluator::{
    Evaluation, Evaluator, EvaluatorError, FnEvaluator, UniformEvaluator, state_planes,
};
use othello_mcts::game_state::GameState;
use othello_mcts::mcts::{MonteCarloTreeSearch, compute_move};
use othello_mcts::random::CustomNumberGenerator;
use othello_mcts::wire::TurnRequest;

/// Two empty cells left; player one can fill either and player two has no reply.
const LAST_PLY: [[u8; 8]; 8] = [
    [0, 1, 0, 1, 1, 1, 1, 1],
    [1, 2, 1, 1, 2, 2, 2, 2],
    [1, 2, 1, 2, 1, 2, 2, 2],
    [1, 2, 1, 1, 2, 1, 2, 2],
    [1, 2, 1, 2, 1, 2, 1, 2],
    [1, 2, 1, 2, 2, 1, 2, 1],
    [1, 2, 1, 2, 2, 2, 1, 2],
    [1, 2, 1, 2, 2, 2, 2, 1],
];

fn state_from_rows(board: [[u8; 8]; 8], player: u8) -> GameState {
    TurnRequest {
        board,
        max_turn_time: None,
        player,
    }
    .to_state()
    .unwrap()
}

/// Best move by trying every legal move once, first in canonical order on ties.
fn one_ply_lookahead(state: &GameState) -> Option<(Move, GameOutcome)> {
    let mover = state.next_player();
    let mut best: Option<(Move, GameOutcome)> = None;
    for b_move in state.legal_moves(mover) {
        let outcome = state.apply(&b_move).unwrap().terminal_result();
        let better = match best {
            None => true,
            Some((_, current)) => outcome.reward_for(mover) > current.reward_for(mover),
        };
        if better {
            best = Some((b_move, outcome));
        }
    }
    best
}

#[test]
fn vanilla_search_agrees_with_lookahead_one_ply_from_the_end() {
    // arrange
    let state = state_from_rows(LAST_PLY, 1);
    assert_eq!(
        state
            .legal_moves(Player::One)
            .iter()
            .filter_map(Move::coordinates)
            .collect::<Vec<_>>(),
        vec![(0, 0), (0, 2)]
    );
    let (expected_move, expected_outcome) = one_ply_lookahead(&state).unwrap();
    let mut mcts = MonteCarloTreeSearch::builder(state)
        .with_random_generator(CustomNumberGenerator::new(2024))
        .build();

    // act
    let outcome = mcts.run(50, None).unwrap();

    // assert
    let chosen = outcome.best_move.unwrap();
    assert_eq!(chosen, expected_move);
    let reached = state.apply(&chosen).unwrap().terminal_result();
    assert_eq!(reached, expected_outcome);
    assert_eq!(reached, GameOutcome::Winner(Player::One));
    let root = mcts.get_root();
    assert!(root.children().all(|child| child.value().visit_count == 25));
}

#[test]
fn guided_search_reports_a_distribution() {
    let state = GameState::default();

    let outcome = compute_move(&state, 40, Some(&UniformEvaluator::new())).unwrap();

    let visits = outcome.visit_counts.unwrap();
    let best = outcome.best_move.unwrap();
    let (row, col) = best.coordinates().unwrap();
    assert!(visits[(row * 8 + col) as usize] > 0);
    assert_eq!(visits.iter().sum::<u32>(), 39);
    // only the four opening cells can carry visits
    for (idx, count) in visits.iter().enumerate() {
        if ![20, 29, 34, 43].contains(&idx) {
            assert_eq!(*count, 0);
        }
    }
}

#[test]
fn vanilla_compute_move_plays_a_legal_move() {
    let state = state_from_rows(
        [
            [0, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 2, 0, 0, 0],
            [0, 0, 0, 0, 2, 0, 0, 0],
            [0, 0, 0, 1, 2, 0, 0, 0],
            [0, 0, 0, 1, 2, 2, 0, 0],
            [0, 0, 0, 1, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0, 0, 0, 0],
        ],
        1,
    );

    let outcome = compute_move(&state, 100, None).unwrap();

    let best = outcome.best_move.unwrap();
    assert!(state.is_legal(&best));
    assert_eq!(outcome.visit_counts, None);
}

#[test]
fn zero_iterations_never_report_a_pass() {
    let state = GameState::default();
    assert_eq!(state.legal_moves(Player::One).len(), 4);

    let plain = compute_move(&state, 0, None);
    let guided = compute_move(&state, 0, Some(&UniformEvaluator::new()));

    assert!(matches!(plain, Err(MctsError::NoIterations)));
    assert!(matches!(guided, Err(MctsError::NoIterations)));
}

#[test]
fn searches_never_touch_the_input_state() {
    let state = GameState::default();
    let copy = state;

    compute_move(&state, 25, None).unwrap();
    compute_move(&state, 25, Some(&UniformEvaluator::new())).unwrap();

    assert_eq!(state, copy);
}

#[test]
fn guided_search_with_a_plane_based_evaluator() {
    // value is the share of pieces held by the player who produced the state
    let evaluator = FnEvaluator(|state: &GameState| -> Result<Evaluation, EvaluatorError> {
        let planes = state_planes(state);
        let own: f32 = planes[0].iter().flatten().sum();
        let other: f32 = planes[1].iter().flatten().sum();
        let uniform = UniformEvaluator::new().evaluate(state)?;
        Ok(Evaluation {
            value: f64::from(own / (own + other)),
            policy: uniform.policy,
        })
    });
    let mut mcts = MonteCarloTreeSearch::builder(GameState::default())
        .with_random_generator(CustomNumberGenerator::new(77))
        .build();

    let outcome = mcts.run(30, Some(&evaluator)).unwrap();

    // the opening root is worth one half to the player who produced it
    let root = mcts.get_root().value().clone();
    assert_eq!(root.visit_count, 30);
    assert!(root.win_score > 0.0 && root.win_score < 30.0);
    assert!(outcome.best_move.is_some());
    assert_eq!(outcome.visit_counts.unwrap().iter().sum::<u32>(), 29);
}
