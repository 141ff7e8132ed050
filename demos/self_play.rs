use othello_mcts::agent::{GuidedAgent, MctsAgent, play_game};
use othello_mcts::board::GameOutcome;
use othello_mcts::evaluator::{
    Evaluation, Evaluator, EvaluatorError, FnEvaluator, UniformEvaluator, state_planes,
};
use othello_mcts::game_state::GameState;
use othello_mcts::mcts::MonteCarloTreeSearch;
use othello_mcts::random::StandardRandomGenerator;

/// Values a state by the share of pieces held by the player who produced it.
fn piece_share(state: &GameState) -> Result<Evaluation, EvaluatorError> {
    let planes = state_planes(state);
    let own: f32 = planes[0].iter().flatten().sum();
    let other: f32 = planes[1].iter().flatten().sum();
    let uniform = UniformEvaluator::new().evaluate(state)?;
    Ok(Evaluation {
        value: f64::from(own / (own + other).max(1.0)),
        policy: uniform.policy,
    })
}

fn main() -> Result<(), othello_mcts::MctsError> {
    let state = GameState::default();
    println!("{state}\n");

    // Create a new MCTS search instance
    let mut mcts = MonteCarloTreeSearch::builder(state)
        .with_random_generator(StandardRandomGenerator)
        .build();

    // Run a rollout search for 2,000 iterations
    let outcome = mcts.run(2000, None)?;

    // Print the chances
    for child in mcts.get_root().children() {
        let node = child.value();
        if let Some(b_move) = node.transition_move {
            println!(
                "Move: {} = {:.2}% over {} visits",
                b_move,
                node.wins_rate() * 100.0,
                node.visit_count
            );
        }
    }
    println!("The best move is: {:?}\n", outcome.best_move);

    // Rollout search against the guided search with a piece counting evaluator
    let mut rollout = MctsAgent::<StandardRandomGenerator>::default().with_iterations(300);
    let mut guided =
        GuidedAgent::<_, StandardRandomGenerator>::new(FnEvaluator(piece_share)).with_iterations(300);
    let record = play_game(state, &mut rollout, &mut guided)?;

    for b_move in &record.moves {
        println!("{b_move}");
    }
    println!("\n{}\n", record.final_state);
    match record.outcome {
        GameOutcome::Winner(player) => println!("Winner: {player}"),
        GameOutcome::Draw => println!("Draw"),
        GameOutcome::InProgress => println!("Unfinished"),
    }
    Ok(())
}
