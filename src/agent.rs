//! Decision makers that turn a game state into a move.
//!
//! Every agent builds a fresh search per decision; nothing is carried over between moves
//! except the random generator.

use crate::board::{CELL_COUNT, GameOutcome, Move};
use crate::config::SearchConfig;
use crate::error::MctsError;
use crate::evaluator::Evaluator;
use crate::game_state::GameState;
use crate::mcts::{MonteCarloTreeSearch, SearchMode, SearchOutcome};
use crate::random::{RandomGenerator, StandardRandomGenerator};
use tracing::debug;

/// Iterations used by [`MctsAgent`] unless configured otherwise.
pub const DEFAULT_ROLLOUT_ITERATIONS: u32 = 1300;
/// Iterations used by [`GuidedAgent`] unless configured otherwise.
pub const DEFAULT_GUIDED_ITERATIONS: u32 = 500;

/// Something that picks moves.
pub trait Agent {
    fn name(&self) -> &str;

    /// Picks a move for `state.next_player()`. A `best_move` of `None` means the player
    /// has no legal placement.
    fn choose(&mut self, state: &GameState) -> Result<SearchOutcome, MctsError>;
}

/// Plays a uniformly random legal move.
#[derive(Debug, Default)]
pub struct RandomAgent<K: RandomGenerator = StandardRandomGenerator> {
    random: K,
}

impl<K: RandomGenerator> RandomAgent<K> {
    pub fn new(random: K) -> Self {
        Self { random }
    }
}

impl<K: RandomGenerator> Agent for RandomAgent<K> {
    fn name(&self) -> &str {
        "random"
    }

    fn choose(&mut self, state: &GameState) -> Result<SearchOutcome, MctsError> {
        let moves = state.legal_moves(state.next_player());
        Ok(SearchOutcome {
            best_move: self.random.choose(&moves).copied(),
            visit_counts: None,
        })
    }
}

/// Plays the most visited move of a rollout search.
pub struct MctsAgent<K: RandomGenerator = StandardRandomGenerator> {
    iterations: u32,
    config: SearchConfig,
    random: K,
}

impl<K: RandomGenerator> Default for MctsAgent<K> {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ROLLOUT_ITERATIONS,
            config: SearchConfig::default(),
            random: K::default(),
        }
    }
}

impl<K: RandomGenerator> MctsAgent<K> {
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_random_generator(mut self, random: K) -> Self {
        self.random = random;
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl<K: RandomGenerator> Agent for MctsAgent<K> {
    fn name(&self) -> &str {
        "mcts"
    }

    fn choose(&mut self, state: &GameState) -> Result<SearchOutcome, MctsError> {
        search(
            state,
            self.iterations,
            &self.config,
            &mut self.random,
            SearchMode::Vanilla,
        )
    }
}

/// Samples its move from the visit counts of an evaluator-guided search.
pub struct GuidedAgent<E: Evaluator, K: RandomGenerator = StandardRandomGenerator> {
    evaluator: E,
    iterations: u32,
    config: SearchConfig,
    random: K,
}

impl<E: Evaluator, K: RandomGenerator> GuidedAgent<E, K> {
    pub fn new(evaluator: E) -> Self {
        Self {
            evaluator,
            iterations: DEFAULT_GUIDED_ITERATIONS,
            config: SearchConfig::default(),
            random: K::default(),
        }
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_random_generator(mut self, random: K) -> Self {
        self.random = random;
        self
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

impl<E: Evaluator, K: RandomGenerator> Agent for GuidedAgent<E, K> {
    fn name(&self) -> &str {
        "guided"
    }

    fn choose(&mut self, state: &GameState) -> Result<SearchOutcome, MctsError> {
        search(
            state,
            self.iterations,
            &self.config,
            &mut self.random,
            SearchMode::Guided(&self.evaluator),
        )
    }
}

fn search<K: RandomGenerator>(
    state: &GameState,
    iterations: u32,
    config: &SearchConfig,
    random: &mut K,
    mode: SearchMode<'_>,
) -> Result<SearchOutcome, MctsError> {
    let mut mcts = MonteCarloTreeSearch::builder(*state)
        .with_random_generator(std::mem::take(random))
        .with_config(config.clone())
        .build();
    let outcome = mcts.run_with(iterations, mode);
    *random = mcts.into_random_generator();
    outcome
}

/// A finished game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Every move played, passes included.
    pub moves: Vec<Move>,
    /// Root visit counts reported for each state, for agents that report them.
    pub policy_targets: Vec<(GameState, [u32; CELL_COUNT])>,
    pub final_state: GameState,
    pub outcome: GameOutcome,
}

/// Plays `state` out with `first` moving for `state.next_player()` and `second` for
/// the other side. A player without a legal placement passes.
pub fn play_game<'a>(
    state: GameState,
    first: &'a mut dyn Agent,
    second: &'a mut dyn Agent,
) -> Result<GameRecord, MctsError> {
    let first_player = state.next_player();
    let mut state = state;
    let mut moves = vec![];
    let mut policy_targets = vec![];

    loop {
        let outcome = state.terminal_result();
        if outcome.is_terminal() {
            debug!(?outcome, plies = moves.len(), "game finished");
            return Ok(GameRecord {
                moves,
                policy_targets,
                final_state: state,
                outcome,
            });
        }

        let mover = state.next_player();
        let agent = if mover == first_player {
            &mut *first
        } else {
            &mut *second
        };
        let choice = agent.choose(&state)?;
        let b_move = choice.best_move.unwrap_or(Move::pass(mover));
        debug!(agent = agent.name(), %b_move, "move played");

        if let Some(visits) = choice.visit_counts {
            policy_targets.push((state, visits));
        }
        state = state.apply(&b_move)?;
        moves.push(b_move);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Player;
    use crate::evaluator::UniformEvaluator;
    use crate::random::CustomNumberGenerator;

    #[test]
    fn default_iteration_counts() {
        let rollout = MctsAgent::<StandardRandomGenerator>::default();
        let guided = GuidedAgent::<_, StandardRandomGenerator>::new(UniformEvaluator::new());

        assert_eq!(rollout.iterations(), 1300);
        assert_eq!(guided.iterations(), 500);
    }

    #[test]
    fn random_agent_plays_legal_moves() {
        // arrange
        let mut agent = RandomAgent::new(CustomNumberGenerator::new(11));
        let state = GameState::default();

        // act
        let choice = agent.choose(&state).unwrap();

        // assert
        let legal = state.legal_moves(Player::One);
        assert!(legal.contains(&choice.best_move.unwrap()));
        assert_eq!(choice.visit_counts, None);
    }

    #[test]
    fn guided_agent_reports_visits() {
        let mut agent = GuidedAgent::new(UniformEvaluator::new())
            .with_iterations(30)
            .with_random_generator(CustomNumberGenerator::new(2));

        let choice = agent.choose(&GameState::default()).unwrap();

        let visits = choice.visit_counts.unwrap();
        assert_eq!(visits.iter().sum::<u32>(), 29);
    }

    #[test]
    fn random_game_runs_to_the_end() {
        let mut first = RandomAgent::new(CustomNumberGenerator::new(1));
        let mut second = RandomAgent::new(CustomNumberGenerator::new(2));

        let record = play_game(GameState::default(), &mut first, &mut second).unwrap();

        assert!(record.outcome.is_terminal());
        let state = record.final_state;
        assert_eq!(
            state.piece_count(Player::One) + state.piece_count(Player::Two) + state.empty_count(),
            64
        );
        let placements = record.moves.iter().filter(|m| !m.is_pass()).count();
        assert_eq!(placements, 64 - 4 - state.empty_count());
        assert!(record.policy_targets.is_empty());
    }

    #[test]
    fn guided_self_play_collects_targets() {
        let mut first = GuidedAgent::new(UniformEvaluator::new())
            .with_iterations(8)
            .with_random_generator(CustomNumberGenerator::new(4));
        let mut second = RandomAgent::new(CustomNumberGenerator::new(9));

        let record = play_game(GameState::default(), &mut first, &mut second).unwrap();

        let first_moves = record
            .moves
            .iter()
            .filter(|m| m.player() == Player::One && !m.is_pass())
            .count();
        assert_eq!(record.policy_targets.len(), first_moves);
        assert!(
            record
                .policy_targets
                .iter()
                .all(|(state, _)| state.next_player() == Player::One)
        );
    }
}
