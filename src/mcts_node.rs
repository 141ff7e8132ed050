use crate::board::{GameOutcome, Move, Player};
use crate::game_state::GameState;

/// Represents a single node in the Monte Carlo search tree.
///
/// Each node owns a snapshot of the game state, the statistics gathered for it and the move
/// that led to it from its parent. Parent and child links live in the tree arena.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// The game state that this node represents.
    pub state: GameState,
    /// The move that led to this node's state from its parent. `None` for the root node.
    pub transition_move: Option<Move>,
    /// The depth of the node in the tree.
    pub height: u32,
    /// The outcome of the game at this node, `InProgress` unless it is terminal.
    pub outcome: GameOutcome,
    /// The number of times this node has been visited during the search.
    pub visit_count: u32,
    /// Accumulated result from the point of view of the player who moved into this node.
    pub win_score: f64,
    /// Evaluator prior for the transition move, 0 in rollout searches.
    pub prior: f64,
}

/// A search result travelling from a leaf back to the root.
///
/// The two variants follow different accumulation rules and are never mixed in one tree.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Backup {
    /// Final result of a random playout.
    Rollout(GameOutcome),
    /// Evaluator estimate for the player who moved into the leaf.
    Estimate(f64),
}

impl Default for MctsNode {
    fn default() -> Self {
        MctsNode::new(GameState::default())
    }
}

impl MctsNode {
    /// Creates a root node for the given state.
    pub fn new(state: GameState) -> Self {
        let outcome = state.terminal_result();
        MctsNode {
            state,
            transition_move: None,
            height: 0,
            outcome,
            visit_count: 0,
            win_score: 0.0,
            prior: 0.0,
        }
    }

    /// Creates a node reached from a parent at depth `height - 1` by `transition_move`.
    pub fn child(state: GameState, transition_move: Move, prior: f64, height: u32) -> Self {
        MctsNode {
            transition_move: Some(transition_move),
            height,
            prior,
            ..MctsNode::new(state)
        }
    }

    /// The player who made the move into this node.
    pub fn mover(&self) -> Player {
        self.state.previous_player()
    }

    /// Average accumulated result per visit.
    pub fn wins_rate(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.win_score / self.visit_count as f64
        }
    }

    /// UCB1 score used by rollout searches.
    ///
    /// An unvisited node scores `+inf` so that every sibling is tried once before any of
    /// them is revisited.
    pub fn ucb_score(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visit_count == 0 {
            return f64::INFINITY;
        }

        let visits = self.visit_count as f64;
        self.win_score / visits
            + exploration * f64::sqrt(f64::ln(parent_visits as f64) / visits)
    }

    /// PUCT score used by guided searches. Valid for unvisited nodes.
    pub fn puct_score(&self, parent_visits: u32, exploration: f64) -> f64 {
        self.win_score / self.visit_count.max(1) as f64
            + exploration * self.prior * f64::sqrt(parent_visits as f64)
                / (self.visit_count as f64 + 1.0)
    }

    /// Counts a playout: a win for the player who moved into this node scores 1,
    /// a draw scores 0.5, a loss nothing.
    pub fn accumulate_outcome(&mut self, outcome: GameOutcome) {
        self.visit_count += 1;
        self.win_score += outcome.reward_for(self.mover());
    }

    /// Counts an evaluator estimate by adding it as is.
    pub fn accumulate_estimate(&mut self, value: f64) {
        self.visit_count += 1;
        self.win_score += value;
    }

    pub fn record(&mut self, backup: Backup) {
        match backup {
            Backup::Rollout(outcome) => self.accumulate_outcome(outcome),
            Backup::Estimate(value) => self.accumulate_estimate(value),
        }
    }
}
