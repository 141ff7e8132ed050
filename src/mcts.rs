use crate::board::{CELL_COUNT, GameOutcome, Move};
use crate::config::SearchConfig;
use crate::error::MctsError;
use crate::evaluator::{Evaluation, Evaluator, legal_priors};
use crate::game_state::GameState;
use crate::mcts_node::{Backup, MctsNode};
use crate::random::{RandomGenerator, StandardRandomGenerator};
use ego_tree::{NodeId, NodeRef, Tree};
use tracing::{debug, trace, warn};

/// How leaves are expanded and how the final move is extracted.
///
/// Both modes share selection and backpropagation; they differ only in expansion and
/// extraction.
#[derive(Clone, Copy)]
pub enum SearchMode<'e> {
    /// Rollout-based search: UCB1 selection, random playouts, most visited move.
    Vanilla,
    /// Evaluator-guided search: PUCT selection, evaluator estimates, sampled move.
    Guided(&'e dyn Evaluator),
}

impl<'e> From<Option<&'e dyn Evaluator>> for SearchMode<'e> {
    fn from(evaluator: Option<&'e dyn Evaluator>) -> Self {
        match evaluator {
            Some(evaluator) => SearchMode::Guided(evaluator),
            None => SearchMode::Vanilla,
        }
    }
}

impl SearchMode<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            SearchMode::Vanilla => "vanilla",
            SearchMode::Guided(_) => "guided",
        }
    }

    pub fn is_guided(&self) -> bool {
        matches!(self, SearchMode::Guided(_))
    }
}

/// The decision extracted from a finished search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Move to report, `None` when the root has no legal move.
    pub best_move: Option<Move>,
    /// Visits of each root child at its move's cell, indexed by `row * 8 + col`.
    /// Only filled in guided searches, where it serves as a policy training target.
    pub visit_counts: Option<[u32; CELL_COUNT]>,
}

/// What an expansion asks the search to do next.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum ExpansionResult {
    /// Run a playout from this freshly created child.
    Simulate(NodeId),
    /// Propagate a result from this node.
    Propagate(NodeId, Backup),
}

/// The main struct for running the Monte Carlo Tree Search algorithm.
///
/// It holds the search tree, the random number generator, and the configuration for the search.
/// A search is built for a single decision and dropped afterwards.
pub struct MonteCarloTreeSearch<K: RandomGenerator> {
    tree: Tree<MctsNode>,
    root_id: NodeId,
    random: K,
    config: SearchConfig,
    next_action: MctsAction,
}

impl<K: RandomGenerator> Default for MonteCarloTreeSearch<K> {
    fn default() -> Self {
        MonteCarloTreeSearchBuilder::new(GameState::default()).build()
    }
}

/// A builder for creating instances of `MonteCarloTreeSearch`.
pub struct MonteCarloTreeSearchBuilder<K: RandomGenerator> {
    state: GameState,
    random_generator: K,
    config: SearchConfig,
}

impl<K: RandomGenerator> MonteCarloTreeSearchBuilder<K> {
    /// Creates a new builder with the given root state.
    pub fn new(state: GameState) -> Self {
        Self {
            state,
            random_generator: K::default(),
            config: SearchConfig::default(),
        }
    }

    /// Sets the random number generator for rollouts and move sampling.
    pub fn with_random_generator(mut self, rg: K) -> Self {
        self.random_generator = rg;
        self
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how many nodes the tree arena reserves up front.
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.config.node_capacity = capacity;
        self
    }

    pub fn build(self) -> MonteCarloTreeSearch<K> {
        MonteCarloTreeSearch::new(self.state, self.random_generator, self.config)
    }
}

impl<K: RandomGenerator> MonteCarloTreeSearch<K> {
    /// Returns a new builder for `MonteCarloTreeSearch`.
    pub fn builder(state: GameState) -> MonteCarloTreeSearchBuilder<K> {
        MonteCarloTreeSearchBuilder::new(state)
    }

    /// Creates a new `MonteCarloTreeSearch` instance.
    ///
    /// It is recommended to use the builder pattern via `MonteCarloTreeSearch::builder()` instead.
    pub fn new(state: GameState, rg: K, config: SearchConfig) -> Self {
        let tree = Tree::with_capacity(MctsNode::new(state), config.node_capacity);
        let root_id = tree.root().id();

        Self {
            tree,
            root_id,
            random: rg,
            config,
            next_action: MctsAction::Selection {
                root: root_id,
                path: vec![],
            },
        }
    }

    /// Returns an immutable reference to the underlying search tree.
    pub fn get_tree(&self) -> &Tree<MctsNode> {
        &self.tree
    }

    /// Returns a reference to the root node of the search tree.
    pub fn get_root(&self) -> NodeRef<'_, MctsNode> {
        self.tree.root()
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the next MCTS action to be performed. Useful for debugging and visualization.
    pub fn get_next_mcts_action(&self) -> &MctsAction {
        &self.next_action
    }

    pub fn node_count(&self) -> usize {
        self.tree.nodes().count()
    }

    /// Drops the tree and hands back the generator so its sequence can continue
    /// in the next search.
    pub fn into_random_generator(self) -> K {
        self.random
    }

    /// Runs `iterations` select/expand/backpropagate cycles and extracts the decision.
    /// Zero iterations are rejected with `NoIterations`.
    ///
    /// Without an evaluator the search is rollout-based, with one it is guided.
    pub fn run(
        &mut self,
        iterations: u32,
        evaluator: Option<&dyn Evaluator>,
    ) -> Result<SearchOutcome, MctsError> {
        self.run_with(iterations, SearchMode::from(evaluator))
    }

    pub fn run_with(
        &mut self,
        iterations: u32,
        mode: SearchMode<'_>,
    ) -> Result<SearchOutcome, MctsError> {
        if iterations == 0 {
            return Err(MctsError::NoIterations);
        }
        self.iterate_n_times(iterations, mode)?;
        let outcome = self.extract(mode);
        debug!(
            mode = mode.name(),
            iterations,
            nodes = self.node_count(),
            best_move = ?outcome.best_move,
            "search finished"
        );
        Ok(outcome)
    }

    /// Runs the MCTS search for a specified number of iterations.
    pub fn iterate_n_times(&mut self, n: u32, mode: SearchMode<'_>) -> Result<(), MctsError> {
        for _ in 0..n {
            self.do_iteration(mode)?;
        }
        Ok(())
    }

    /// Performs one full iteration and returns the nodes updated during backpropagation,
    /// leaf first.
    pub fn do_iteration(&mut self, mode: SearchMode<'_>) -> Result<Vec<NodeId>, MctsError> {
        self.execute_action(mode)?;
        while !matches!(self.next_action, MctsAction::Selection { .. }) {
            self.execute_action(mode)?;
        }

        match &self.next_action {
            MctsAction::Selection { path, .. } => Ok(path.clone()),
            _ => Ok(vec![]),
        }
    }

    /// Executes a single step of the MCTS algorithm.
    ///
    /// A failing step leaves the tree untouched and resets the search to selection.
    pub fn execute_action(&mut self, mode: SearchMode<'_>) -> Result<(), MctsError> {
        let action = std::mem::replace(
            &mut self.next_action,
            MctsAction::Selection {
                root: self.root_id,
                path: vec![],
            },
        );
        trace!(action = action.get_name(), mode = mode.name(), "mcts step");

        self.next_action = match action {
            MctsAction::Selection { root, .. } => MctsAction::Expansion {
                leaf: self.select_leaf(root, mode)?,
            },
            MctsAction::Expansion { leaf } => match self.expand(leaf, mode)? {
                ExpansionResult::Simulate(child) => MctsAction::Simulation { child },
                ExpansionResult::Propagate(node, backup) => {
                    MctsAction::Backpropagation { node, backup }
                }
            },
            MctsAction::Simulation { child } => {
                let state = self.node(child)?.value().state;
                let outcome = self.rollout(&state)?;
                MctsAction::Backpropagation {
                    node: child,
                    backup: Backup::Rollout(outcome),
                }
            }
            MctsAction::Backpropagation { node, backup } => MctsAction::Selection {
                root: self.root_id,
                path: self.backpropagate(node, backup)?,
            },
        };
        Ok(())
    }

    /// Descends from `from` through the best scoring children down to a node without children.
    pub fn select_leaf(&self, from: NodeId, mode: SearchMode<'_>) -> Result<NodeId, MctsError> {
        let mut current = from;
        while let Some(child) = self.select_child(current, mode)? {
            current = child;
        }
        Ok(current)
    }

    /// Returns the child with the highest UCB (vanilla) or PUCT (guided) score.
    ///
    /// Children are scanned in canonical move order and the first maximum wins.
    pub fn select_child(
        &self,
        node_id: NodeId,
        mode: SearchMode<'_>,
    ) -> Result<Option<NodeId>, MctsError> {
        let node = self.node(node_id)?;
        let parent_visits = node.value().visit_count;
        let exploration = self.config.exploration;

        let mut best: Option<(NodeId, f64)> = None;
        for child in node.children() {
            let score = match mode {
                SearchMode::Vanilla => child.value().ucb_score(parent_visits, exploration),
                SearchMode::Guided(_) => child.value().puct_score(parent_visits, exploration),
            };
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((child.id(), score));
            }
        }

        Ok(best.map(|(id, _)| id))
    }

    /// Expands a leaf by attaching one child per legal move of the player to move.
    ///
    /// Guided mode asks the evaluator once, stores the legal part of its policy as child
    /// priors and propagates its value from the leaf. Vanilla mode attaches children
    /// without priors and picks one at random for a playout.
    ///
    /// A leaf without legal moves gets no children. Its exact result is propagated when
    /// the game is over; otherwise vanilla mode plays out from the leaf itself and guided
    /// mode propagates the evaluator's value.
    pub fn expand(
        &mut self,
        node_id: NodeId,
        mode: SearchMode<'_>,
    ) -> Result<ExpansionResult, MctsError> {
        let node = self.node(node_id)?;
        if node.has_children() {
            return Err(MctsError::AlreadyExpanded(node_id));
        }

        let data = node.value();
        let state = data.state;
        let outcome = data.outcome;
        let moves = state.legal_moves(state.next_player());

        if moves.is_empty() {
            return match mode {
                _ if outcome.is_terminal() => Ok(ExpansionResult::Propagate(
                    node_id,
                    self.terminal_backup(outcome, &state, mode),
                )),
                SearchMode::Vanilla => Ok(ExpansionResult::Simulate(node_id)),
                SearchMode::Guided(evaluator) => {
                    let value = match self.evaluate(evaluator, &state)? {
                        Some(evaluation) => evaluation.value,
                        None => self.rollout_estimate(&state)?,
                    };
                    Ok(ExpansionResult::Propagate(node_id, Backup::Estimate(value)))
                }
            };
        }

        match mode {
            SearchMode::Vanilla => {
                let priors = vec![0.0; moves.len()];
                let children = self.append_children(node_id, &moves, &priors)?;
                let selected = children[self.random.next_range(0, children.len())];
                Ok(ExpansionResult::Simulate(selected))
            }
            SearchMode::Guided(evaluator) => {
                let cells: Vec<Option<usize>> = moves.iter().map(Move::cell_index).collect();
                let (value, priors) = match self.evaluate(evaluator, &state)? {
                    Some(evaluation) => (evaluation.value, legal_priors(&evaluation.policy, &cells)),
                    None => (
                        self.rollout_estimate(&state)?,
                        legal_priors(&[0.0; CELL_COUNT], &cells),
                    ),
                };
                self.append_children(node_id, &moves, &priors)?;
                Ok(ExpansionResult::Propagate(node_id, Backup::Estimate(value)))
            }
        }
    }

    /// Plays uniformly random legal moves from `state` until neither side can move,
    /// passing whenever only the opponent can move.
    pub fn rollout(&mut self, state: &GameState) -> Result<GameOutcome, MctsError> {
        let mut state = *state;
        loop {
            let mover = state.next_player();
            let moves = state.legal_moves(mover);
            let b_move = match self.random.choose(&moves) {
                Some(b_move) => *b_move,
                None if state.has_legal_move(mover.opponent()) => Move::pass(mover),
                None => return Ok(state.count_outcome()),
            };
            state = state.apply(&b_move)?;
        }
    }

    /// Records `backup` on `node_id` and on every ancestor up to the root.
    /// Returns the updated nodes, leaf first.
    pub fn backpropagate(
        &mut self,
        node_id: NodeId,
        backup: Backup,
    ) -> Result<Vec<NodeId>, MctsError> {
        let mut branch = vec![];
        let mut current = Some(node_id);
        while let Some(id) = current {
            let mut node = self.tree.get_mut(id).ok_or(MctsError::UnknownNode(id))?;
            node.value().record(backup);
            branch.push(id);
            current = node.parent().map(|parent| parent.id());
        }
        Ok(branch)
    }

    /// Visit counts of the root children, indexed by the cell of their move.
    pub fn visit_counts(&self) -> [u32; CELL_COUNT] {
        let mut visits = [0; CELL_COUNT];
        for child in self.tree.root().children() {
            let data = child.value();
            if let Some(idx) = data.transition_move.as_ref().and_then(Move::cell_index) {
                visits[idx] = data.visit_count;
            }
        }
        visits
    }

    /// Returns the root child with the most visits, the first in canonical order on ties.
    pub fn get_most_visited_move(&self) -> Option<NodeRef<'_, MctsNode>> {
        let mut best: Option<NodeRef<'_, MctsNode>> = None;
        for child in self.tree.root().children() {
            if best.is_none_or(|node| child.value().visit_count > node.value().visit_count) {
                best = Some(child);
            }
        }
        best
    }

    /// Samples a root child with probability proportional to `visit_count ^ visit_exponent`.
    ///
    /// Falls back to the most visited child when no child has been visited.
    pub fn sample_move(&mut self) -> Option<NodeRef<'_, MctsNode>> {
        let children: Vec<(NodeId, u32)> = self
            .tree
            .root()
            .children()
            .map(|child| (child.id(), child.value().visit_count))
            .collect();
        let total: u32 = children.iter().map(|(_, visits)| visits).sum();
        if total == 0 {
            return self.get_most_visited_move();
        }

        let weights: Vec<f64> = children
            .iter()
            .map(|(_, visits)| (*visits as f64 / total as f64).powf(self.config.visit_exponent))
            .collect();
        match self.random.choose_weighted(&weights) {
            Some(idx) => self.tree.get(children[idx].0),
            None => self.get_most_visited_move(),
        }
    }

    /// Reads the decision off the root.
    pub fn extract(&mut self, mode: SearchMode<'_>) -> SearchOutcome {
        if !self.tree.root().has_children() {
            return SearchOutcome {
                best_move: None,
                visit_counts: None,
            };
        }

        let chosen = match mode {
            SearchMode::Vanilla => self.get_most_visited_move(),
            SearchMode::Guided(_) => self.sample_move(),
        };
        let best_move = chosen.and_then(|node| node.value().transition_move);

        SearchOutcome {
            best_move,
            visit_counts: mode.is_guided().then(|| self.visit_counts()),
        }
    }

    fn node(&self, id: NodeId) -> Result<NodeRef<'_, MctsNode>, MctsError> {
        self.tree.get(id).ok_or(MctsError::UnknownNode(id))
    }

    fn append_children(
        &mut self,
        parent_id: NodeId,
        moves: &[Move],
        priors: &[f64],
    ) -> Result<Vec<NodeId>, MctsError> {
        let parent = self.node(parent_id)?.value();
        let state = parent.state;
        let height = parent.height + 1;

        let mut new_nodes = Vec::with_capacity(moves.len());
        for (b_move, prior) in moves.iter().zip(priors) {
            let child_state = state.apply(b_move)?;
            new_nodes.push(MctsNode::child(child_state, *b_move, *prior, height));
        }

        let mut parent = self
            .tree
            .get_mut(parent_id)
            .ok_or(MctsError::UnknownNode(parent_id))?;
        Ok(new_nodes
            .into_iter()
            .map(|node| parent.append(node).id())
            .collect())
    }

    /// Calls the evaluator. With rollout fallback enabled a failure yields `None`.
    fn evaluate(
        &self,
        evaluator: &dyn Evaluator,
        state: &GameState,
    ) -> Result<Option<Evaluation>, MctsError> {
        match evaluator.evaluate(state) {
            Ok(evaluation) => Ok(Some(evaluation)),
            Err(err) if self.config.rollout_fallback => {
                warn!(error = %err, "evaluator failed, falling back to a rollout");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Plays out `state` and scores the result for the player who produced it.
    fn rollout_estimate(&mut self, state: &GameState) -> Result<f64, MctsError> {
        let outcome = self.rollout(state)?;
        Ok(outcome.reward_for(state.previous_player()))
    }

    fn terminal_backup(&self, outcome: GameOutcome, state: &GameState, mode: SearchMode<'_>) -> Backup {
        match mode {
            SearchMode::Vanilla => Backup::Rollout(outcome),
            SearchMode::Guided(_) => Backup::Estimate(outcome.reward_for(state.previous_player())),
        }
    }
}

impl MonteCarloTreeSearch<StandardRandomGenerator> {
    pub fn from_state(state: GameState) -> Self {
        MonteCarloTreeSearchBuilder::new(state).build()
    }
}

/// Searches a fresh tree rooted at `state` and returns the decision.
///
/// Passing an evaluator selects the guided protocol and yields the root visit counts
/// alongside the move.
pub fn compute_move(
    state: &GameState,
    iterations: u32,
    evaluator: Option<&dyn Evaluator>,
) -> Result<SearchOutcome, MctsError> {
    MonteCarloTreeSearch::from_state(*state).run(iterations, evaluator)
}

/// Represents the stages of one MCTS iteration.
#[derive(Debug, PartialEq, Clone)]
pub enum MctsAction {
    /// Start from `root` and follow the best scoring children down to a leaf.
    Selection {
        root: NodeId,
        /// Nodes updated by the previous backpropagation, leaf first.
        path: Vec<NodeId>,
    },
    /// Attach children to the selected `leaf`.
    Expansion { leaf: NodeId },
    /// Play out a random game from `child`.
    Simulation { child: NodeId },
    /// Record `backup` on `node` and its ancestors.
    Backpropagation { node: NodeId, backup: Backup },
}

impl MctsAction {
    /// Returns the name of the current MCTS action.
    pub fn get_name(&self) -> &'static str {
        match self {
            MctsAction::Selection { .. } => "Selection",
            MctsAction::Expansion { .. } => "Expansion",
            MctsAction::Simulation { .. } => "Simulation",
            MctsAction::Backpropagation { .. } => "Backpropagation",
        }
    }
}
