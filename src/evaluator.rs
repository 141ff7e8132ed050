//! Position evaluators used by the guided search.
//!
//! An evaluator looks at a game state and returns a value estimate together with a prior
//! over all 64 cells. In practice this is a policy/value network living outside this crate;
//! [`UniformEvaluator`] is provided for testing the search without a model.

use crate::board::{BOARD_SIZE, CELL_COUNT, Cell};
use crate::game_state::GameState;
use thiserror::Error;

/// Errors an evaluator may report.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Model error: {0}")]
    ModelError(String),
}

/// Result of evaluating a game state.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Probability in `[0, 1]` that the player who produced the state goes on to win.
    pub value: f64,

    /// One weight per cell indexed by `row * 8 + col`, summing to 1 over all cells,
    /// illegal ones included. Callers restrict it to legal moves themselves.
    pub policy: [f64; CELL_COUNT],
}

/// A policy/value oracle.
///
/// Calls may be expensive and block; the search makes exactly one call per expansion.
pub trait Evaluator {
    fn evaluate(&self, state: &GameState) -> Result<Evaluation, EvaluatorError>;
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, state: &GameState) -> Result<Evaluation, EvaluatorError> {
        (**self).evaluate(state)
    }
}

/// Evaluator that spreads the prior evenly over the legal moves and reports a neutral value.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, state: &GameState) -> Result<Evaluation, EvaluatorError> {
        let mut policy = [0.0; CELL_COUNT];
        let legal: Vec<usize> = state
            .legal_moves(state.next_player())
            .iter()
            .filter_map(|m| m.cell_index())
            .collect();

        if legal.is_empty() {
            return Ok(Evaluation { value: 0.5, policy });
        }

        let prob = 1.0 / legal.len() as f64;
        for idx in legal {
            policy[idx] = prob;
        }

        Ok(Evaluation { value: 0.5, policy })
    }
}

/// Network input planes for a state: `[0]` marks the pieces of the player who produced
/// the state, `[1]` the pieces of the player to move.
pub fn state_planes(state: &GameState) -> [[[f32; BOARD_SIZE]; BOARD_SIZE]; 2] {
    let mut planes = [[[0.0; BOARD_SIZE]; BOARD_SIZE]; 2];
    let previous = Cell::from(state.previous_player());
    let next = Cell::from(state.next_player());
    for (r, row) in state.board().cells().iter().enumerate() {
        for (c, &cell) in row.iter().enumerate() {
            if cell == previous {
                planes[0][r][c] = 1.0;
            } else if cell == next {
                planes[1][r][c] = 1.0;
            }
        }
    }
    planes
}

/// Restricts a 64-cell policy to the given cells and renormalises it.
///
/// Falls back to a uniform prior when the policy assigns no mass to any of them.
pub fn legal_priors(policy: &[f64; CELL_COUNT], cells: &[Option<usize>]) -> Vec<f64> {
    let raw: Vec<f64> = cells
        .iter()
        .map(|cell| cell.map_or(0.0, |idx| policy[idx].max(0.0)))
        .collect();
    let total: f64 = raw.iter().sum();

    if total > 0.0 && total.is_finite() {
        raw.into_iter().map(|p| p / total).collect()
    } else if cells.is_empty() {
        Vec::new()
    } else {
        vec![1.0 / cells.len() as f64; cells.len()]
    }
}

/// Adapter letting a closure act as an evaluator.
pub struct FnEvaluator<F>(pub F);

impl<F> Evaluator for FnEvaluator<F>
where
    F: Fn(&GameState) -> Result<Evaluation, EvaluatorError>,
{
    fn evaluate(&self, state: &GameState) -> Result<Evaluation, EvaluatorError> {
        (self.0)(state)
    }
}
