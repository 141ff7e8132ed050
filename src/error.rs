use crate::board::Move;
use crate::evaluator::EvaluatorError;
use ego_tree::NodeId;
use thiserror::Error;

/// Errors produced by the rules engine and the search.
#[derive(Debug, Error)]
pub enum MctsError {
    /// A placement was requested that the rules do not allow.
    #[error("illegal move: {0}")]
    InvalidMove(Move),

    /// Expansion was requested for a node that already has children.
    /// Selection must always stop at a true leaf, so this is a bug in the caller.
    #[error("node {0:?} is already expanded")]
    AlreadyExpanded(NodeId),

    #[error("node {0:?} does not belong to this tree")]
    UnknownNode(NodeId),

    #[error(transparent)]
    Evaluator(#[from] EvaluatorError),

    /// A search needs at least one iteration to expand its root.
    #[error("a search needs at least one iteration")]
    NoIterations,

    #[error("invalid wire data: {0}")]
    InvalidWire(String),
}
