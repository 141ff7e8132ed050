//! Monte Carlo tree search for 8×8 Othello.
//!
//! The crate bundles an Othello rules engine with a search that runs in one of two modes:
//! a classic rollout search (UCB1 selection, random playouts, most visited move) and an
//! evaluator-guided search (PUCT selection, a policy/value oracle in place of playouts, and
//! a move sampled from the root visit counts). A fresh tree is built for every decision.
//!
//! # Example
//!
//! ```rust
//! use othello_mcts::game_state::GameState;
//! use othello_mcts::mcts::MonteCarloTreeSearch;
//! use othello_mcts::random::CustomNumberGenerator;
//!
//! // Start from the standard opening position
//! let state = GameState::default();
//!
//! // Create and configure a new MCTS search instance using the builder
//! let mut mcts = MonteCarloTreeSearch::builder(state)
//!     .with_random_generator(CustomNumberGenerator::default())
//!     .with_node_capacity(1024)
//!     .build();
//!
//! // Run a rollout search for a number of iterations
//! let outcome = mcts.run(200, None).unwrap();
//!
//! println!("The best move is: {:?}", outcome.best_move);
//! assert!(outcome.best_move.is_some());
//! ```

/// Computer players built on top of the search.
pub mod agent;
/// Cells, players, moves and the 8×8 grid.
pub mod board;
/// Search settings.
pub mod config;
/// The crate error type.
pub mod error;
/// Evaluator interface for the guided search.
pub mod evaluator;
/// The Othello rules engine.
pub mod game_state;
/// The core module of the library, containing the `MonteCarloTreeSearch` implementation.
pub mod mcts;
/// Contains the `MctsNode` struct, which represents a node in the search tree.
pub mod mcts_node;
/// Contains traits and implementations for random number generation.
pub mod random;
/// JSON turn requests and move replies exchanged with a game server.
pub mod wire;

pub use board::{GameOutcome, Move, Player};
pub use config::SearchConfig;
pub use error::MctsError;
pub use evaluator::{Evaluation, Evaluator, EvaluatorError};
pub use game_state::GameState;
pub use mcts::{MonteCarloTreeSearch, SearchOutcome, compute_move};
