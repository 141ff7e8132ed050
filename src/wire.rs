//! JSON representation of turns exchanged with a game server.
//!
//! The server sends the board as an 8×8 matrix of `0` (empty), `1` and `2` together with
//! the player to move. The reply is `{"row": r, "col": c}`, or `null` when the player
//! has to pass.

use crate::board::{BOARD_SIZE, Board, Cell, Move, Player, in_bounds};
use crate::error::MctsError;
use crate::game_state::GameState;
use serde::{Deserialize, Serialize};

/// A request for a move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRequest {
    pub board: [[u8; BOARD_SIZE]; BOARD_SIZE],
    /// Time budget announced by the server. Searches are bounded by iterations, so it is
    /// only carried along.
    #[serde(rename = "maxTurnTime", default)]
    pub max_turn_time: Option<f64>,
    pub player: u8,
}

impl TurnRequest {
    pub fn from_json(json: &str) -> Result<Self, MctsError> {
        serde_json::from_str(json).map_err(|e| MctsError::InvalidWire(e.to_string()))
    }

    pub fn from_state(state: &GameState, max_turn_time: Option<f64>) -> Self {
        let mut board = [[0; BOARD_SIZE]; BOARD_SIZE];
        for (r, row) in state.board().cells().iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                board[r][c] = cell_to_wire(*cell);
            }
        }
        Self {
            board,
            max_turn_time,
            player: state.next_player() as u8,
        }
    }

    /// Builds the game state with `player` to move.
    pub fn to_state(&self) -> Result<GameState, MctsError> {
        let mut board = Board::empty();
        for (r, row) in self.board.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                board.set(r, c, cell_from_wire(*value)?);
            }
        }
        Ok(GameState::new(board, player_from_wire(self.player)?))
    }
}

pub fn player_from_wire(value: u8) -> Result<Player, MctsError> {
    match value {
        1 => Ok(Player::One),
        2 => Ok(Player::Two),
        other => Err(MctsError::InvalidWire(format!("unknown player {other}"))),
    }
}

pub fn cell_from_wire(value: u8) -> Result<Cell, MctsError> {
    match value {
        0 => Ok(Cell::Empty),
        1 => Ok(Cell::Player1),
        2 => Ok(Cell::Player2),
        other => Err(MctsError::InvalidWire(format!("unknown cell value {other}"))),
    }
}

fn cell_to_wire(cell: Cell) -> u8 {
    match cell {
        Cell::Empty => 0,
        Cell::Player1 => 1,
        Cell::Player2 => 2,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub row: i32,
    pub col: i32,
}

/// A move as sent back to the server. `None` stands for a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveReply(pub Option<Coordinates>);

impl From<Option<Move>> for MoveReply {
    fn from(b_move: Option<Move>) -> Self {
        MoveReply(
            b_move
                .and_then(|m| m.coordinates())
                .map(|(row, col)| Coordinates { row, col }),
        )
    }
}

impl MoveReply {
    pub fn to_json(&self) -> Result<String, MctsError> {
        serde_json::to_string(self).map_err(|e| MctsError::InvalidWire(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, MctsError> {
        serde_json::from_str(json).map_err(|e| MctsError::InvalidWire(e.to_string()))
    }

    /// Turns the reply into a move made by `player`. Coordinates off the board are rejected.
    pub fn into_move(self, player: Player) -> Result<Move, MctsError> {
        match self.0 {
            None => Ok(Move::pass(player)),
            Some(Coordinates { row, col }) if in_bounds(row, col) => {
                Ok(Move::place(row, col, player))
            }
            Some(Coordinates { row, col }) => Err(MctsError::InvalidWire(format!(
                "coordinates [{row}, {col}] are off the board"
            ))),
        }
    }
}
