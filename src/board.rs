use std::fmt;

/// Number of rows and columns on an Othello board.
pub const BOARD_SIZE: usize = 8;
/// Number of cells on an Othello board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// One of the two sides of a game.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Player {
    /// The first player, written as `1` on the wire.
    One = 1,
    /// The second player, written as `2` on the wire.
    Two = 2,
}

impl Player {
    /// Returns the other side.
    pub const fn opponent(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", *self as u8)
    }
}

/// Contents of a single board square.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Cell {
    #[default]
    Empty = 0,
    Player1 = 1,
    Player2 = 2,
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::One => Cell::Player1,
            Player::Two => Cell::Player2,
        }
    }
}

/// Returns `true` if the coordinates address a square of the board.
pub const fn in_bounds(row: i32, col: i32) -> bool {
    row >= 0 && row < BOARD_SIZE as i32 && col >= 0 && col < BOARD_SIZE as i32
}

/// A single ply.
///
/// Coordinates are signed so that off-board requests can be represented and rejected
/// by the rules engine instead of wrapping around.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Move {
    /// Put a piece of `player` on the given square.
    Place { row: i32, col: i32, player: Player },
    /// `player` has no legal placement and hands the turn over.
    Pass { player: Player },
}

impl Move {
    pub const fn place(row: i32, col: i32, player: Player) -> Self {
        Move::Place { row, col, player }
    }

    pub const fn pass(player: Player) -> Self {
        Move::Pass { player }
    }

    /// Returns the player making this move.
    pub const fn player(&self) -> Player {
        match *self {
            Move::Place { player, .. } | Move::Pass { player } => player,
        }
    }

    /// Returns `(row, col)` for a placement, `None` for a pass.
    pub const fn coordinates(&self) -> Option<(i32, i32)> {
        match *self {
            Move::Place { row, col, .. } => Some((row, col)),
            Move::Pass { .. } => None,
        }
    }

    /// Returns the row-major cell index `row * 8 + col` of an on-board placement.
    pub fn cell_index(&self) -> Option<usize> {
        match self.coordinates() {
            Some((row, col)) if in_bounds(row, col) => {
                Some(row as usize * BOARD_SIZE + col as usize)
            }
            _ => None,
        }
    }

    pub const fn is_pass(&self) -> bool {
        matches!(self, Move::Pass { .. })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place { row, col, player } => write!(f, "{player}: [{row}, {col}]"),
            Move::Pass { player } => write!(f, "{player}: pass"),
        }
    }
}

/// Result of a game as seen by the rules engine.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum GameOutcome {
    /// At least one player still has a legal placement.
    InProgress,
    /// Neither player can move and this player owns strictly more pieces.
    Winner(Player),
    /// Neither player can move and both own the same number of pieces.
    Draw,
}

impl GameOutcome {
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }

    /// Score of this outcome for `player`: 1 for a win, 0.5 for a draw, 0 otherwise.
    pub fn reward_for(&self, player: Player) -> f64 {
        match *self {
            GameOutcome::Winner(winner) if winner == player => 1.0,
            GameOutcome::Draw => 0.5,
            _ => 0.0,
        }
    }
}

/// Fixed 8x8 grid of cells.
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, Hash)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// A board with no pieces on it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard opening position.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        board.set(3, 3, Cell::Player1);
        board.set(3, 4, Cell::Player2);
        board.set(4, 3, Cell::Player2);
        board.set(4, 4, Cell::Player1);
        board
    }

    pub const fn from_cells(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Self { cells }
    }

    pub const fn cells(&self) -> &[[Cell; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Returns the cell at the given coordinates, or `None` when they are off the board.
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if in_bounds(row, col) {
            Some(self.cells[row as usize][col as usize])
        } else {
            None
        }
    }

    /// Writes `cell` at the given coordinates. Returns `false` and leaves the board
    /// untouched when they are off the board.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) -> bool {
        match self.cells.get_mut(row).and_then(|cells| cells.get_mut(col)) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Counts the cells holding `cell`.
    pub fn count(&self, cell: Cell) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&current| current == cell)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_board_has_four_pieces() {
        let board = Board::standard();
        assert_eq!(board.count(Cell::Player1), 2);
        assert_eq!(board.count(Cell::Player2), 2);
        assert_eq!(board.count(Cell::Empty), 60);
        assert_eq!(board.get(3, 3), Some(Cell::Player1));
        assert_eq!(board.get(4, 3), Some(Cell::Player2));
    }

    #[test]
    fn get_rejects_off_board_coordinates() {
        let board = Board::standard();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, 8), None);
        assert_eq!(board.get(8, 8), None);
    }

    #[test]
    fn set_ignores_off_board_coordinates() {
        let mut board = Board::standard();

        assert!(!board.set(8, 0, Cell::Player1));
        assert!(!board.set(0, 8, Cell::Player2));
        assert!(board.set(7, 7, Cell::Player2));

        assert_eq!(board.count(Cell::Player1), 2);
        assert_eq!(board.count(Cell::Player2), 3);
    }

    #[test]
    fn cell_index_is_row_major() {
        assert_eq!(Move::place(0, 0, Player::One).cell_index(), Some(0));
        assert_eq!(Move::place(2, 4, Player::One).cell_index(), Some(20));
        assert_eq!(Move::place(7, 7, Player::Two).cell_index(), Some(63));
        assert_eq!(Move::place(8, 0, Player::Two).cell_index(), None);
        assert_eq!(Move::pass(Player::One).cell_index(), None);
    }

    #[test]
    fn outcome_rewards() {
        assert_eq!(GameOutcome::Winner(Player::One).reward_for(Player::One), 1.0);
        assert_eq!(GameOutcome::Winner(Player::One).reward_for(Player::Two), 0.0);
        assert_eq!(GameOutcome::Draw.reward_for(Player::Two), 0.5);
        assert_eq!(GameOutcome::InProgress.reward_for(Player::One), 0.0);
    }

    #[test]
    fn moves_display_like_the_log_format() {
        assert_eq!(Move::place(2, 4, Player::One).to_string(), "Player 1: [2, 4]");
        assert_eq!(Move::pass(Player::Two).to_string(), "Player 2: pass");
    }
}
