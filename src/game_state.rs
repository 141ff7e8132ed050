use crate::board::{BOARD_SIZE, Board, Cell, GameOutcome, Move, Player};
use crate::error::MctsError;
use std::fmt;

/// Compass directions scanned for flips: N, S, E, W, NE, NW, SE, SW.
const DIRECTIONS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, -1),
    (1, 1),
    (1, -1),
];

/// An immutable Othello position: the board and the side to move.
///
/// Moves never mutate a state; [`GameState::apply`] returns a new one.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct GameState {
    board: Board,
    next_player: Player,
}

impl Default for GameState {
    /// The standard opening with player one to move.
    fn default() -> Self {
        GameState::new(Board::standard(), Player::One)
    }
}

impl GameState {
    pub const fn new(board: Board, next_player: Player) -> Self {
        Self { board, next_player }
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The player whose turn it is.
    pub const fn next_player(&self) -> Player {
        self.next_player
    }

    /// The player who made the move producing this state.
    pub const fn previous_player(&self) -> Player {
        self.next_player.opponent()
    }

    pub fn piece_count(&self, player: Player) -> usize {
        self.board.count(Cell::from(player))
    }

    pub fn empty_count(&self) -> usize {
        self.board.count(Cell::Empty)
    }

    /// Checks a move against the rules.
    ///
    /// A placement is legal when the target square is on the board and empty and at least
    /// one direction holds a run of opponent pieces closed by a piece of the mover.
    /// A pass is legal only when the mover has no legal placement.
    pub fn is_legal(&self, b_move: &Move) -> bool {
        match *b_move {
            Move::Place { row, col, player } => {
                if self.board.get(row, col) != Some(Cell::Empty) {
                    return false;
                }
                DIRECTIONS
                    .iter()
                    .any(|&(d_row, d_col)| self.closed_run(row, col, d_row, d_col, player) > 0)
            }
            Move::Pass { player } => !self.has_legal_move(player),
        }
    }

    /// Applies a move and returns the resulting state.
    ///
    /// Placements are validated and flip every closed opponent run; the turn passes to the
    /// opponent of the mover. A pass leaves the board as it is. Whether a pass is warranted
    /// is up to the caller.
    pub fn apply(&self, b_move: &Move) -> Result<GameState, MctsError> {
        match *b_move {
            Move::Pass { player } => Ok(GameState::new(self.board, player.opponent())),
            Move::Place { row, col, player } => {
                if !self.is_legal(b_move) {
                    return Err(MctsError::InvalidMove(*b_move));
                }

                let own = Cell::from(player);
                let mut board = self.board;
                board.set(row as usize, col as usize, own);
                for (d_row, d_col) in DIRECTIONS {
                    let run = self.closed_run(row, col, d_row, d_col, player);
                    for step in 1..=run {
                        board.set(
                            (row + d_row * step) as usize,
                            (col + d_col * step) as usize,
                            own,
                        );
                    }
                }

                Ok(GameState::new(board, player.opponent()))
            }
        }
    }

    /// Returns every legal placement of `player`, scanning rows 0..7 then columns 0..7.
    ///
    /// This order is the canonical enumeration order used wherever children are generated.
    pub fn legal_moves(&self, player: Player) -> Vec<Move> {
        let mut moves = Vec::new();
        for row in 0..BOARD_SIZE as i32 {
            for col in 0..BOARD_SIZE as i32 {
                let candidate = Move::place(row, col, player);
                if self.is_legal(&candidate) {
                    moves.push(candidate);
                }
            }
        }
        moves
    }

    /// Returns `true` as soon as one legal placement of `player` is found.
    pub fn has_legal_move(&self, player: Player) -> bool {
        (0..BOARD_SIZE as i32).any(|row| {
            (0..BOARD_SIZE as i32).any(|col| self.is_legal(&Move::place(row, col, player)))
        })
    }

    /// Returns the game result once neither player can move, `InProgress` before that.
    pub fn terminal_result(&self) -> GameOutcome {
        if self.has_legal_move(self.next_player) || self.has_legal_move(self.previous_player()) {
            GameOutcome::InProgress
        } else {
            self.count_outcome()
        }
    }

    /// Decides the game by piece count, ignoring whether moves remain.
    pub(crate) fn count_outcome(&self) -> GameOutcome {
        let first = self.piece_count(Player::One);
        let second = self.piece_count(Player::Two);
        match first.cmp(&second) {
            std::cmp::Ordering::Greater => GameOutcome::Winner(Player::One),
            std::cmp::Ordering::Less => GameOutcome::Winner(Player::Two),
            std::cmp::Ordering::Equal => GameOutcome::Draw,
        }
    }

    /// Length of the run of opponent pieces starting next to `(row, col)` in the given
    /// direction, or 0 unless that run is non-empty and closed by a piece of `player`.
    fn closed_run(&self, row: i32, col: i32, d_row: i32, d_col: i32, player: Player) -> i32 {
        let opponent = Cell::from(player.opponent());
        let (mut r, mut c) = (row + d_row, col + d_col);
        let mut run = 0;
        while self.board.get(r, c) == Some(opponent) {
            run += 1;
            r += d_row;
            c += d_col;
        }

        if run > 0 && self.board.get(r, c) == Some(Cell::from(player)) {
            run
        } else {
            0
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {col}")?;
        }
        writeln!(f)?;
        for (idx, row) in self.board.cells().iter().enumerate() {
            write!(f, "{idx} |")?;
            for cell in row {
                let symbol = match cell {
                    Cell::Empty => '.',
                    Cell::Player1 => '1',
                    Cell::Player2 => '2',
                };
                write!(f, " {symbol}")?;
            }
            writeln!(f)?;
        }
        write!(f, "{} to move", self.next_player)
    }
}
