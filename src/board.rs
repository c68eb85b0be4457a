use std::fmt;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::mark::Mark;


pub const BOARD_SIDE: usize = 3;
pub const NUM_SQUARES: usize = BOARD_SIDE * BOARD_SIDE;

// Squares are numbered 0..9 in row-major order:
//   0 1 2
//   3 4 5
//   6 7 8
pub type Square = u8;

const WINNING_LINES: [[usize; BOARD_SIDE]; 8] = [
    // Rows.
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns.
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals.
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum FinishedReason {
    #[serde(rename = "x-won")]
    XWon,
    #[serde(rename = "o-won")]
    OWon,
    #[serde(rename = "tie")]
    Tie,
}

impl FinishedReason {
    pub fn victory(winner: Mark) -> Self {
        match winner {
            Mark::X => FinishedReason::XWon,
            Mark::O => FinishedReason::OWon,
        }
    }

    pub fn winner(self) -> Option<Mark> {
        match self {
            FinishedReason::XWon => Some(Mark::X),
            FinishedReason::OWon => Some(Mark::O),
            FinishedReason::Tie => None,
        }
    }
}

// Reasons a turn can be rejected. Only the first two are detected by `Board` itself, the rest come
// from `Game` and `ServerState`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TurnError {
    SquareOutOfRange,
    SquareOccupied,
    WrongTurn,
    WrongMark,
    GameOver,
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            TurnError::SquareOutOfRange => "square is out of range",
            TurnError::SquareOccupied => "square is already occupied",
            TurnError::WrongTurn => "not this mark's turn",
            TurnError::WrongMark => "player tried to place the opponent's mark",
            TurnError::GameOver => "game is over",
        };
        f.write_str(message)
    }
}

// Plain board storage plus terminal state detection. Knows nothing about turn order: any mark can
// be placed on any free square.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [Option<Mark>; NUM_SQUARES],
}

impl Board {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, square: Square) -> Option<Mark> {
        self.cells.get(square as usize).copied().flatten()
    }

    pub fn has_piece(&self, square: Square) -> bool { self.get(square).is_some() }

    pub fn is_full(&self) -> bool { self.cells.iter().all(Option::is_some) }

    pub fn num_pieces(&self) -> usize { self.cells.iter().filter(|c| c.is_some()).count() }

    pub fn place(&mut self, mark: Mark, square: Square) -> Result<(), TurnError> {
        let cell = self.cells.get_mut(square as usize).ok_or(TurnError::SquareOutOfRange)?;
        if cell.is_some() {
            return Err(TurnError::SquareOccupied);
        }
        *cell = Some(mark);
        Ok(())
    }

    pub fn has_line(&self, mark: Mark) -> bool {
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| self.cells[idx] == Some(mark)))
    }

    // Wins are checked before the tie, and X before O. Both marks having a line at the same time
    // is impossible with alternating turns, but the order keeps the answer deterministic anyway.
    pub fn termination_reason(&self) -> Option<FinishedReason> {
        if let Some(winner) = Mark::iter().find(|&mark| self.has_line(mark)) {
            Some(FinishedReason::victory(winner))
        } else if self.is_full() {
            Some(FinishedReason::Tie)
        } else {
            None
        }
    }
}

pub fn opposite_mark(mark: Mark) -> Mark { mark.opposite() }

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_idx, row) in self.cells.chunks(BOARD_SIDE).enumerate() {
            if row_idx > 0 {
                writeln!(f)?;
            }
            let row_str: String = row.iter().map(|c| c.map_or('.', Mark::to_char)).collect();
            f.write_str(&row_str)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat: String = self.cells.iter().map(|c| c.map_or('.', Mark::to_char)).collect();
        write!(f, "Board({flat})")
    }
}
