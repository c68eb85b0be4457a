// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use tictactoe_relay::board::{BOARD_SIDE, Board, NUM_SQUARES, Square};
use tictactoe_relay::mark::Mark;


// Parses a board written as three rows of `x`, `o` or `.`, e.g.
//   x . o
//   . x .
//   o . .
// Cells are placed in row-major order without any turn checks.
#[allow(dead_code)]
pub fn parse_board(board_str: &str) -> Result<Board, String> {
    let cells: Vec<&str> = board_str.split_whitespace().collect();
    if cells.len() != NUM_SQUARES {
        return Err(format!("Expected {} cells, got {}", NUM_SQUARES, cells.len()));
    }
    let mut board = Board::new();
    for (idx, cell) in cells.iter().enumerate() {
        let mut chars = cell.chars();
        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return Err(format!("Invalid cell: {cell}"));
        };
        if ch == '.' {
            continue;
        }
        let mark = Mark::from_char(ch).ok_or_else(|| format!("Invalid cell: {cell}"))?;
        board.place(mark, idx as Square).map_err(|err| format!("{err}"))?;
    }
    Ok(board)
}

#[allow(dead_code)]
pub fn square(row: usize, col: usize) -> Square { (row * BOARD_SIDE + col) as Square }

