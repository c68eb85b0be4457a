mod common;

use itertools::Itertools;
use tictactoe_relay::board::{Board, FinishedReason, NUM_SQUARES, Square, TurnError, opposite_mark};
use tictactoe_relay::game::{Game, GameEndReason, GameStatus};
use tictactoe_relay::mark::Mark;

use common::*;


const LINES: [[Square; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

// A full board without three in a row:
//   x o x
//   x o o
//   o x x
const TIE_X: [Square; 5] = [0, 2, 3, 7, 8];
const TIE_O: [Square; 4] = [1, 4, 5, 6];


#[test]
fn parse_board_helper() {
    let board = parse_board("
        x . o
        . x .
        o . .
    ").unwrap();
    assert_eq!(board.to_string(), "x.o\n.x.\no..");
    assert_eq!(board.get(square(2, 0)), Some(Mark::O));
    assert!(parse_board("x x").is_err());
    assert!(parse_board("x . . . . . . . q").is_err());
}

#[test]
fn opposite() {
    assert_eq!(opposite_mark(Mark::X), Mark::O);
    assert_eq!(opposite_mark(Mark::O), Mark::X);
    assert_eq!(opposite_mark(opposite_mark(Mark::X)), Mark::X);
}

#[test]
fn empty_board_is_ongoing() {
    let board = Board::new();
    assert_eq!(board.termination_reason(), None);
    assert!(!board.is_full());
    assert_eq!(board.num_pieces(), 0);
}

#[test]
fn tie_in_any_alternating_order() {
    for x_order in TIE_X.iter().permutations(TIE_X.len()) {
        for o_order in TIE_O.iter().permutations(TIE_O.len()) {
            let mut board = Board::new();
            let moves = x_order.iter().interleave(o_order.iter());
            for (idx, &&square) in moves.enumerate() {
                assert_eq!(board.termination_reason(), None);
                let mark = if idx % 2 == 0 { Mark::X } else { Mark::O };
                board.place(mark, square).unwrap();
            }
            assert_eq!(board.termination_reason(), Some(FinishedReason::Tie));
        }
    }
}

#[test]
fn line_wins_regardless_of_fill_order() {
    for line in LINES {
        let others = (0..NUM_SQUARES as Square).filter(|sq| !line.contains(sq)).collect_vec();
        for mark in [Mark::X, Mark::O] {
            for order in others.iter().permutations(others.len()) {
                let mut board = Board::new();
                // Two opposite marks can never form a line; the rest goes to the winner.
                for (idx, &&square) in order.iter().enumerate() {
                    let cell_mark = if idx < 2 { mark.opposite() } else { mark };
                    board.place(cell_mark, square).unwrap();
                }
                for &square in line.iter() {
                    board.place(mark, square).unwrap();
                }
                assert_eq!(
                    board.termination_reason(),
                    Some(FinishedReason::victory(mark)),
                    "{board:?}"
                );
            }
        }
    }
}

#[test]
fn win_on_full_board_is_not_a_tie() {
    let board = parse_board("
        x o x
        o x o
        o x x
    ").unwrap();
    assert!(board.is_full());
    assert_eq!(board.termination_reason(), Some(FinishedReason::XWon));
}

#[test]
fn occupied_square_is_rejected() {
    let mut board = parse_board("
        . . .
        . x .
        . . .
    ").unwrap();
    let before = board;
    assert_eq!(board.place(Mark::O, 4), Err(TurnError::SquareOccupied));
    assert_eq!(board.place(Mark::X, 4), Err(TurnError::SquareOccupied));
    assert_eq!(board, before);
}

#[test]
fn out_of_range_square_is_rejected() {
    let mut board = Board::new();
    assert_eq!(board.place(Mark::X, 9), Err(TurnError::SquareOutOfRange));
    assert_eq!(board.place(Mark::X, Square::MAX), Err(TurnError::SquareOutOfRange));
    assert_eq!(board, Board::new());
    assert!(!board.has_piece(9));
}

#[test]
fn game_enforces_alternation() {
    let mut game = Game::new(Mark::O);
    assert_eq!(game.try_place(Mark::O, 0), Err(TurnError::WrongTurn));
    game.try_place(Mark::X, 0).unwrap();
    assert_eq!(game.try_place(Mark::X, 1), Err(TurnError::WrongTurn));
    assert_eq!(game.try_place(Mark::O, 0), Err(TurnError::SquareOccupied));
    // Rejected placement does not pass the turn.
    assert_eq!(game.active_mark(), Mark::O);
    game.try_place(Mark::O, 1).unwrap();
    assert_eq!(game.active_mark(), Mark::X);
}

#[test]
fn game_freezes_after_win() {
    let mut game = Game::new(Mark::X);
    for (mark, square) in [(Mark::X, 0), (Mark::O, 3), (Mark::X, 1), (Mark::O, 4), (Mark::X, 2)] {
        game.try_place(mark, square).unwrap();
    }
    assert_eq!(game.status(), GameStatus::Over(GameEndReason::Finished(FinishedReason::XWon)));
    let board_before = *game.board();
    assert_eq!(game.try_place(Mark::O, 5), Err(TurnError::GameOver));
    assert_eq!(*game.board(), board_before);
}
