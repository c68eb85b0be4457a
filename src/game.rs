use enum_map::{EnumMap, enum_map};
use serde::{Deserialize, Serialize};

use crate::board::{Board, FinishedReason, Square, TurnError};
use crate::mark::Mark;
use crate::role::Role;


// A reason for a game to stop outside the normal flow of placements.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum InterruptedReason {
    #[serde(rename = "resigned-by-x")]
    XResigned,
    #[serde(rename = "resigned-by-o")]
    OResigned,
    #[serde(rename = "aborted")]
    Aborted,
}

impl InterruptedReason {
    pub fn resignation(mark: Mark) -> Self {
        match mark {
            Mark::X => InterruptedReason::XResigned,
            Mark::O => InterruptedReason::OResigned,
        }
    }
}

// Serialized as a bare string, e.g. "x-won" or "aborted".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GameEndReason {
    Finished(FinishedReason),
    Interrupted(InterruptedReason),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GameStatus {
    Active,
    Over(GameEndReason),
}

impl GameStatus {
    pub fn is_active(self) -> bool { self == GameStatus::Active }
    pub fn end_reason(self) -> Option<GameEndReason> {
        match self {
            GameStatus::Active => None,
            GameStatus::Over(reason) => Some(reason),
        }
    }
}

// One game instance. Unlike `Board`, it knows whose turn it is and stops accepting placements once
// the game is over.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    active_mark: Mark,
    starting_mark: Mark,
    host_mark: Mark,
    status: GameStatus,
}

impl Game {
    // X always moves first, no matter which role plays it.
    pub const STARTING_MARK: Mark = Mark::X;

    pub fn new(host_mark: Mark) -> Self {
        Game {
            board: Board::new(),
            active_mark: Self::STARTING_MARK,
            starting_mark: Self::STARTING_MARK,
            host_mark,
            status: GameStatus::Active,
        }
    }

    pub fn board(&self) -> &Board { &self.board }
    pub fn active_mark(&self) -> Mark { self.active_mark }
    pub fn starting_mark(&self) -> Mark { self.starting_mark }
    pub fn host_mark(&self) -> Mark { self.host_mark }
    pub fn status(&self) -> GameStatus { self.status }
    pub fn is_over(&self) -> bool { !self.status.is_active() }

    pub fn marks(&self) -> EnumMap<Role, Option<Mark>> {
        enum_map! {
            Role::Host => Some(self.host_mark),
            Role::Guest => Some(self.host_mark.opposite()),
            Role::Spectator => None,
        }
    }

    pub fn mark_of(&self, role: Role) -> Option<Mark> { self.marks()[role] }

    pub fn try_place(&mut self, mark: Mark, square: Square) -> Result<(), TurnError> {
        if self.is_over() {
            return Err(TurnError::GameOver);
        }
        if mark != self.active_mark {
            return Err(TurnError::WrongTurn);
        }
        self.board.place(mark, square)?;
        self.active_mark = mark.opposite();
        if let Some(reason) = self.board.termination_reason() {
            self.status = GameStatus::Over(GameEndReason::Finished(reason));
        }
        Ok(())
    }

    pub fn interrupt(&mut self, reason: InterruptedReason) -> Result<(), TurnError> {
        if self.is_over() {
            return Err(TurnError::GameOver);
        }
        self.status = GameStatus::Over(GameEndReason::Interrupted(reason));
        Ok(())
    }
}
