use alloc::string::String;
use alloc::vec::Vec;

use crate::protocol::{BoardUpdate, ChatLine, GameStarted, Scoreboard};
use crate::*;

/// Minimum players the server needs before a game can start.
pub const MIN_PLAYERS: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Room {
    code: String,
    is_creator: bool,
    players: Vec<String>,
}

impl Room {
    pub fn new(code: String, is_creator: bool, players: Vec<String>) -> Self {
        Self {
            code,
            is_creator,
            players,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn is_creator(&self) -> bool {
        self.is_creator
    }

    /// Names in join order.
    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn has_enough_players(&self) -> bool {
        self.players.len() >= MIN_PLAYERS
    }

    /// Whether this client should be offered the start button.
    pub fn can_start(&self) -> bool {
        self.is_creator && self.has_enough_players()
    }

    pub fn waiting_message(&self) -> &'static str {
        if self.has_enough_players() {
            "Ready to start!"
        } else {
            "Need at least 2 players."
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatEntry {
    pub username: String,
    pub message: String,
    /// Sent by the local player.
    pub is_self: bool,
}

/// Everything the client knows about the room it is in.
///
/// Built when the client enters a room and dropped at game over.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    room: Room,
    board: Option<Board>,
    scores: Scoreboard,
    turn: Option<String>,
    my_turn: bool,
    flip: FlipState,
    timer: TurnTimer,
    chat: Vec<ChatEntry>,
}

impl Session {
    pub fn new(room: Room) -> Self {
        Self {
            room,
            board: None,
            scores: Scoreboard::new(),
            turn: None,
            my_turn: false,
            flip: FlipState::Idle,
            timer: TurnTimer::default(),
            chat: Vec::new(),
        }
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn board(&self) -> Option<&Board> {
        self.board.as_ref()
    }

    pub fn has_started(&self) -> bool {
        self.board.is_some()
    }

    pub fn scores(&self) -> &Scoreboard {
        &self.scores
    }

    pub fn turn(&self) -> Option<&str> {
        self.turn.as_deref()
    }

    pub fn is_my_turn(&self) -> bool {
        self.my_turn
    }

    pub fn flip_state(&self) -> FlipState {
        self.flip
    }

    pub fn is_locked(&self) -> bool {
        self.flip.is_locked()
    }

    pub fn elapsed_secs(&self, now: Timestamp) -> u32 {
        self.timer.elapsed_secs(now)
    }

    pub fn chat(&self) -> &[ChatEntry] {
        &self.chat
    }

    /// Whether a click on `index` would currently be accepted.
    pub fn can_pick(&self, index: CardIndex) -> bool {
        self.board
            .as_ref()
            .is_some_and(|board| self.flip.check_eligible(board, self.my_turn, index).is_ok())
    }

    pub(crate) fn set_players(&mut self, players: Vec<String>) {
        self.room.players = players;
    }

    /// Deals the board and starts the first turn with an unlocked board.
    pub(crate) fn start(&mut self, now: Timestamp, started: &GameStarted, username: &str) -> Result<()> {
        let board = Board::deal(&started.cards, &started.flipped)?;
        log::debug!("dealt {} cards", board.len());
        self.board = Some(board);
        self.flip = FlipState::Idle;
        if !started.players.is_empty() {
            self.room.players = started.players.clone();
        }
        self.scores = started.scores.clone();
        self.assign_turn(now, &started.turn, username);
        Ok(())
    }

    /// A mask can turn our first pick back down; the pick is dropped then.
    pub(crate) fn apply_board_update(&mut self, update: &BoardUpdate) -> Result<UpdateOutcome> {
        let board = self.board.as_mut().ok_or(GameError::NotDealt)?;
        let outcome = board.apply_update(&update.cards, &update.flipped)?;
        if self.flip.forget_lowered(board) {
            log::debug!("first pick turned down by the server");
        }
        Ok(outcome)
    }

    pub(crate) fn pick(&mut self, index: CardIndex) -> ClickOutcome {
        match self.board.as_mut() {
            Some(board) => self.flip.pick(board, self.my_turn, index),
            None => ClickOutcome::Rejected(Rejection::NotDealt),
        }
    }

    /// Marks a matched pair and releases the lock if it was ours. The lock
    /// is released even when the pair does not fit the board.
    pub(crate) fn apply_match(&mut self, pair: CardPair) -> Result<UpdateOutcome> {
        self.flip.resolve(pair, true);
        let board = self.board.as_mut().ok_or(GameError::NotDealt)?;
        board.mark_matched(pair)
    }

    /// Records a mismatch; the pair stays up until [`Self::revert_pair`].
    pub(crate) fn apply_mismatch(&mut self, pair: CardPair) -> bool {
        self.flip.resolve(pair, false)
    }

    pub(crate) fn revert_pair(&mut self, pair: CardPair) -> Result<UpdateOutcome> {
        let board = self.board.as_mut().ok_or(GameError::NotDealt)?;
        let outcome = board.revert(pair);
        self.flip.finish_revert(pair);
        outcome
    }

    /// Turns an unanswered pair back down and unlocks. Does nothing if
    /// the pair has been adjudicated meanwhile.
    pub(crate) fn release_stuck(&mut self, pair: CardPair) -> bool {
        if !self.flip.release_stuck(pair) {
            return false;
        }
        if let Some(board) = self.board.as_mut() {
            let _ = board.revert(pair);
        }
        true
    }

    pub(crate) fn replace_scores(&mut self, scores: Scoreboard) {
        self.scores = scores;
    }

    /// Every turn assignment starts a fresh turn: the local timer restarts
    /// from zero when the turn is ours and stops otherwise. The flip state
    /// is left alone.
    pub(crate) fn assign_turn(&mut self, now: Timestamp, turn: &str, username: &str) {
        self.my_turn = turn == username;
        self.turn = Some(turn.into());
        if self.my_turn {
            self.timer.restart(now);
        } else {
            self.timer.stop(now);
        }
        log::debug!("turn: {} (mine: {})", turn, self.my_turn);
    }

    pub(crate) fn reset_timer(&mut self, now: Timestamp) {
        self.timer.reset(now);
    }

    pub(crate) fn stop_timer(&mut self, now: Timestamp) {
        self.timer.stop(now);
    }

    pub(crate) fn push_chat(&mut self, line: ChatLine, username: &str) {
        let is_self = line.username == username;
        self.chat.push(ChatEntry {
            username: line.username,
            message: line.message,
            is_self,
        });
    }
}
