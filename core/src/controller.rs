use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::mem;

use crate::protocol::{
    ChatPost, ClientEvent, FlipNotice, GameOver, GameStarted, JoinRequest, MatchCheck, MatchResult,
    ServerEvent,
};
use crate::*;

/// Something the local player did on the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UserAction {
    CreateGame { username: String },
    JoinGame { username: String, code: String },
    StartGame,
    SendChat { message: String },
    ClickCard(CardIndex),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    User(UserAction),
    Server(ServerEvent),
}

impl From<UserAction> for Input {
    fn from(action: UserAction) -> Self {
        Self::User(action)
    }
}

impl From<ServerEvent> for Input {
    fn from(event: ServerEvent) -> Self {
        Self::Server(event)
    }
}

/// Work the host has to carry out on the controller's behalf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Send(ClientEvent),
    /// Blocking message box.
    Alert(String),
    Reload,
    /// Call [`Controller::tick`] at or after this instant.
    WakeAt(Timestamp),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Setup,
    Lobby,
    Playing,
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Deferred {
    SendMatchCheck(CardPair),
    RevertPair(CardPair),
    ReleaseStuckLock(CardPair),
    FinishGame,
}

/// Client side of one game: every user action and server event goes
/// through [`Controller::handle`], delayed work comes back through
/// [`Controller::tick`].
#[derive(Clone, Debug)]
pub struct Controller {
    config: ClientConfig,
    username: String,
    pending_code: Option<String>,
    session: Option<Session>,
    scheduler: Scheduler<Deferred>,
    lock_watchdog: Option<TaskToken>,
    outcome: Option<GameOver>,
    armed_wake: Option<Timestamp>,
    effects: Vec<Effect>,
}

impl Controller {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            username: String::new(),
            pending_code: None,
            session: None,
            scheduler: Scheduler::new(),
            lock_watchdog: None,
            outcome: None,
            armed_wake: None,
            effects: Vec::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn outcome(&self) -> Option<&GameOver> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn screen(&self) -> Screen {
        match (&self.outcome, &self.session) {
            (Some(_), _) => Screen::Finished,
            (None, None) => Screen::Setup,
            (None, Some(session)) if session.has_started() => Screen::Playing,
            (None, Some(_)) => Screen::Lobby,
        }
    }

    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.scheduler.next_deadline()
    }

    pub fn handle(&mut self, now: Timestamp, input: Input) -> Vec<Effect> {
        if self.is_finished() {
            log::debug!("game over, ignoring {:?}", input);
            return Vec::new();
        }

        match input {
            Input::User(action) => self.on_user_action(now, action),
            Input::Server(event) => self.on_server_event(now, event),
        }
        self.take_effects()
    }

    /// Runs every deferred task that is due at `now`.
    pub fn tick(&mut self, now: Timestamp) -> Vec<Effect> {
        self.armed_wake = None;
        while let Some((_, task)) = self.scheduler.pop_due(now) {
            self.run_deferred(now, task);
        }
        self.take_effects()
    }

    fn on_user_action(&mut self, now: Timestamp, action: UserAction) {
        use UserAction::*;
        match action {
            CreateGame { username } => self.create_game(&username),
            JoinGame { username, code } => self.join_game(&username, &code),
            StartGame => self.start_game(),
            SendChat { message } => self.send_chat(&message),
            ClickCard(index) => self.click_card(now, index),
        }
    }

    fn create_game(&mut self, username: &str) {
        if self.session.is_some() {
            log::trace!("already in a room");
            return;
        }
        let username = username.trim();
        if username.is_empty() {
            self.alert("Please enter a name!");
            return;
        }
        self.username = username.to_string();
        self.send(ClientEvent::CreateGame(self.username.clone()));
    }

    fn join_game(&mut self, username: &str, code: &str) {
        if self.session.is_some() {
            log::trace!("already in a room");
            return;
        }
        let username = username.trim();
        let code = code.trim().to_uppercase();
        if username.is_empty() || code.is_empty() {
            self.alert("Enter name & room code!");
            return;
        }
        self.username = username.to_string();
        self.pending_code = Some(code.clone());
        self.send(ClientEvent::JoinGame(JoinRequest {
            username: self.username.clone(),
            code,
        }));
    }

    fn start_game(&mut self) {
        let room_code = match &self.session {
            Some(session) if session.room().is_creator() && !session.has_started() => {
                session.room().code().to_string()
            }
            _ => {
                log::trace!("start ignored: not the creator of a waiting room");
                return;
            }
        };
        self.send(ClientEvent::StartGame(room_code));
    }

    fn send_chat(&mut self, message: &str) {
        let message = message.trim();
        let Some(session) = &self.session else {
            return;
        };
        if message.is_empty() {
            return;
        }
        let post = ChatPost {
            room_code: session.room().code().to_string(),
            message: message.to_string(),
        };
        self.send(ClientEvent::ChatMessage(post));
    }

    fn click_card(&mut self, now: Timestamp, index: CardIndex) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let outcome = session.pick(index);
        let room_code = session.room().code().to_string();

        match outcome {
            ClickOutcome::Rejected(reason) => {
                log::trace!("click on {} ignored: {:?}", index, reason);
            }
            ClickOutcome::FirstPicked(index) => {
                log::debug!("first card: {}", index);
                self.send(ClientEvent::FlipCard(FlipNotice { index, room_code }));
            }
            ClickOutcome::PairPicked(pair) => {
                log::debug!("pair picked: {:?}, board locked", pair);
                self.send(ClientEvent::FlipCard(FlipNotice {
                    index: pair[1],
                    room_code,
                }));
                self.scheduler
                    .schedule(now + self.config.check_delay, Deferred::SendMatchCheck(pair));
            }
        }
    }

    fn on_server_event(&mut self, now: Timestamp, event: ServerEvent) {
        use ServerEvent::*;
        match event {
            RoomCreated(created) => {
                log::debug!("room created: {}", created.code);
                self.pending_code = None;
                let room = Room::new(created.code, created.is_creator, vec![self.username.clone()]);
                self.session = Some(Session::new(room));
            }
            PlayerJoined(joined) => self.enter_room().set_players(joined.players),
            PlayerLeft(left) => {
                log::debug!("player left: {}", left.username);
                if let Some(session) = self.session.as_mut() {
                    session.set_players(left.players);
                }
            }
            JoinError(notice) => {
                self.pending_code = None;
                self.alert(&notice.message);
            }
            StartError(notice) => self.alert(&notice.message),
            StartGame(started) => self.on_start(now, &started),
            UpdateBoard(update) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                if let Err(err) = session.apply_board_update(&update) {
                    log::warn!("dropping update_board: {}", err);
                }
            }
            MatchResult(result) => self.on_match_result(now, result),
            ChatMessage(line) => {
                if let Some(session) = self.session.as_mut() {
                    session.push_chat(line, &self.username);
                }
            }
            TurnUpdate(turn) => {
                if let Some(session) = self.session.as_mut() {
                    session.assign_turn(now, &turn, &self.username);
                }
            }
            TimerReset => {
                if let Some(session) = self.session.as_mut() {
                    session.reset_timer(now);
                }
            }
            GameOver(over) => self.on_game_over(now, over),
        }
    }

    /// Joiners learn about their room from the first `player_joined`.
    fn enter_room(&mut self) -> &mut Session {
        let code = self.pending_code.take().unwrap_or_default();
        let username = self.username.clone();
        self.session
            .get_or_insert_with(|| Session::new(Room::new(code, false, vec![username])))
    }

    fn on_start(&mut self, now: Timestamp, started: &GameStarted) {
        let Some(session) = self.session.as_mut() else {
            log::warn!("dropping start_game: not in a room");
            return;
        };
        match session.start(now, started, &self.username) {
            Ok(()) => {
                self.scheduler.clear();
                self.lock_watchdog = None;
            }
            Err(err) => log::warn!("dropping start_game: {}", err),
        }
    }

    fn on_match_result(&mut self, now: Timestamp, result: MatchResult) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let pair = result.indices;

        if result.is_match {
            if let Err(err) = session.apply_match(pair) {
                log::warn!("match_result {:?} not applied: {}", pair, err);
            }
        } else {
            session.apply_mismatch(pair);
            self.scheduler
                .schedule(now + self.config.revert_delay, Deferred::RevertPair(pair));
        }

        session.replace_scores(result.scores);
        session.assign_turn(now, &result.turn, &self.username);

        if let Some(token) = self.lock_watchdog.take() {
            self.scheduler.cancel(token);
        }
    }

    fn on_game_over(&mut self, now: Timestamp, over: GameOver) {
        log::debug!("game over, winner: {}", over.winner);
        self.scheduler.clear();
        self.lock_watchdog = None;
        if let Some(session) = self.session.as_mut() {
            session.stop_timer(now);
        }
        self.outcome = Some(over);
        self.scheduler
            .schedule(now + self.config.game_over_delay, Deferred::FinishGame);
    }

    fn run_deferred(&mut self, now: Timestamp, task: Deferred) {
        match task {
            Deferred::SendMatchCheck(pair) => {
                let Some(session) = &self.session else {
                    return;
                };
                let room_code = session.room().code().to_string();
                log::debug!("requesting match check for {:?}", pair);
                self.send(ClientEvent::CheckMatch(MatchCheck {
                    indices: pair,
                    room_code,
                }));
                if let Some(timeout) = self.config.lock_timeout {
                    let token = self
                        .scheduler
                        .schedule(now + timeout, Deferred::ReleaseStuckLock(pair));
                    self.lock_watchdog = Some(token);
                }
            }
            Deferred::RevertPair(pair) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                if let Err(err) = session.revert_pair(pair) {
                    log::warn!("could not turn {:?} back: {}", pair, err);
                }
            }
            Deferred::ReleaseStuckLock(pair) => {
                self.lock_watchdog = None;
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                if session.release_stuck(pair) {
                    log::warn!("no match_result for {:?}, unlocking the board", pair);
                }
            }
            Deferred::FinishGame => {
                if let Some(over) = &self.outcome {
                    let message = format!(
                        "🏁 Game Over!\nWinner: {}\n\nScores:\n{}",
                        over.winner, over.scores
                    );
                    self.effects.push(Effect::Alert(message));
                }
                self.effects.push(Effect::Reload);
                self.session = None;
            }
        }
    }

    fn send(&mut self, event: ClientEvent) {
        self.effects.push(Effect::Send(event));
    }

    fn alert(&mut self, message: &str) {
        self.effects.push(Effect::Alert(message.to_string()));
    }

    fn take_effects(&mut self) -> Vec<Effect> {
        let next = self.scheduler.next_deadline();
        if next != self.armed_wake {
            if let Some(deadline) = next {
                self.effects.push(Effect::WakeAt(deadline));
            }
            self.armed_wake = next;
        }
        mem::take(&mut self.effects)
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
