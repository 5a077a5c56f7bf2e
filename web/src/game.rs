use crate::socket::SocketClient;
use crate::utils::*;
use chrono::prelude::*;
use chrono::TimeDelta;
use clap::Args;
use concentration_core as game;
use game::protocol::{ClientEvent, ServerEvent};
use game::{CardIndex, ClientConfig, Controller, Effect, Screen, UserAction};
use gloo::timers::callback::{Interval, Timeout};
use yew::prelude::*;

#[derive(Clone, Debug, PartialEq)]
enum ViewCard {
    Hidden,
    Revealed(AttrValue),
    Matched(AttrValue),
}

impl ViewCard {
    fn of(card: &game::Card) -> Self {
        let symbol = || AttrValue::from(card.symbol().to_string());
        match card.face() {
            game::CardFace::FaceDown => Self::Hidden,
            game::CardFace::FaceUp => Self::Revealed(symbol()),
            game::CardFace::Matched => Self::Matched(symbol()),
        }
    }
}

fn turn_text(session: &game::Session) -> String {
    match session.turn() {
        _ if session.is_my_turn() => "Your Turn ⏳".to_string(),
        Some(player) => format!("{}'s Turn", player),
        None => String::new(),
    }
}

pub(crate) enum Msg {
    Server(ServerEvent),
    User(UserAction),
    Wake,
    UpdateTime,
    EditUsername(String),
    EditRoomCode(String),
    EditChat(String),
    SubmitChat,
}

#[derive(Properties, Clone, PartialEq)]
struct CardProps {
    index: CardIndex,
    card: ViewCard,
    #[prop_or_default]
    playable: bool,
    callback: Callback<CardIndex>,
}

#[function_component(CardView)]
fn card_component(props: &CardProps) -> Html {
    let CardProps {
        index,
        card,
        playable,
        callback,
    } = props.clone();

    let (class, symbol) = match card {
        ViewCard::Hidden => (classes!("card"), None),
        ViewCard::Revealed(symbol) => (classes!("card", "flipped"), Some(symbol)),
        ViewCard::Matched(symbol) => (classes!("card", "flipped", "matched"), Some(symbol)),
    };
    let class = classes!(class, playable.then_some("playable"));

    let onclick = Callback::from(move |_: MouseEvent| {
        log::trace!("card click: {}", index);
        callback.emit(index);
    });

    html! {
        <div {class} {onclick} data-index={index.to_string()}>
            if let Some(symbol) = symbol {
                <span class="symbol">{symbol}</span>
            }
        </div>
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Game server origin, like ws://localhost:5000 (defaults to this page's host)
    #[arg(long)]
    server: Option<String>,

    /// Unlock the board when a match check gets no answer within this many milliseconds
    #[arg(long)]
    lock_timeout_ms: Option<u32>,
}

impl GameProps {
    fn client_config(&self) -> ClientConfig {
        let lock_timeout = self
            .lock_timeout_ms
            .map(|millis| TimeDelta::milliseconds(millis.into()));
        ClientConfig::default().with_lock_timeout(lock_timeout)
    }
}

pub(crate) struct GameView {
    controller: Controller,
    socket: Option<SocketClient>,
    username: String,
    room_code: String,
    chat_draft: String,
    prev_time: u32,
    chat_box: NodeRef,
    wake_timer: Option<Timeout>,
    _timer_interval: Interval,
}

impl GameView {
    fn create_timer(ctx: &Context<Self>) -> Interval {
        let link = ctx.link().clone();
        Interval::new(500, move || link.send_message(Msg::UpdateTime))
    }

    fn open_socket(ctx: &Context<Self>) -> Option<SocketClient> {
        let on_event = ctx.link().callback(Msg::Server);
        let opened = socket_url(ctx.props().server.as_deref())
            .and_then(|url| SocketClient::connect(&url, on_event));
        match opened {
            Ok(socket) => Some(socket),
            Err(err) => {
                log::error!("could not reach the game server: {:#}", err);
                None
            }
        }
    }

    fn get_time(&self) -> u32 {
        self.controller
            .session()
            .map_or(0, |session| session.elapsed_secs(utc_now()))
    }

    fn send(&self, event: &ClientEvent) {
        let Some(socket) = self.socket.as_ref() else {
            log::warn!("not connected, dropping {}", event.name());
            return;
        };
        if let Err(err) = socket.send(event) {
            log::error!("failed to send {}: {:#}", event.name(), err);
        }
    }

    fn run_effects(&mut self, ctx: &Context<Self>, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(event) => self.send(&event),
                Effect::Alert(message) => gloo::dialogs::alert(&message),
                Effect::Reload => {
                    if let Err(err) = gloo::utils::window().location().reload() {
                        log::error!("reload failed: {:?}", err);
                    }
                }
                Effect::WakeAt(deadline) => {
                    let delay = millis_until(deadline, utc_now());
                    log::trace!("wake in {}ms", delay);
                    let link = ctx.link().clone();
                    self.wake_timer = Some(Timeout::new(delay, move || link.send_message(Msg::Wake)));
                }
            }
        }
    }

    fn view_setup(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let username = self.username.clone();
        let cb_create = ctx.link().callback(move |_: MouseEvent| {
            User(UserAction::CreateGame {
                username: username.clone(),
            })
        });
        let (username, code) = (self.username.clone(), self.room_code.clone());
        let cb_join = ctx.link().callback(move |_: MouseEvent| {
            User(UserAction::JoinGame {
                username: username.clone(),
                code: code.clone(),
            })
        });

        html! {
            <div id="player-setup">
                <input
                    id="username"
                    placeholder="Your name"
                    value={self.username.clone()}
                    oninput={ctx.link().callback(|e: InputEvent| EditUsername(input_value(&e)))}
                />
                <button id="create-btn" onclick={cb_create}>{"Create Game"}</button>
                <input
                    id="room-code-input"
                    placeholder="Room code"
                    value={self.room_code.clone()}
                    oninput={ctx.link().callback(|e: InputEvent| EditRoomCode(input_value(&e)))}
                />
                <button id="join-btn" onclick={cb_join}>{"Join Game"}</button>
            </div>
        }
    }

    fn view_lobby(&self, ctx: &Context<Self>, session: &game::Session) -> Html {
        let room = session.room();
        let cb_start = ctx.link().callback(|_: MouseEvent| Msg::User(UserAction::StartGame));

        html! {
            <div id="room-info">
                <p>{"Room code: "}<b id="room-code-display">{room.code()}</b></p>
                <div id="player-list">
                    <b>{"Players in room:"}</b>{" "}{room.players().join(", ")}
                </div>
                <p id="waiting-message">{room.waiting_message()}</p>
                if room.can_start() {
                    <button id="start-game-btn" onclick={cb_start}>{"Start Game"}</button>
                }
                {self.view_chat(ctx, session)}
            </div>
        }
    }

    fn view_game(&self, ctx: &Context<Self>, session: &game::Session) -> Html {
        let finished = self.controller.is_finished();
        let board = session.board().map(|board| board.cards()).unwrap_or_default();
        let class = classes!("board", session.is_locked().then_some("locked"));

        html! {
            <div id="game-area">
                <div id="turn">{turn_text(session)}</div>
                <div id="timer">{"Time: "}<span id="timer-value">{self.get_time().to_string()}</span>{"s"}</div>
                <div id="scores">
                    <b>{"Scores:"}</b>
                    {
                        for session.scores().iter().map(|(player, score)| html! {
                            <div class="score">{format!("{}: {}", player, score)}</div>
                        })
                    }
                </div>
                <div id="board" {class}>
                    {
                        for board.iter().enumerate().map(|(i, card)| {
                            let index = i as CardIndex;
                            let card_view = ViewCard::of(card);
                            let playable = !finished && session.can_pick(index);
                            let callback = ctx.link().callback(|index| Msg::User(UserAction::ClickCard(index)));
                            html! {
                                <CardView {index} card={card_view} {playable} {callback}/>
                            }
                        })
                    }
                </div>
                if let Some(outcome) = self.controller.outcome() {
                    <div class="game-over">{format!("🏁 Winner: {}", outcome.winner)}</div>
                }
                {self.view_chat(ctx, session)}
            </div>
        }
    }

    fn view_chat(&self, ctx: &Context<Self>, session: &game::Session) -> Html {
        use Msg::*;

        let cb_keydown = ctx
            .link()
            .batch_callback(|e: KeyboardEvent| (e.key() == "Enter").then_some(SubmitChat));

        html! {
            <div id="chat">
                <div id="chat-box" ref={self.chat_box.clone()}>
                    {
                        for session.chat().iter().map(|entry| html! {
                            <div class={classes!("chat-message", if entry.is_self { "self" } else { "other" })}>
                                <div class="chat-bubble">
                                    <b>{format!("{}:", entry.username)}</b>{" "}{entry.message.clone()}
                                </div>
                            </div>
                        })
                    }
                </div>
                <input
                    id="chat-input"
                    placeholder="Say something"
                    value={self.chat_draft.clone()}
                    oninput={ctx.link().callback(|e: InputEvent| EditChat(input_value(&e)))}
                    onkeydown={cb_keydown}
                />
                <button id="send-chat" onclick={ctx.link().callback(|_: MouseEvent| SubmitChat)}>{"Send"}</button>
            </div>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            controller: Controller::new(ctx.props().client_config()),
            socket: GameView::open_socket(ctx),
            username: String::new(),
            room_code: String::new(),
            chat_draft: String::new(),
            prev_time: 0,
            chat_box: NodeRef::default(),
            wake_timer: None,
            _timer_interval: GameView::create_timer(ctx),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Server(event) => {
                log::debug!("server event: {}", event.name());
                let effects = self.controller.handle(utc_now(), event.into());
                self.run_effects(ctx, effects);
                true
            }
            User(action) => {
                log::debug!("user action: {:?}", action);
                let effects = self.controller.handle(utc_now(), action.into());
                self.run_effects(ctx, effects);
                true
            }
            SubmitChat => {
                let action = UserAction::SendChat {
                    message: self.chat_draft.clone(),
                };
                let effects = self.controller.handle(utc_now(), action.into());
                let posted = effects
                    .iter()
                    .any(|effect| matches!(effect, Effect::Send(ClientEvent::ChatMessage(_))));
                if posted {
                    self.chat_draft.clear();
                }
                self.run_effects(ctx, effects);
                true
            }
            Wake => {
                self.wake_timer = None;
                let effects = self.controller.tick(utc_now());
                self.run_effects(ctx, effects);
                true
            }
            UpdateTime => {
                let time = self.get_time();
                if self.prev_time != time {
                    self.prev_time = time;
                    true
                } else {
                    false
                }
            }
            EditUsername(value) => {
                self.username = value;
                true
            }
            EditRoomCode(value) => {
                self.room_code = value;
                true
            }
            EditChat(value) => {
                self.chat_draft = value;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let content = match (self.controller.screen(), self.controller.session()) {
            (Screen::Lobby, Some(session)) => self.view_lobby(ctx, session),
            (Screen::Playing | Screen::Finished, Some(session)) => self.view_game(ctx, session),
            _ => self.view_setup(ctx),
        };

        html! {
            <div class="concentration">
                {content}
            </div>
        }
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        if let Some(chat_box) = self.chat_box.cast::<web_sys::Element>() {
            chat_box.set_scroll_top(chat_box.scroll_height());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(millis).unwrap()
    }

    fn server(controller: &mut Controller, millis: i64, frame: &str) {
        let event = ServerEvent::from_json(frame).unwrap();
        controller.handle(at(millis), event.into());
    }

    fn started(turn: &str) -> Controller {
        let mut controller = Controller::new(ClientConfig::default());
        controller.handle(
            at(0),
            UserAction::CreateGame {
                username: "ana".into(),
            }
            .into(),
        );
        server(&mut controller, 1, r#"["room_created",{"code":"QZ12","is_creator":true}]"#);
        server(&mut controller, 2, r#"["player_joined",{"players":["ana","bo"]}]"#);
        server(
            &mut controller,
            3,
            &format!(
                r#"["start_game",{{"cards":["X","Y","X","Y"],"flipped":[false,false,false,false],"scores":{{"ana":0,"bo":0}},"turn":"{}"}}]"#,
                turn
            ),
        );
        controller
    }

    #[test]
    fn turn_banner_names_the_active_player() {
        let mine = started("ana");
        assert_eq!(turn_text(mine.session().unwrap()), "Your Turn ⏳");

        let theirs = started("bo");
        assert_eq!(turn_text(theirs.session().unwrap()), "bo's Turn");
    }

    #[test]
    fn render_adapter_maps_card_faces() {
        let mut controller = started("bo");
        server(&mut controller, 10, r#"["update_board",{"cards":["X","Y","X","Y"],"flipped":[1]}]"#);
        server(
            &mut controller,
            20,
            r#"["match_result",{"match":true,"indices":[0,2],"scores":{"ana":0,"bo":1},"turn":"bo"}]"#,
        );

        let cards: Vec<_> = controller
            .session()
            .unwrap()
            .board()
            .unwrap()
            .cards()
            .iter()
            .map(ViewCard::of)
            .collect();
        assert_eq!(
            cards,
            [
                ViewCard::Matched("X".into()),
                ViewCard::Revealed("Y".into()),
                ViewCard::Matched("X".into()),
                ViewCard::Hidden,
            ]
        );
    }

    #[test]
    fn lock_timeout_comes_from_args() {
        let props = GameProps {
            server: None,
            lock_timeout_ms: Some(3_000),
        };
        assert_eq!(
            props.client_config().lock_timeout,
            Some(TimeDelta::milliseconds(3_000))
        );

        let props = GameProps {
            server: None,
            lock_timeout_ms: None,
        };
        assert_eq!(props.client_config(), ClientConfig::default());
    }
}
