use chrono::{DateTime, Utc};
use concentration_core::protocol::{ClientEvent, MatchCheck, Packet, ServerEvent, SocketPacket};
use concentration_core::{CardFace, ClientConfig, Controller, Effect, Input, Screen, UserAction};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_test::wasm_bindgen_test as test;

fn at(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap()
}

/// Decodes a raw `42[...]` frame the way the browser host does.
fn frame(raw: &str) -> Input {
    let Packet::Message(SocketPacket::Event(array)) = Packet::decode(raw).unwrap() else {
        panic!("not an event frame: {}", raw);
    };
    Input::Server(ServerEvent::from_value(array).unwrap())
}

fn outbound(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Send(event) => Some(Packet::event(event).unwrap().encode().unwrap()),
            _ => None,
        })
        .collect()
}

#[test]
fn two_players_match_a_pair() {
    let mut p1 = Controller::new(ClientConfig::default());

    let effects = p1.handle(
        at(0),
        Input::User(UserAction::CreateGame {
            username: "player1".into(),
        }),
    );
    assert_eq!(outbound(&effects), [r#"42["create_game","player1"]"#]);

    p1.handle(at(10), frame(r#"42["room_created",{"code":"ABCD","username":"player1","is_creator":true}]"#));
    assert_eq!(p1.screen(), Screen::Lobby);

    p1.handle(
        at(20),
        frame(r#"42["player_joined",{"username":"player2","players":["player1","player2"],"is_creator":false}]"#),
    );
    assert!(p1.session().unwrap().room().can_start());

    let effects = p1.handle(at(30), Input::User(UserAction::StartGame));
    assert_eq!(outbound(&effects), [r#"42["start_game","ABCD"]"#]);

    p1.handle(
        at(40),
        frame(
            r#"42["start_game",{"cards":["A","B","A","B"],"flipped":[false,false,false,false],"scores":{"player1":0,"player2":0},"turn":"player1","players":["player1","player2"]}]"#,
        ),
    );
    assert_eq!(p1.screen(), Screen::Playing);
    assert!(p1.session().unwrap().is_my_turn());

    let effects = p1.handle(at(1_000), Input::User(UserAction::ClickCard(0)));
    assert_eq!(outbound(&effects), [r#"42["flip_card",{"index":0,"room_code":"ABCD"}]"#]);

    let effects = p1.handle(at(1_500), Input::User(UserAction::ClickCard(2)));
    assert_eq!(outbound(&effects), [r#"42["flip_card",{"index":2,"room_code":"ABCD"}]"#]);
    assert!(p1.session().unwrap().is_locked());
    assert!(effects.contains(&Effect::WakeAt(at(2_200))));

    // the server echoes both flips while the check is pending
    p1.handle(at(1_600), frame(r#"42["update_board",{"flipped":[0],"cards":["A","B","A","B"]}]"#));
    p1.handle(at(1_700), frame(r#"42["update_board",{"flipped":[2],"cards":["A","B","A","B"]}]"#));
    assert!(p1.session().unwrap().is_locked());

    let effects = p1.tick(at(2_200));
    assert_eq!(
        effects,
        [Effect::Send(ClientEvent::CheckMatch(MatchCheck {
            indices: [0, 2],
            room_code: "ABCD".into(),
        }))]
    );
    assert!(p1.session().unwrap().is_locked());

    p1.handle(
        at(2_300),
        frame(r#"42["match_result",{"match":true,"indices":[0,2],"scores":{"player1":1,"player2":0},"turn":"player1"}]"#),
    );
    p1.handle(at(2_310), frame(r#"42["turn_update","player1"]"#));
    p1.handle(at(2_320), frame(r#"42["timer_reset"]"#));

    let session = p1.session().unwrap();
    let board = session.board().unwrap();
    assert_eq!(board[0].face(), CardFace::Matched);
    assert_eq!(board[2].face(), CardFace::Matched);
    assert_eq!(board[0].visible_symbol(), Some("A"));
    assert!(!session.is_locked());
    assert_eq!(session.scores().get("player1"), Some(1));
    assert!(session.is_my_turn());

    let effects = p1.handle(at(2_400), Input::User(UserAction::ClickCard(2)));
    assert!(outbound(&effects).is_empty());
}

#[test]
fn mismatch_passes_turn_and_game_over_reloads() {
    let mut p2 = Controller::new(ClientConfig::default());

    p2.handle(
        at(0),
        Input::User(UserAction::JoinGame {
            username: "player2".into(),
            code: "abcd".into(),
        }),
    );
    p2.handle(at(10), frame(r#"42["player_joined",{"username":"player2","players":["player1","player2"],"is_creator":false}]"#));
    assert_eq!(p2.session().unwrap().room().code(), "ABCD");
    assert!(!p2.session().unwrap().room().can_start());

    p2.handle(
        at(20),
        frame(r#"42["start_game",{"cards":["","","",""],"flipped":[false,false,false,false],"scores":{"player1":0,"player2":0},"turn":"player1"}]"#),
    );
    assert!(!p2.session().unwrap().is_my_turn());

    // player1 misses with 0 and 1
    p2.handle(at(100), frame(r#"42["update_board",{"flipped":[0],"cards":["A","B","A","B"]}]"#));
    p2.handle(at(200), frame(r#"42["update_board",{"flipped":[1],"cards":["A","B","A","B"]}]"#));
    p2.handle(
        at(1_000),
        frame(r#"42["match_result",{"match":false,"indices":[0,1],"scores":{"player1":0,"player2":0},"turn":"player2"}]"#),
    );

    let session = p2.session().unwrap();
    assert!(session.is_my_turn());
    assert_eq!(session.board().unwrap().face_up_mask(), [true, true, false, false]);

    p2.tick(at(1_800));
    let session = p2.session().unwrap();
    assert_eq!(session.board().unwrap().face_up_mask(), [false; 4]);
    assert!(session.can_pick(0));

    let effects = p2.handle(
        at(5_000),
        frame(r#"42["game_over",{"winner":"player2","scores":{"player1":0,"player2":2}}]"#),
    );
    assert_eq!(effects, [Effect::WakeAt(at(5_500))]);

    let effects = p2.tick(at(5_500));
    assert_eq!(effects.last(), Some(&Effect::Reload));
    assert!(matches!(&effects[0], Effect::Alert(message) if message.contains("Winner: player2")));
}
