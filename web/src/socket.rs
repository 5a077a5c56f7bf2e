use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Context as _;
use concentration_core::protocol::{ClientEvent, Packet, ProtocolError, ServerEvent, SocketPacket};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, ErrorEvent, Event, MessageEvent, WebSocket};
use yew::Callback;

use crate::utils::js_error;

#[allow(dead_code)]
struct WsHandlers {
    onopen: Closure<dyn FnMut(Event)>,
    onmessage: Closure<dyn FnMut(MessageEvent)>,
    onerror: Closure<dyn FnMut(ErrorEvent)>,
    onclose: Closure<dyn FnMut(CloseEvent)>,
}

/// Frames queued before the server acknowledges the namespace connect.
#[derive(Default)]
struct Link {
    joined: Cell<bool>,
    outbox: RefCell<Vec<String>>,
}

/// Socket.IO client over a bare browser WebSocket.
pub(crate) struct SocketClient {
    ws: WebSocket,
    link: Rc<Link>,
    _handlers: WsHandlers,
}

impl SocketClient {
    pub(crate) fn connect(url: &str, on_event: Callback<ServerEvent>) -> anyhow::Result<Self> {
        let ws = WebSocket::new(url)
            .map_err(js_error)
            .with_context(|| format!("failed to open websocket {}", url))?;
        let link = Rc::new(Link::default());

        let onopen = {
            let url = url.to_string();
            Closure::wrap(Box::new(move |_event: Event| {
                log::info!("websocket connected to {}", url);
            }) as Box<dyn FnMut(Event)>)
        };
        let onmessage = {
            let ws = ws.clone();
            let link = link.clone();
            Closure::wrap(Box::new(move |event: MessageEvent| {
                let Some(frame) = event.data().as_string() else {
                    log::debug!("ignoring binary frame");
                    return;
                };
                match Packet::decode(&frame) {
                    Ok(packet) => on_packet(&ws, &link, &on_event, packet),
                    Err(err) => log::warn!("dropping frame: {}", err),
                }
            }) as Box<dyn FnMut(MessageEvent)>)
        };
        let onerror = {
            let url = url.to_string();
            Closure::wrap(Box::new(move |_event: ErrorEvent| {
                log::warn!("websocket error on {}", url);
            }) as Box<dyn FnMut(ErrorEvent)>)
        };
        let onclose = {
            let link = link.clone();
            Closure::wrap(Box::new(move |event: CloseEvent| {
                link.joined.set(false);
                if event.reason().is_empty() {
                    log::warn!("websocket closed ({})", event.code());
                } else {
                    log::warn!("websocket closed ({}): {}", event.code(), event.reason());
                }
            }) as Box<dyn FnMut(CloseEvent)>)
        };

        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        Ok(Self {
            ws,
            link,
            _handlers: WsHandlers {
                onopen,
                onmessage,
                onerror,
                onclose,
            },
        })
    }

    /// Sends right away once joined, otherwise queues until the connect ack.
    pub(crate) fn send(&self, event: &ClientEvent) -> anyhow::Result<()> {
        let frame = Packet::event(event)?.encode()?;
        if self.link.joined.get() {
            log::debug!("-> {}", frame);
            send_text(&self.ws, &frame)
        } else {
            log::debug!("queued {}", event.name());
            self.link.outbox.borrow_mut().push(frame);
            Ok(())
        }
    }
}

impl Drop for SocketClient {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();
    }
}

fn send_text(ws: &WebSocket, frame: &str) -> anyhow::Result<()> {
    ws.send_with_str(frame)
        .map_err(js_error)
        .context("websocket send failed")
}

fn send_packet(ws: &WebSocket, packet: Packet) {
    let sent = packet
        .encode()
        .map_err(anyhow::Error::from)
        .and_then(|frame| send_text(ws, &frame));
    if let Err(err) = sent {
        log::error!("{:#}", err);
    }
}

fn on_packet(ws: &WebSocket, link: &Link, on_event: &Callback<ServerEvent>, packet: Packet) {
    match packet {
        Packet::Open(handshake) => {
            log::debug!("engine.io session {}", handshake.sid);
            send_packet(ws, Packet::connect());
        }
        Packet::Ping => send_packet(ws, Packet::Pong),
        Packet::Message(SocketPacket::Connect(_)) => {
            link.joined.set(true);
            for frame in link.outbox.borrow_mut().drain(..) {
                log::debug!("-> {}", frame);
                if let Err(err) = send_text(ws, &frame) {
                    log::error!("{:#}", err);
                }
            }
        }
        Packet::Message(SocketPacket::Event(array)) => match ServerEvent::from_value(array) {
            Ok(event) => {
                log::debug!("<- {}", event.name());
                on_event.emit(event);
            }
            Err(ProtocolError::UnknownEvent(name)) => log::debug!("ignoring event {}", name),
            Err(err) => log::warn!("dropping event: {}", err),
        },
        Packet::Message(SocketPacket::ConnectError(data)) => {
            log::error!("server refused the connection: {}", data);
        }
        Packet::Message(SocketPacket::Disconnect) | Packet::Close => {
            link.joined.set(false);
            log::warn!("server ended the session");
        }
        Packet::Pong | Packet::Upgrade | Packet::Noop => {}
    }
}
