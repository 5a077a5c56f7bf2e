use anyhow::anyhow;
use chrono::{DateTime, Utc};
use concentration_core::protocol::ENGINE_IO_PATH;
use wasm_bindgen::JsValue;
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub(crate) fn utc_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
}

/// Milliseconds from now until `deadline`, never negative.
pub(crate) fn millis_until(deadline: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    (deadline - now)
        .num_milliseconds()
        .clamp(0, u32::MAX.into()) as u32
}

pub(crate) fn input_value(e: &InputEvent) -> String {
    e.target_unchecked_into::<HtmlInputElement>().value()
}

pub(crate) fn js_error(err: JsValue) -> anyhow::Error {
    anyhow!("{:?}", err)
}

/// WebSocket scheme matching the page's own `location.protocol`.
pub(crate) fn ws_scheme(page_protocol: &str) -> &'static str {
    match page_protocol {
        "https:" => "wss:",
        _ => "ws:",
    }
}

/// Appends the Engine.IO endpoint to a `ws://host[:port]` origin.
pub(crate) fn engine_io_url(origin: &str) -> String {
    format!("{}{}", origin.trim_end_matches('/'), ENGINE_IO_PATH)
}

/// Socket endpoint: `server` when given, otherwise the page's own host.
pub(crate) fn socket_url(server: Option<&str>) -> anyhow::Result<String> {
    let origin = match server {
        Some(server) => server.to_string(),
        None => {
            let location = gloo::utils::window().location();
            let protocol = location.protocol().map_err(js_error)?;
            let host = location.host().map_err(js_error)?;
            format!("{}//{}", ws_scheme(&protocol), host)
        }
    };
    Ok(engine_io_url(&origin))
}
