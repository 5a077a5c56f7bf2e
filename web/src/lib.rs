//! Browser host for the concentration client.
//!
//! Options come from the page's location hash, split on `&`, for example
//! `index.html#--server=ws://localhost:5000&--lock-timeout-ms=5000&-vv`.

use clap::Parser;
use wasm_bindgen::prelude::*;

mod game;
mod socket;
mod utils;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Console log level: each -v shows one level more, -q silences errors too
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Where the game server lives and how long a match check may stay unanswered
    #[command(flatten)]
    game: game::GameProps,
}

#[wasm_bindgen(start)]
pub fn run_app() {
    use gloo::utils::{document, window};

    #[cfg(feature = "console_error_panic_hook")]
    {
        console_error_panic_hook::set_once();
    }

    let hash = window().location().hash().unwrap_or_default();
    let args = Args::try_parse_from(hash.split(['#', '&'])).expect("Could not parse args");
    if let Some(log_level) = args.verbose.log_level() {
        console_log::init_with_level(log_level).expect("Error initializing logger");
    }
    log::debug!("hash options: {:?}", args);

    let Some(root) = document().get_element_by_id("app") else {
        log::error!("page has no id=\"app\" element to mount into");
        return;
    };
    yew::Renderer::<game::GameView>::with_root_and_props(root, args.game).render();
    log::info!("concentration client mounted");
}
