/// About Tabs - statistics and duplicate detection over every open tab
/// Built with Rust + WASM + Yew

pub mod aggregate;
pub mod browser;
pub mod config;
pub mod error;
pub mod format;
pub mod operations;
pub mod snapshot;
pub mod source;
pub mod tab_data;
pub mod time_ago;
pub mod ui;
pub mod update;
pub mod url_parts;
pub mod view_state;

#[cfg(test)]
mod testing;

use wasm_bindgen::prelude::*;

use crate::config::ViewConfig;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));
}

// Start the Yew app for the about:tabs page
#[wasm_bindgen]
pub fn start_about_tabs(config: JsValue) -> Result<(), JsValue> {
    let config = ViewConfig::from_js(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
    log::set_max_level(config.log_level);
    log::info!("starting with {:?}", config);

    yew::Renderer::<ui::about::AboutTabs>::with_props(ui::about::AboutTabsProps { config }).render();
    Ok(())
}
