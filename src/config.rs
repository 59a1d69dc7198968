/// Page configuration handed over by the extension script
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::error::{Result, TabError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    /// Window types included in the window query
    pub window_types: Vec<String>,
    /// Tabs showing exactly this URL are counted as blank
    pub blank_url: String,
    pub log_level: LevelFilter,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            window_types: vec!["normal".to_string()],
            blank_url: "about:blank".to_string(),
            log_level: LevelFilter::Info,
        }
    }
}

impl ViewConfig {
    /// Decode the page's config object; `undefined` or `null` means defaults
    pub fn from_js(value: JsValue) -> Result<ViewConfig> {
        if value.is_undefined() || value.is_null() {
            return Ok(ViewConfig::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|e| TabError::Decode(format!("config: {}", e)))
    }
}
