/// Tab source backed by the extension's browser API
use async_trait::async_trait;
use wasm_bindgen::prelude::*;

use crate::error::{Result, TabError};
use crate::source::TabSource;
use crate::tab_data::{RawWindow, TabHandle};

// Import JS bridge functions
#[wasm_bindgen(module = "/abouttabs.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn getAllWindows(window_types: JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn removeTab(tab_id: i32) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn activateTab(tab_id: i32) -> std::result::Result<(), JsValue>;
}

pub struct BrowserTabs {
    window_types: Vec<String>,
}

impl BrowserTabs {
    pub fn new(window_types: Vec<String>) -> BrowserTabs {
        BrowserTabs { window_types }
    }
}

#[async_trait(?Send)]
impl TabSource for BrowserTabs {
    async fn windows(&self) -> Result<Vec<RawWindow>> {
        let types_js = serde_wasm_bindgen::to_value(&self.window_types)
            .map_err(|e| TabError::Query(format!("window types: {}", e)))?;

        let windows_js = getAllWindows(types_js)
            .await
            .map_err(|e| TabError::Query(format!("{:?}", e)))?;

        serde_wasm_bindgen::from_value(windows_js).map_err(|e| TabError::Decode(e.to_string()))
    }

    async fn close(&self, handle: TabHandle) -> Result<()> {
        removeTab(handle.0).await.map_err(|e| TabError::Close {
            handle,
            reason: format!("{:?}", e),
        })
    }

    async fn activate(&self, handle: TabHandle) -> Result<()> {
        activateTab(handle.0).await.map_err(|e| TabError::Activate {
            handle,
            reason: format!("{:?}", e),
        })
    }
}
