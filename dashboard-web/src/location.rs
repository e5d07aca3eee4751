use view_core::{PageLocation, QueryStringEditor, ViewError, ViewResult};
use wasm_bindgen::JsValue;
use web_sys::Window;

use crate::dom::js_error;

/// `window.location` read side, `history.replaceState` write side.
pub struct BrowserLocation {
    window: Window,
}

impl BrowserLocation {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        Ok(Self { window })
    }
}

impl QueryStringEditor for BrowserLocation {
    fn location(&self) -> ViewResult<PageLocation> {
        let href = self
            .window
            .location()
            .href()
            .map_err(|e| ViewError::History(js_error(e)))?;
        PageLocation::parse(&href)
    }

    fn replace_location(&mut self, location: &PageLocation) -> ViewResult<()> {
        let history = self
            .window
            .history()
            .map_err(|e| ViewError::History(js_error(e)))?;
        history
            .replace_state_with_url(&JsValue::NULL, "", Some(&location.to_relative()))
            .map_err(|e| ViewError::History(js_error(e)))
    }
}
