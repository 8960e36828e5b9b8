//! Browser bindings for the settings store and file downloads.
//!
//! `BrowserStorage` and `BrowserLocation` look up `window` on every call, so
//! they are plain unit structs and cost nothing to hold.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Storage};
use ww_core::store::{SettingsStorage, StorageError, UrlSync};

fn js_error(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

/// `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl SettingsStorage for BrowserStorage {
    fn load(&self, key: &str) -> Option<String> {
        local_storage()?.get_item(key).ok().flatten()
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = local_storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write {
                key: key.to_string(),
                reason: js_error(e),
            })
    }
}

/// The page's `location.search`, replaced through `history.replaceState`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLocation;

impl UrlSync for BrowserLocation {
    fn query(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default()
    }

    fn replace_query(&mut self, query: &str) -> Result<(), StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let location = window.location();
        let path = location.pathname().map_err(|e| StorageError::Url(js_error(e)))?;
        let hash = location.hash().unwrap_or_default();
        let url = if query.is_empty() {
            format!("{}{}", path, hash)
        } else {
            format!("{}?{}{}", path, query, hash)
        };
        window
            .history()
            .and_then(|h| h.replace_state_with_url(&JsValue::NULL, "", Some(&url)))
            .map_err(|e| StorageError::Url(js_error(e)))
    }
}

/// Hand `bytes` to the browser as a file download named `filename`.
pub fn save_blob(bytes: &[u8], filename: &str, mime: &str) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let parts = js_sys::Array::new();
    parts.push(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)?;
    let href = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error)?;

    let anchor = document
        .create_element("a")
        .map_err(js_error)?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| "created element is not an anchor".to_string())?;
    anchor.set_href(&href);
    anchor.set_download(filename);

    // Firefox ignores clicks on detached anchors.
    if let Some(body) = document.body() {
        body.append_child(&anchor).map_err(js_error)?;
    }
    anchor.click();
    anchor.remove();

    web_sys::Url::revoke_object_url(&href).map_err(js_error)
}
