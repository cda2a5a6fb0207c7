//! Browser download sink for WASM.

use super::{FileSink, SaveError, SaveResult};
use wasm_bindgen::{JsCast, JsValue};

/// Saves files by handing the browser a Blob URL on a clicked anchor.
#[derive(Debug, Default)]
pub struct BrowserDownload;

impl BrowserDownload {
    pub fn new() -> Self {
        Self
    }
}

fn js_err(context: &str, err: JsValue) -> SaveError {
    SaveError::Browser(format!("{}: {:?}", context, err))
}

impl FileSink for BrowserDownload {
    fn save_file(
        &mut self,
        file_name: &str,
        content_type: &str,
        contents: &[u8],
    ) -> SaveResult<()> {
        let window = web_sys::window().ok_or_else(|| SaveError::Browser("No window".to_string()))?;
        let document = window
            .document()
            .ok_or_else(|| SaveError::Browser("No document".to_string()))?;

        let blob_parts = js_sys::Array::new();
        blob_parts.push(&js_sys::Uint8Array::from(contents));

        let options = web_sys::BlobPropertyBag::new();
        options.set_type(content_type);

        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)
            .map_err(|e| js_err("Failed to create blob", e))?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|e| js_err("Failed to create URL", e))?;

        let a = document
            .create_element("a")
            .map_err(|e| js_err("Failed to create element", e))?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| SaveError::Browser("Failed to cast to anchor".to_string()))?;

        a.set_href(&url);
        a.set_download(file_name);
        a.set_text_content(Some(&format!("Download {}", file_name)));
        a.click();

        web_sys::Url::revoke_object_url(&url).ok();
        log::info!("Download triggered: {} ({} bytes)", file_name, contents.len());
        Ok(())
    }
}
