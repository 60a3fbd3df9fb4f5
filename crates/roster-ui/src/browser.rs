//! File input helpers for the avatar picker.

use roster_client::AvatarFile;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, HtmlInputElement, Url};

pub fn selected_file(ev: &leptos::ev::Event) -> Option<File> {
    let input = ev.target()?.dyn_into::<HtmlInputElement>().ok()?;
    input.files()?.get(0)
}

pub fn reset_input(ev: &leptos::ev::Event) {
    if let Some(input) = ev.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) {
        input.set_value("");
    }
}

pub fn object_url(file: &File) -> Option<String> {
    Url::create_object_url_with_blob(file).ok()
}

pub fn revoke_object_url(url: &str) {
    if Url::revoke_object_url(url).is_err() {
        tracing::warn!("could not revoke preview url {url}");
    }
}

pub async fn read_file(file: &File) -> Result<AvatarFile, String> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(|e| format!("could not read {}: {e:?}", file.name()))?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let contentType = file.type_();

    Ok(AvatarFile {
        file_name: file.name(),
        content_type: (!contentType.is_empty()).then_some(contentType),
        bytes,
    })
}
