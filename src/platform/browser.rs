//! Browser platform: LocalStorage, fetch-based remote mirror, task spawning

use chrono::NaiveDate;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Request, RequestInit, RequestMode, Response, Storage, Url};

use crate::error::{RemoteError, StorageError};
use crate::persistence::{Document, KeyValueStore, RemoteMirror, Spawner};
use crate::settings::Settings;
use crate::transfer::ExportFile;

/// Browsers refuse keepalive requests with larger bodies
const KEEPALIVE_BODY_LIMIT: usize = 64 * 1024;

fn js_reason(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// `window.localStorage`; every call fails with `Unavailable` when storage is blocked
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl LocalStorageStore {
    pub fn open() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable, changes will not survive a reload");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

fn backend_error(operation: &'static str, key: &str, value: JsValue) -> StorageError {
    StorageError::Backend {
        operation,
        key: key.to_string(),
        reason: js_reason(&value),
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|e| backend_error("read", key, e))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|e| backend_error("write", key, e))
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(|e| backend_error("remove", key, e))
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let storage = self.storage()?;
        let len = storage.length().map_err(|e| backend_error("list", "*", e))?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = storage.key(i).map_err(|e| backend_error("list", "*", e))? {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.storage()?.clear().map_err(|e| backend_error("clear", "*", e))
    }
}

/// Realtime Database document reached through its REST endpoint
pub struct FirebaseMirror {
    url: String,
}

impl FirebaseMirror {
    /// `None` when no remote URL is configured
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        settings.document_url().map(|url| Self { url })
    }
}

async fn send(url: String, method: &'static str, body: Option<String>) -> Result<String, RemoteError> {
    let fail = |e: JsValue| RemoteError::Request(js_reason(&e));

    let opts = RequestInit::new();
    opts.set_method(method);
    opts.set_mode(RequestMode::Cors);
    if let Some(body) = &body {
        opts.set_keepalive(body.len() < KEEPALIVE_BODY_LIMIT);
        opts.set_body(&JsValue::from_str(body));
    }

    let request = Request::new_with_str_and_init(&url, &opts).map_err(fail)?;
    request
        .headers()
        .set("Content-Type", "application/json")
        .map_err(fail)?;

    let window = web_sys::window().ok_or(RemoteError::Unavailable)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(fail)?
        .dyn_into()
        .map_err(fail)?;
    if !response.ok() {
        return Err(RemoteError::Status {
            status: response.status(),
        });
    }

    let text = JsFuture::from(response.text().map_err(fail)?)
        .await
        .map_err(fail)?;
    Ok(text.as_string().unwrap_or_default())
}

impl RemoteMirror for FirebaseMirror {
    fn fetch(&self) -> LocalBoxFuture<'static, Result<Option<Document>, RemoteError>> {
        let url = self.url.clone();
        async move {
            let text = send(url, "GET", None).await?;
            // The database answers `null` for a missing node
            serde_json::from_str::<Option<Document>>(&text).map_err(|source| RemoteError::Decode { source })
        }
        .boxed_local()
    }

    fn store(&self, document: Document) -> LocalBoxFuture<'static, Result<(), RemoteError>> {
        let url = self.url.clone();
        async move {
            let body = serde_json::to_string(&document).map_err(|source| RemoteError::Encode { source })?;
            send(url, "PUT", Some(body)).await.map(|_| ())
        }
        .boxed_local()
    }
}

/// Runs tasks on the browser's microtask queue
pub struct BrowserSpawner;

impl Spawner for BrowserSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

pub fn init_logging(settings: &Settings) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(settings.verbosity.level()).is_err() {
        log::debug!("Logger already installed");
    }
}

pub fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(now.get_full_year() as i32, now.get_month() + 1, now.get_date())
        .unwrap_or_default()
}

/// Call `callback` when the page is being torn down
pub fn on_unload(callback: impl FnMut() + 'static) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let mut callback = callback;
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| callback());
    window.add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Offer `file` to the user as a download
pub fn download(file: &ExportFile) -> Result<(), JsValue> {
    let parts = js_sys::Array::of1(&JsValue::from_str(&file.contents));
    let options = BlobPropertyBag::new();
    options.set_type("application/json");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into().map_err(JsValue::from)?;
    anchor.set_href(&url);
    anchor.set_download(&file.file_name);
    anchor.click();

    Url::revoke_object_url(&url)?;
    log::info!("Downloaded {}", file.file_name);
    Ok(())
}
