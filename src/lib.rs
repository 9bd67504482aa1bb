mod api;
mod app;
mod components;
mod config;
mod i18n;
mod models;
mod pages;
mod schema;
mod state;
mod storage;
mod tree;
mod util;

pub use api::{ApiClient, ApiError, ApiResult, EntryQuery, UploadFile};
pub use app::App;
pub use config::EnvConfig;
pub use models::*;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
