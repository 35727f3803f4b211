//! Shift Planner entry point
//!
//! Boots the wizard in the browser and hands it to the host page.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    match shift_planner::web::start().await {
        Ok(app) => {
            let published = web_sys::window().map(|window| {
                js_sys::Reflect::set(&window, &JsValue::from_str("planner"), &JsValue::from(app))
            });
            match published {
                Some(Ok(_)) => log::info!("Planner ready"),
                _ => log::error!("Could not publish the planner on window"),
            }
        }
        Err(e) => log::error!("Planner failed to start: {:?}", e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use shift_planner::Settings;

    let settings = Settings::load();
    shift_planner::platform::init_logging(&settings);
    log::info!("Shift Planner (native) v{}", env!("CARGO_PKG_VERSION"));
    log::info!("The planner runs in the browser - use `trunk serve` for the web version");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
