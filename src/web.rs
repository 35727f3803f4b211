//! JavaScript facade for the browser build
//!
//! The screens are rendered by the host page; it drives the wizard through
//! `PlanningApp` and re-renders from `screen()` after every call.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::persistence::{Document, MemoryMirror, RemoteMirror, RemoteQueue, Spawner, StoreKey};
use crate::platform::{BrowserSpawner, FirebaseMirror, LocalStorageStore, download, init_logging, on_unload, today};
use crate::settings::Settings;
use crate::wizard::{Step, TimeSlotConfig, Wizard};

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json(value: &impl serde::Serialize) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

/// Load settings, connect the stores, restore state and install the
/// teardown flush.
pub async fn start() -> Result<PlanningApp, JsValue> {
    let settings = Settings::load();
    init_logging(&settings);
    log::info!("Shift Planner v{}", env!("CARGO_PKG_VERSION"));

    let mirror: Rc<dyn RemoteMirror> = match FirebaseMirror::from_settings(&settings) {
        Some(mirror) => Rc::new(mirror),
        None => {
            log::warn!("No remote URL configured, data stays in this browser");
            Rc::new(MemoryMirror::new())
        }
    };
    let spawner: Rc<dyn Spawner> = Rc::new(BrowserSpawner);
    let remote = RemoteQueue::new(mirror, spawner);

    let wizard = Rc::new(RefCell::new(Wizard::boot(LocalStorageStore::open(), remote).await));

    let flushing = Rc::clone(&wizard);
    on_unload(move || {
        let Ok(wizard) = flushing.try_borrow() else {
            return;
        };
        let flush = wizard.flush();
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = flush.await {
                log::warn!("Teardown flush failed: {}", e);
            }
        });
    })?;

    Ok(PlanningApp { wizard })
}

#[wasm_bindgen]
pub struct PlanningApp {
    wizard: Rc<RefCell<Wizard<LocalStorageStore>>>,
}

#[wasm_bindgen]
impl PlanningApp {
    /// Current step name
    pub fn step(&self) -> String {
        self.wizard.borrow().step().as_str().to_string()
    }

    /// Screen to render; `undefined` means "show nothing"
    pub fn screen(&self) -> Option<String> {
        self.wizard.borrow().screen().map(|step| step.as_str().to_string())
    }

    /// Flat fields as JSON
    pub fn state(&self) -> Result<String, JsValue> {
        let wizard = self.wizard.borrow();
        to_json(&Document::assemble(wizard.state(), Vec::new()))
    }

    #[wasm_bindgen(js_name = submitConfig)]
    pub fn submit_config(&self, interval: u32, start: &str, end: &str) -> Result<(), JsValue> {
        let config = TimeSlotConfig::generate(interval, start, end).map_err(js_error)?;
        self.wizard.borrow_mut().submit_config(config).map_err(js_error)
    }

    #[wasm_bindgen(js_name = addShop)]
    pub fn add_shop(&self, name: &str) -> Result<String, JsValue> {
        self.wizard.borrow_mut().add_shop(name).map_err(js_error)
    }

    #[wasm_bindgen(js_name = selectShop)]
    pub fn select_shop(&self, shop: &str) -> Result<(), JsValue> {
        self.wizard.borrow_mut().select_shop(shop).map_err(js_error)
    }

    #[wasm_bindgen(js_name = deleteShop)]
    pub fn delete_shop(&self, shop: &str) {
        self.wizard.borrow_mut().delete_shop(shop);
    }

    #[wasm_bindgen(js_name = clearShops)]
    pub fn clear_shops(&self) {
        self.wizard.borrow_mut().clear_shops();
    }

    #[wasm_bindgen(js_name = selectWeek)]
    pub fn select_week(&self, week: &str) -> Result<(), JsValue> {
        self.wizard.borrow_mut().select_week(week).map_err(js_error)
    }

    pub fn roster(&self) -> Vec<String> {
        self.wizard.borrow().roster()
    }

    #[wasm_bindgen(js_name = selectedEmployees)]
    pub fn selected_employees(&self) -> Vec<String> {
        self.wizard.borrow().selected_employees()
    }

    #[wasm_bindgen(js_name = addEmployee)]
    pub fn add_employee(&self, name: &str) -> Result<String, JsValue> {
        self.wizard.borrow_mut().add_employee(name).map_err(js_error)
    }

    #[wasm_bindgen(js_name = removeEmployee)]
    pub fn remove_employee(&self, name: &str) -> Result<(), JsValue> {
        self.wizard.borrow_mut().remove_employee(name).map_err(js_error)
    }

    #[wasm_bindgen(js_name = clearEmployees)]
    pub fn clear_employees(&self) -> Result<(), JsValue> {
        self.wizard.borrow_mut().clear_employees().map_err(js_error)
    }

    #[wasm_bindgen(js_name = confirmEmployees)]
    pub fn confirm_employees(&self, selected: Vec<String>) -> Result<(), JsValue> {
        self.wizard
            .borrow_mut()
            .confirm_employees(&selected)
            .map_err(js_error)
    }

    pub fn next(&self) -> String {
        self.wizard.borrow_mut().next().as_str().to_string()
    }

    pub fn previous(&self) -> String {
        self.wizard.borrow_mut().previous().as_str().to_string()
    }

    /// Jump back from the planning screen to `step`
    pub fn revisit(&self, step: &str) -> Result<String, JsValue> {
        let step = Step::from_str(step).ok_or_else(|| js_error(format!("unknown step `{}`", step)))?;
        Ok(self.wizard.borrow_mut().revisit(step).as_str().to_string())
    }

    /// Planning grid of the active shop and week, as JSON
    pub fn planning(&self) -> Result<String, JsValue> {
        to_json(&self.wizard.borrow().planning())
    }

    #[wasm_bindgen(js_name = savePlanning)]
    pub fn save_planning(&self, json: &str) -> Result<(), JsValue> {
        let planning: Value = serde_json::from_str(json).map_err(js_error)?;
        self.wizard.borrow_mut().save_planning(&planning).map_err(js_error)
    }

    /// Opaque namespaced document (`copied_*`, `lastPlanning_*`) as JSON
    pub fn document(&self, key: &str) -> Result<String, JsValue> {
        let key = StoreKey::parse(key).ok_or_else(|| js_error(format!("unknown key `{}`", key)))?;
        to_json(&self.wizard.borrow().document(&key))
    }

    #[wasm_bindgen(js_name = saveDocument)]
    pub fn save_document(&self, key: &str, json: &str) -> Result<(), JsValue> {
        let key = StoreKey::parse(key).ok_or_else(|| js_error(format!("unknown key `{}`", key)))?;
        let value: Value = serde_json::from_str(json).map_err(js_error)?;
        self.wizard.borrow_mut().save_document(&key, &value);
        Ok(())
    }

    pub fn reset(&self) {
        self.wizard.borrow_mut().reset();
    }

    /// Download the whole state as `planning_export_<date>.json`
    pub fn export(&self) -> Result<(), JsValue> {
        let file = self.wizard.borrow().export(today()).map_err(js_error)?;
        download(&file)
    }

    /// Apply an exported file. Resolves to the message to show the user.
    pub fn import(&self, text: &str) -> String {
        match self.wizard.borrow_mut().import(text) {
            Ok(summary) => format!("Imported {} entries.", summary.keys),
            Err(e) => e.user_message(),
        }
    }
}
