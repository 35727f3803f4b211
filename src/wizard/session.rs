//! Wizard session
//!
//! Owns the flat state, the step controller and the persistence bridge. Every
//! change to a flat field goes through `commit`, which writes the local store
//! first and then hands the merged document to the remote mirror.

use chrono::NaiveDate;
use futures_util::future::LocalBoxFuture;
use serde_json::Value;

use super::state::{AppState, Readiness, TimeSlotConfig, is_planning_reachable, is_week, normalize_name};
use super::step::{Step, StepController, StepEvent};
use crate::error::{ConfigError, ImportError, RemoteError, WizardError};
use crate::persistence::{
    Document, KeyKind, KeyValueStore, LoadSource, PersistenceBridge, RemoteQueue, StoreKey,
};
use crate::transfer::{self, ExportFile};

/// What an import changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub keys: usize,
    pub step: Step,
}

pub struct Wizard<S> {
    pub(super) state: AppState,
    pub(super) steps: StepController,
    pub(super) bridge: PersistenceBridge<S>,
}

impl<S: KeyValueStore> Wizard<S> {
    /// Load persisted state (remote first), mirror it once and pick the
    /// starting screen.
    pub async fn boot(store: S, remote: RemoteQueue) -> Self {
        let mut bridge = PersistenceBridge::new(store, remote);
        let outcome = bridge.load().await;

        let mut wizard = Self {
            state: outcome.state,
            steps: StepController::initial(false),
            bridge,
        };
        wizard.steps = StepController::initial(wizard.planning_reachable());
        wizard.bridge.write_flat(&wizard.state);
        wizard.bridge.persist(&wizard.state);

        log::info!(
            "Wizard ready from {} data on step {}",
            match outcome.source {
                LoadSource::Remote => "remote",
                LoadSource::Local => "local",
            },
            wizard.steps.current().as_str()
        );
        wizard
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn step(&self) -> Step {
        self.steps.current()
    }

    /// Screen to render, `None` while planning is selected but not reachable
    pub fn screen(&self) -> Option<Step> {
        self.steps.visible_screen(self.planning_reachable())
    }

    pub fn bridge(&self) -> &PersistenceBridge<S> {
        &self.bridge
    }

    /// Apply `change` to the flat state; persist locally then remotely if
    /// anything actually changed.
    pub(super) fn commit(&mut self, change: impl FnOnce(&mut AppState)) {
        let before = self.state.clone();
        change(&mut self.state);
        if self.state != before {
            self.bridge.write_flat(&self.state);
            self.bridge.persist(&self.state);
        }
    }

    /// Selected employees of the active shop and week, as stored
    pub(super) fn stored_selection(&self) -> Vec<String> {
        if self.state.selected_shop.is_empty() || self.state.selected_week.is_empty() {
            return Vec::new();
        }
        let key = StoreKey::selected_employees(&self.state.selected_shop, &self.state.selected_week);
        self.bridge.repo().get(&key, Vec::new())
    }

    /// Gate for the planning screen; only selected employees still on the
    /// roster count.
    pub fn planning_reachable(&self) -> bool {
        let selected = self.selected_employees();
        is_planning_reachable(&Readiness {
            config: self.state.time_slot_config.as_ref(),
            shop: &self.state.selected_shop,
            week: &self.state.selected_week,
            selected_employees: &selected,
        })
    }

    // === Configuration ===

    /// Accept a configuration and move on to shop selection
    pub fn submit_config(&mut self, config: TimeSlotConfig) -> Result<(), WizardError> {
        if !config.is_valid() {
            return Err(ConfigError::Incomplete.into());
        }
        log::info!("Time slot configuration set ({} slots)", config.time_slots.len());
        self.commit(|state| state.time_slot_config = Some(config));
        self.steps.apply(StepEvent::ConfigSubmitted);
        Ok(())
    }

    // === Shops ===

    /// Register a shop (name normalized to uppercase), select it and move on
    pub fn add_shop(&mut self, name: &str) -> Result<String, WizardError> {
        let shop = normalize_name(name).ok_or(WizardError::EmptyName)?;
        if self.state.has_shop(&shop) {
            return Err(WizardError::DuplicateShop(shop));
        }
        log::info!("Adding shop {}", shop);
        self.commit(|state| {
            state.shops.push(shop.clone());
            state.selected_shop = shop.clone();
        });
        self.steps.apply(StepEvent::ShopChosen);
        Ok(shop)
    }

    pub fn select_shop(&mut self, shop: &str) -> Result<(), WizardError> {
        if !self.state.has_shop(shop) {
            return Err(WizardError::UnknownShop(shop.to_string()));
        }
        self.commit(|state| state.selected_shop = shop.to_string());
        self.steps.apply(StepEvent::ShopChosen);
        Ok(())
    }

    /// Remove a shop with every document namespaced under it and go back to
    /// configuration.
    pub fn delete_shop(&mut self, shop: &str) {
        let removed = self.bridge.repo_mut().delete_where(|key| {
            key.is_namespaced() && key.belongs_to_shop(shop)
        });
        log::info!("Deleted shop {} ({} stored entries)", shop, removed);
        self.commit(|state| {
            state.shops.retain(|s| s != shop);
            if state.selected_shop == shop {
                state.selected_shop.clear();
            }
        });
        self.steps.apply(StepEvent::ShopDeleted);
    }

    /// Remove every shop and everything namespaced under any shop
    pub fn clear_shops(&mut self) {
        let removed = self.bridge.repo_mut().delete_where(StoreKey::is_namespaced);
        log::info!("Cleared all shops ({} stored entries)", removed);
        self.commit(|state| {
            state.shops.clear();
            state.selected_shop.clear();
        });
    }

    // === Week ===

    /// Select the week; continues to employees only if the configuration is
    /// still valid, otherwise sends the user back to configuration.
    pub fn select_week(&mut self, week: &str) -> Result<(), WizardError> {
        if !is_week(week) {
            return Err(WizardError::InvalidWeek(week.to_string()));
        }
        self.commit(|state| state.selected_week = week.to_string());
        let config_ready = self
            .state
            .time_slot_config
            .as_ref()
            .is_some_and(TimeSlotConfig::is_valid);
        if !config_ready {
            log::info!("Configuration no longer valid, back to config");
        }
        self.steps.apply(StepEvent::WeekChosen { config_ready });
        Ok(())
    }

    // === Navigation ===

    pub fn next(&mut self) -> Step {
        self.steps.apply(StepEvent::Next);
        self.step()
    }

    pub fn previous(&mut self) -> Step {
        self.steps.apply(StepEvent::Previous);
        self.step()
    }

    /// Jump back from the planning screen
    pub fn revisit(&mut self, step: Step) -> Step {
        self.steps.apply(StepEvent::Revisit(step));
        self.step()
    }

    // === Opaque documents ===

    /// Planning grid of the active shop and week, `{}` when none
    pub fn planning(&self) -> Value {
        match self.week_key(KeyKind::Planning) {
            Some(key) => self.bridge.repo().get(&key, Value::Object(Default::default())),
            None => Value::Object(Default::default()),
        }
    }

    pub fn save_planning(&mut self, planning: &Value) -> Result<(), WizardError> {
        let key = self.require_week_key(KeyKind::Planning)?;
        self.bridge.repo_mut().set(&key, planning);
        Ok(())
    }

    /// Read an opaque namespaced document (`copied_`, `lastPlanning_`, ...)
    pub fn document(&self, key: &StoreKey) -> Value {
        self.bridge.repo().get_value(key)
    }

    pub fn save_document(&mut self, key: &StoreKey, value: &Value) {
        self.bridge.repo_mut().set(key, value);
    }

    fn week_key(&self, kind: KeyKind) -> Option<StoreKey> {
        let (shop, week) = (&self.state.selected_shop, &self.state.selected_week);
        if shop.is_empty() || week.is_empty() {
            return None;
        }
        Some(StoreKey {
            kind,
            shop: Some(shop.clone()),
            week: Some(week.clone()),
        })
    }

    pub(super) fn require_week_key(&self, kind: KeyKind) -> Result<StoreKey, WizardError> {
        if self.state.selected_shop.is_empty() {
            return Err(WizardError::NoShopSelected);
        }
        self.week_key(kind).ok_or(WizardError::NoWeekSelected)
    }

    // === Whole-state operations ===

    /// Forget everything, locally and remotely
    pub fn reset(&mut self) {
        log::info!("Resetting all data");
        self.bridge.clear_all();
        self.state = AppState::default();
        self.bridge.write_flat(&self.state);
        self.bridge.persist(&self.state);
        self.steps.apply(StepEvent::Reset);
    }

    /// Best-effort mirror write for page teardown
    pub fn flush(&self) -> LocalBoxFuture<'static, Result<(), RemoteError>> {
        self.bridge.flush(&self.state)
    }

    /// The document that export and the remote mirror share
    pub fn snapshot(&self) -> Document {
        self.bridge.snapshot(&self.state)
    }

    pub fn export(&self, today: NaiveDate) -> Result<ExportFile, serde_json::Error> {
        transfer::export_document(&self.snapshot(), today)
    }

    /// Validate and apply an exported document. All or nothing.
    pub fn import(&mut self, text: &str) -> Result<ImportSummary, ImportError> {
        let doc = transfer::prepare(text).inspect_err(|e| {
            log::warn!("Import rejected: {}", e);
            for issue in e.issues() {
                log::warn!("  {}", issue);
            }
        })?;

        self.bridge.replace_all(&doc);
        self.state = AppState::from_document(&doc);
        let keys = doc.len();
        self.bridge.push(doc);

        self.steps.apply(StepEvent::Restored {
            planning_reachable: self.planning_reachable(),
        });
        log::info!("Imported {} keys, now on step {}", keys, self.step().as_str());
        Ok(ImportSummary {
            keys,
            step: self.step(),
        })
    }
}
