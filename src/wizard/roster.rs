//! Employee rosters and weekly selections
//!
//! Rosters are per shop, selections per shop and week. Both live only in the
//! local store; a selection is always a subset of its shop's roster.

use serde_json::Value;

use super::session::Wizard;
use super::state::normalize_name;
use super::step::StepEvent;
use crate::error::WizardError;
use crate::persistence::{KeyKind, KeyValueStore, StoreKey};

impl<S: KeyValueStore> Wizard<S> {
    fn roster_key(&self) -> Result<StoreKey, WizardError> {
        if self.state.selected_shop.is_empty() {
            return Err(WizardError::NoShopSelected);
        }
        Ok(StoreKey::employees(&self.state.selected_shop))
    }

    fn planning_keys(&self) -> Vec<StoreKey> {
        let shop = self.state.selected_shop.clone();
        self.bridge
            .repo()
            .scan(|key| key.kind == KeyKind::Planning && key.belongs_to_shop(&shop))
    }

    /// Roster of the active shop
    pub fn roster(&self) -> Vec<String> {
        match self.roster_key() {
            Ok(key) => self.bridge.repo().get(&key, Vec::new()),
            Err(_) => Vec::new(),
        }
    }

    /// Stored selection for the active shop and week, restricted to the roster
    pub fn selected_employees(&self) -> Vec<String> {
        let roster = self.roster();
        self.stored_selection()
            .into_iter()
            .filter(|name| roster.contains(name))
            .collect()
    }

    /// Add an employee to the roster; new employees start out selected for the
    /// active week.
    pub fn add_employee(&mut self, name: &str) -> Result<String, WizardError> {
        let employee = normalize_name(name).ok_or(WizardError::EmptyName)?;
        let roster_key = self.roster_key()?;
        let selection_key = self.require_week_key(KeyKind::SelectedEmployees)?;

        let mut roster = self.roster();
        if roster.contains(&employee) {
            return Err(WizardError::DuplicateEmployee(employee));
        }
        roster.push(employee.clone());
        let mut selected = self.selected_employees();
        selected.push(employee.clone());

        let repo = self.bridge.repo_mut();
        repo.set(&roster_key, &roster);
        repo.set(&selection_key, &selected);
        log::info!("Added employee {} to {}", employee, self.state.selected_shop);
        Ok(employee)
    }

    /// Save the week's selection and move on to planning
    pub fn confirm_employees(&mut self, selected: &[String]) -> Result<(), WizardError> {
        let selection_key = self.require_week_key(KeyKind::SelectedEmployees)?;
        let roster = self.roster();
        let selected: Vec<String> = selected
            .iter()
            .filter(|name| roster.contains(name))
            .cloned()
            .collect();
        if selected.is_empty() {
            return Err(WizardError::NoEmployeesSelected);
        }

        self.bridge.repo_mut().set(&selection_key, &selected);
        self.steps.apply(StepEvent::EmployeesConfirmed {
            selected: selected.len(),
        });
        Ok(())
    }

    /// Drop one employee from the roster, the week's selection and every
    /// planning of the shop. Plannings left empty are deleted.
    pub fn remove_employee(&mut self, name: &str) -> Result<(), WizardError> {
        let roster_key = self.roster_key()?;
        let roster: Vec<String> = self.roster().into_iter().filter(|e| e != name).collect();
        let selection: Vec<String> = self
            .selected_employees()
            .into_iter()
            .filter(|e| e != name)
            .collect();
        let plannings = self.planning_keys();
        let selection_key = self.require_week_key(KeyKind::SelectedEmployees).ok();

        let repo = self.bridge.repo_mut();
        repo.set(&roster_key, &roster);
        if let Some(key) = selection_key {
            repo.set(&key, &selection);
        }
        for key in plannings {
            let Value::Object(mut planning) = repo.get_value(&key) else {
                continue;
            };
            if planning.remove(name).is_none() {
                continue;
            }
            if planning.is_empty() {
                repo.delete(&key);
            } else {
                repo.set(&key, &planning);
            }
        }
        log::info!("Removed employee {} from {}", name, self.state.selected_shop);
        Ok(())
    }

    /// Empty the roster and the week's selection and drop every planning of the shop
    pub fn clear_employees(&mut self) -> Result<(), WizardError> {
        let roster_key = self.roster_key()?;
        let selection_key = self.require_week_key(KeyKind::SelectedEmployees).ok();
        let plannings = self.planning_keys();

        let repo = self.bridge.repo_mut();
        repo.set(&roster_key, &Vec::<String>::new());
        if let Some(key) = selection_key {
            repo.set(&key, &Vec::<String>::new());
        }
        for key in &plannings {
            repo.delete(key);
        }
        log::info!(
            "Cleared employees and {} plannings of {}",
            plannings.len(),
            self.state.selected_shop
        );
        Ok(())
    }
}
