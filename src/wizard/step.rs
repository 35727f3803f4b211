//! Step state machine
//!
//! A closed set of screens walked in a fixed order, an explicit transition
//! table and one pure guard per gated transition. Events that have no entry in
//! the table for the current step leave it unchanged.

use serde::{Deserialize, Serialize};

/// Wizard screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Config,
    Shop,
    Week,
    Employees,
    Planning,
}

impl Step {
    /// Linear navigation order
    pub const ORDER: [Step; 5] = [
        Step::Config,
        Step::Shop,
        Step::Week,
        Step::Employees,
        Step::Planning,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn next(&self) -> Option<Step> {
        Self::ORDER.get(self.index() + 1).copied()
    }

    pub fn previous(&self) -> Option<Step> {
        self.index().checked_sub(1).map(|i| Self::ORDER[i])
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Config => "config",
            Step::Shop => "shop",
            Step::Week => "week",
            Step::Employees => "employees",
            Step::Planning => "planning",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ORDER.iter().copied().find(|step| step.as_str() == s)
    }
}

/// Something that happened on a screen, or to the whole model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// A valid configuration was confirmed
    ConfigSubmitted,
    /// A shop was selected or created
    ShopChosen,
    /// A week was selected; carries the re-checked configuration validity
    WeekChosen { config_ready: bool },
    /// The employees screen saved its selection
    EmployeesConfirmed { selected: usize },
    Next,
    Previous,
    /// Shortcut from the planning screen back to an earlier screen
    Revisit(Step),
    ShopDeleted,
    Reset,
    /// State was replaced wholesale (import)
    Restored { planning_reachable: bool },
}

/// Week selection goes on to employees only while the configuration is still valid
pub fn week_selection_target(config_ready: bool) -> Step {
    if config_ready { Step::Employees } else { Step::Config }
}

pub fn employees_confirmed(selected: usize) -> bool {
    selected > 0
}

/// Startup and import land on planning when everything it needs is there
pub fn restored_step(planning_reachable: bool) -> Step {
    if planning_reachable { Step::Planning } else { Step::Config }
}

/// The transition table. `None` means the event is ignored in `step`.
pub fn transition(step: Step, event: StepEvent) -> Option<Step> {
    use StepEvent as E;

    match (step, event) {
        (Step::Config, E::ConfigSubmitted) => Some(Step::Shop),
        (Step::Shop, E::ShopChosen) => Some(Step::Week),
        (Step::Week, E::WeekChosen { config_ready }) => Some(week_selection_target(config_ready)),
        (Step::Employees, E::EmployeesConfirmed { selected }) => {
            employees_confirmed(selected).then_some(Step::Planning)
        }
        (Step::Planning, E::Revisit(target)) if target < Step::Planning => Some(target),
        (_, E::Next) => step.next(),
        (_, E::Previous) => step.previous(),
        (_, E::ShopDeleted | E::Reset) => Some(Step::Config),
        (_, E::Restored { planning_reachable }) => Some(restored_step(planning_reachable)),
        _ => None,
    }
}

/// Holds the active step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepController {
    current: Step,
}

impl StepController {
    /// Computed once at startup from persisted data
    pub fn initial(planning_reachable: bool) -> Self {
        Self {
            current: restored_step(planning_reachable),
        }
    }

    pub fn current(&self) -> Step {
        self.current
    }

    /// Apply `event`; returns whether the step changed
    pub fn apply(&mut self, event: StepEvent) -> bool {
        match transition(self.current, event) {
            Some(next) if next != self.current => {
                log::info!("Step {} -> {} ({:?})", self.current.as_str(), next.as_str(), event);
                self.current = next;
                true
            }
            Some(_) => false,
            None => {
                log::debug!("Ignoring {:?} on step {}", event, self.current.as_str());
                false
            }
        }
    }

    /// Screen to render. The planning screen only renders while its
    /// preconditions hold; unguarded navigation can still land on it.
    pub fn visible_screen(&self, planning_reachable: bool) -> Option<Step> {
        match self.current {
            Step::Planning if !planning_reachable => None,
            step => Some(step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_initial_step() {
        assert_eq!(StepController::initial(true).current(), Step::Planning);
        assert_eq!(StepController::initial(false).current(), Step::Config);
    }

    #[test]
    fn test_forward_path() {
        let mut steps = StepController::initial(false);
        assert!(steps.apply(StepEvent::ConfigSubmitted));
        assert!(steps.apply(StepEvent::ShopChosen));
        assert!(steps.apply(StepEvent::WeekChosen { config_ready: true }));
        assert_eq!(steps.current(), Step::Employees);
        assert!(steps.apply(StepEvent::EmployeesConfirmed { selected: 2 }));
        assert_eq!(steps.current(), Step::Planning);
    }

    #[test]
    fn test_week_selection_rechecks_config() {
        let mut steps = StepController { current: Step::Week };
        steps.apply(StepEvent::WeekChosen { config_ready: false });
        assert_eq!(steps.current(), Step::Config);
    }

    #[test]
    fn test_empty_employee_selection_stays_put() {
        let mut steps = StepController { current: Step::Employees };
        assert!(!steps.apply(StepEvent::EmployeesConfirmed { selected: 0 }));
        assert_eq!(steps.current(), Step::Employees);
    }

    #[test]
    fn test_screen_events_outside_their_step_are_ignored() {
        let mut steps = StepController::initial(false);
        assert!(!steps.apply(StepEvent::ShopChosen));
        assert!(!steps.apply(StepEvent::WeekChosen { config_ready: true }));
        assert!(!steps.apply(StepEvent::Revisit(Step::Shop)));
        assert_eq!(steps.current(), Step::Config);
    }

    #[test]
    fn test_linear_navigation_clamps_at_both_ends() {
        let mut steps = StepController::initial(false);
        assert!(!steps.apply(StepEvent::Previous));
        for _ in 0..10 {
            steps.apply(StepEvent::Next);
        }
        assert_eq!(steps.current(), Step::Planning);
        assert!(!steps.apply(StepEvent::Next));
    }

    #[test]
    fn test_revisit_from_planning() {
        let mut steps = StepController::initial(true);
        assert!(!steps.apply(StepEvent::Revisit(Step::Planning)));
        assert!(steps.apply(StepEvent::Revisit(Step::Week)));
        assert_eq!(steps.current(), Step::Week);
    }

    #[test]
    fn test_global_events() {
        for step in Step::ORDER {
            assert_eq!(transition(step, StepEvent::Reset), Some(Step::Config));
            assert_eq!(transition(step, StepEvent::ShopDeleted), Some(Step::Config));
            assert_eq!(
                transition(step, StepEvent::Restored { planning_reachable: true }),
                Some(Step::Planning)
            );
        }
    }

    #[test]
    fn test_planning_hidden_when_unreachable() {
        let steps = StepController::initial(true);
        assert_eq!(steps.visible_screen(true), Some(Step::Planning));
        assert_eq!(steps.visible_screen(false), None);
    }

    #[test]
    fn test_step_names() {
        for step in Step::ORDER {
            assert_eq!(Step::from_str(step.as_str()), Some(step));
        }
        assert_eq!(Step::from_str("summary"), None);
    }

    proptest! {
        #[test]
        fn prop_next_then_previous_returns(index in 0usize..4) {
            let step = Step::ORDER[index];
            let forward = transition(step, StepEvent::Next).unwrap();
            prop_assert_eq!(forward.index(), index + 1);
            prop_assert_eq!(transition(forward, StepEvent::Previous), Some(step));
        }
    }
}
