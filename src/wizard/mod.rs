//! Planning wizard
//!
//! The model and the step machine are pure; `Wizard` wires them to the
//! persistence bridge. Rendering is left to the presentation layer, which
//! reads `Wizard::screen` and calls the operations below on user input.

pub mod roster;
pub mod session;
pub mod state;
pub mod step;

pub use session::{ImportSummary, Wizard};
pub use state::{AppState, Readiness, TimeSlotConfig, is_planning_reachable, is_week, normalize_name};
pub use step::{Step, StepController, StepEvent, transition};
