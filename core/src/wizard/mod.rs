// pipewright/src/wizard/mod.rs

//! The workflow state machine.

pub mod controller;
pub mod navigation;
pub mod preview;
pub mod view;

pub use controller::WizardController;
pub use view::{CompletedWorkflow, WizardView};
