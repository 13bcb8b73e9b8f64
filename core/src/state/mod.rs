pub mod cell;
pub mod control;
pub mod step;

pub use cell::StateCell;
pub use control::Transition;
pub use step::{ApplyStatus, GenerationStatus, StepState, WizardStep};
