// pipewright/src/state/control.rs

//! Outcome of a navigation action.

use crate::state::step::WizardStep;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// The workflow moved and the entry side effects of `to` have settled.
  Moved { from: WizardStep, to: WizardStep },
  /// The guard for leaving `step` does not hold, or there is no step in that
  /// direction. Not an error: the state is unchanged.
  Blocked { step: WizardStep },
}

impl Transition {
  pub fn moved(&self) -> bool {
    matches!(self, Transition::Moved { .. })
  }

  /// The step the workflow is in after the action.
  pub fn current(&self) -> WizardStep {
    match self {
      Transition::Moved { to, .. } => *to,
      Transition::Blocked { step } => *step,
    }
  }
}
