use std::sync::Mutex;
use thiserror::Error;

/// Lifecycle state of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
  /// Constructed, nothing done yet
  Parsed,
  Installing,
  /// Installed and waiting to take control
  Installed,
  Activating,
  /// Controlling and intercepting requests
  Activated,
  /// Failed to install, never activates
  Redundant,
}

impl WorkerState {
  fn can_advance_to(self, next: WorkerState) -> bool {
    use WorkerState::*;
    matches!(
      (self, next),
      (Parsed, Installing)
        | (Installing, Installed)
        | (Installing, Redundant)
        | (Installed, Activating)
        | (Activating, Activated)
    )
  }
}

impl std::fmt::Display for WorkerState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      WorkerState::Parsed => "parsed",
      WorkerState::Installing => "installing",
      WorkerState::Installed => "installed",
      WorkerState::Activating => "activating",
      WorkerState::Activated => "activated",
      WorkerState::Redundant => "redundant",
    };
    f.write_str(name)
  }
}

#[derive(Debug, Clone, Error)]
#[error("worker cannot move from {from} to {to}")]
pub struct LifecycleError {
  pub from: WorkerState,
  pub to: WorkerState,
}

/// Guarded state holder enforcing the allowed transitions.
#[derive(Debug)]
pub struct Lifecycle {
  state: Mutex<WorkerState>,
}

impl Lifecycle {
  pub fn new(initial: WorkerState) -> Self {
    Self {
      state: Mutex::new(initial),
    }
  }

  pub fn state(&self) -> WorkerState {
    *self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  pub fn advance(&self, next: WorkerState) -> Result<(), LifecycleError> {
    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    if !state.can_advance_to(next) {
      return Err(LifecycleError {
        from: *state,
        to: next,
      });
    }
    tracing::debug!(from = %*state, to = %next, "worker state change");
    *state = next;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_happy_path() {
    let lifecycle = Lifecycle::new(WorkerState::Parsed);
    for next in [
      WorkerState::Installing,
      WorkerState::Installed,
      WorkerState::Activating,
      WorkerState::Activated,
    ] {
      lifecycle.advance(next).unwrap();
    }
    assert_eq!(lifecycle.state(), WorkerState::Activated);
  }

  #[test]
  fn test_cannot_activate_without_install() {
    let lifecycle = Lifecycle::new(WorkerState::Parsed);
    let err = lifecycle.advance(WorkerState::Activating).unwrap_err();
    assert_eq!(err.from, WorkerState::Parsed);
    assert_eq!(lifecycle.state(), WorkerState::Parsed);
  }

  #[test]
  fn test_redundant_is_terminal() {
    let lifecycle = Lifecycle::new(WorkerState::Parsed);
    lifecycle.advance(WorkerState::Installing).unwrap();
    lifecycle.advance(WorkerState::Redundant).unwrap();
    assert!(lifecycle.advance(WorkerState::Installed).is_err());
    assert!(lifecycle.advance(WorkerState::Activating).is_err());
  }
}
