//! # Error Handling
//!
//! Failures of a processing run. Configuration problems are reported before
//! any unit executes; cancellation is a normal stop signal; errors from the
//! unit function are passed through unchanged.
//!
//! Nothing here retries or suppresses. Output already scattered by finished
//! units stays in the caller's trees when [`run_into`] returns an error.
//!
//! [`run_into`]: crate::processor::DataTreeProcessor::run_into

use crate::options::OptionsError;
use thiserror::Error;

/// Boxed error type for unit functions that do not define their own.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error returned by a processing run.
///
/// `E` is the unit function's error type.
#[derive(Error, Debug)]
pub enum ProcessingError<E> {
  /// The options cannot run; no unit was executed.
  #[error("invalid processing options: {0}")]
  InvalidOptions(#[from] OptionsError),
  /// The cancellation token fired between units.
  #[error("processing cancelled after {completed} of {total} units")]
  Cancelled {
    /// Units whose output was scattered.
    completed: usize,
    /// Units in the run.
    total: usize,
  },
  /// The unit function failed.
  #[error("unit function failed: {0}")]
  Function(#[source] E),
}

impl<E> ProcessingError<E> {
  /// True if the run stopped because it was cancelled.
  pub fn is_cancelled(&self) -> bool {
    matches!(self, ProcessingError::Cancelled { .. })
  }

  /// The unit function's error, if that is what stopped the run.
  pub fn into_function_error(self) -> Option<E> {
    match self {
      ProcessingError::Function(error) => Some(error),
      _ => None,
    }
  }
}
