//! # Processing Options
//!
//! Configuration for one processing run: how units are formed ([`Topology`]),
//! which paths are considered, whether identical branches are deduplicated,
//! and how units are executed ([`ExecutionStrategy`]).
//!
//! Options round-trip through JSON with camelCase keys:
//!
//! ```rust
//! use treeweave::options::{ProcessingOptions, Topology};
//!
//! let options = ProcessingOptions::from_json(r#"{ "topology": "itemGraft" }"#).unwrap();
//! assert_eq!(options.topology, Topology::ItemGraft);
//! assert!(options.group_identical_branches);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for invalid processing options.
#[derive(Error, Debug)]
pub enum OptionsError {
  /// Concurrent execution needs room for at least one unit in flight.
  #[error("concurrent execution requires max_in_flight >= 1")]
  InvalidConcurrency,
  /// The options document could not be parsed.
  #[error("invalid options document: {0}")]
  Json(#[from] serde_json::Error),
}

/// How input units are formed and where outputs are placed.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Topology {
  /// One call per item per path; output at the same path.
  ItemToItem,
  /// One call per item per path; output at the path with the item index appended.
  ItemGraft,
  /// One call over every item of every tree; output at `{0}`.
  BranchFlatten,
  /// One call per path with the whole branch; output at the same path.
  BranchToBranch,
}

impl Topology {
  /// True for the item-wise topologies.
  pub fn is_item_wise(self) -> bool {
    matches!(self, Topology::ItemToItem | Topology::ItemGraft)
  }
}

/// How processing units are executed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum ExecutionStrategy {
  /// One unit at a time, each awaited before the next starts.
  #[default]
  Sequential,
  /// Up to `max_in_flight` units polled at once; results applied in unit order.
  ///
  /// Only valid when the unit function is reentrant.
  #[serde(rename_all = "camelCase")]
  Concurrent {
    /// Maximum number of units running at the same time.
    max_in_flight: usize,
  },
}

fn default_group_identical_branches() -> bool {
  true
}

/// Options for a processing run.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
  /// Unit formation and output placement policy.
  pub topology: Topology,
  /// Only process paths present in every input tree.
  #[serde(default)]
  pub only_matching_paths: bool,
  /// Share one invocation between paths with identical scalar branches.
  #[serde(default = "default_group_identical_branches")]
  pub group_identical_branches: bool,
  /// Execution strategy.
  #[serde(default)]
  pub execution: ExecutionStrategy,
}

impl ProcessingOptions {
  /// Creates options for `topology` with default flags.
  pub fn new(topology: Topology) -> Self {
    Self {
      topology,
      only_matching_paths: false,
      group_identical_branches: true,
      execution: ExecutionStrategy::Sequential,
    }
  }

  /// Sets whether only paths shared by every tree are processed.
  pub fn with_only_matching_paths(mut self, only_matching_paths: bool) -> Self {
    self.only_matching_paths = only_matching_paths;
    self
  }

  /// Sets whether identical branches share one invocation.
  pub fn with_group_identical_branches(mut self, group: bool) -> Self {
    self.group_identical_branches = group;
    self
  }

  /// Sets the execution strategy.
  pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
    self.execution = execution;
    self
  }

  /// Checks the options for values that cannot run.
  pub fn validate(&self) -> Result<(), OptionsError> {
    match self.execution {
      ExecutionStrategy::Concurrent { max_in_flight: 0 } => {
        Err(OptionsError::InvalidConcurrency)
      }
      _ => Ok(()),
    }
  }

  /// Parses and validates options from a JSON document.
  pub fn from_json(json: &str) -> Result<Self, OptionsError> {
    let options: Self = serde_json::from_str(json)?;
    options.validate()?;
    Ok(options)
  }
}
