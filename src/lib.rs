//! # TreeWeave
//!
//! Path-matched, broadcasting processing of sparse data trees in pure Rust.
//!
//! A data tree maps paths such as `{0;1}` to ordered branches of items. TreeWeave
//! takes several independently shaped trees, decides which branches belong
//! together, lets flat inputs broadcast across structured siblings, skips
//! recomputing identical branches, and runs a user-supplied async function per
//! item or per branch. Results are written back to new trees under one of four
//! topologies.
//!
//! ## Key Features
//!
//! - **Broadcasting**: A single value or flat list feeds every branch of its siblings
//!   unless a same-path value exists
//! - **Deduplication**: Identical scalar branches share one invocation
//! - **Topologies**: Item-to-item, item-graft, branch-flatten and branch-to-branch
//! - **Async-First**: Any async unit function; runtime-agnostic
//! - **Cooperative Cancellation**: Checked between units via `CancellationToken`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use treeweave::prelude::*;
//!
//! # async fn example() -> Result<(), ProcessingError<std::io::Error>> {
//! let mut trees = NamedTrees::new();
//! trees.insert("a".to_string(), DataTree::scalar(10));
//! trees.insert(
//!     "b".to_string(),
//!     DataTree::from_branches([
//!         (TreePath::from([0, 0]), vec![1, 2]),
//!         (TreePath::from([0, 1]), vec![3]),
//!     ]),
//! );
//!
//! let mut processor = DataTreeProcessor::new(ProcessingOptions::new(Topology::ItemToItem));
//! let outputs = processor
//!     .run(&trees, |inputs: Branches<i32>| async move {
//!         let sum: i32 = inputs.values().flatten().sum();
//!         Ok::<_, std::io::Error>(Branches::from([("sum".to_string(), vec![sum])]))
//!     })
//!     .await?;
//! // `a` broadcasts into both of `b`'s branches
//! assert_eq!(outputs["sum"].branch(&TreePath::from([0, 0])), Some(&[11, 12][..]));
//! # Ok(())
//! # }
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Error taxonomy for processing runs.
pub mod error;
/// Item capability for values stored in trees.
pub mod item;
/// Content keys for identical-branch detection.
pub mod keyer;
/// Branch length normalization.
pub mod normalize;
/// Processing options and configuration.
pub mod options;
/// Tree paths.
pub mod path;
/// Path sets and broadcast rules.
pub mod paths;
/// Processing plans and metrics.
pub mod planner;
/// The processing orchestrator.
pub mod processor;
/// Processing units.
pub mod schedule;
/// Data trees.
pub mod tree;

/// Commonly used types.
pub mod prelude {
  pub use crate::error::{BoxError, ProcessingError};
  pub use crate::item::TreeItem;
  pub use crate::options::{ExecutionStrategy, ProcessingOptions, Topology};
  pub use crate::path::TreePath;
  pub use crate::planner::{PlanEntry, ProcessingMetrics, ProcessingPlan};
  pub use crate::processor::DataTreeProcessor;
  pub use crate::schedule::ProcessingUnit;
  pub use crate::tree::{Branches, DataTree, NamedTrees};
  pub use tokio_util::sync::CancellationToken;
}

#[cfg(test)]
mod normalize_test;
#[cfg(test)]
mod options_test;
#[cfg(test)]
mod planner_test;
