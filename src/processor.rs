//! # Data Tree Processor
//!
//! Runs a user-supplied async function over a set of named data trees.
//!
//! A run builds a [`ProcessingPlan`], expands it into [`ProcessingUnit`]s for
//! the configured [`Topology`](crate::options::Topology), and for every unit
//! gathers one input list per tree, awaits the function and appends its named
//! output lists to the output trees at each target path.
//!
//! ## Execution
//!
//! Units run one at a time by default. The unit function may call into
//! non-reentrant host APIs, so concurrent execution is opt-in through
//! [`ExecutionStrategy::Concurrent`]; its results are still applied in unit
//! order, so output trees do not depend on the strategy.
//!
//! ## Cancellation and progress
//!
//! The [`CancellationToken`] is checked before each unit starts; a unit that
//! has started always finishes and is scattered. The progress callback gets
//! `(0, total)` first and `(k, total)` after the k-th unit.
//!
//! ## Example
//!
//! ```rust
//! use treeweave::options::{ProcessingOptions, Topology};
//! use treeweave::processor::DataTreeProcessor;
//! use treeweave::tree::{Branches, DataTree, NamedTrees};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let mut trees = NamedTrees::new();
//! trees.insert("x".to_string(), DataTree::flat(vec![1, 2, 3]));
//!
//! let mut processor = DataTreeProcessor::new(ProcessingOptions::new(Topology::ItemToItem));
//! let outputs = processor
//!     .run(&trees, |inputs: Branches<i32>| async move {
//!         let doubled: Vec<i32> = inputs["x"].iter().map(|v| v * 2).collect();
//!         Ok::<_, std::io::Error>(Branches::from([("y".to_string(), doubled)]))
//!     })
//!     .await?;
//! assert_eq!(outputs["y"].data_count(), 3);
//! # Ok(())
//! # }
//! ```

use crate::error::ProcessingError;
use crate::item::TreeItem;
use crate::options::{ExecutionStrategy, ProcessingOptions};
use crate::paths::BranchResolver;
use crate::planner::{
  build_processing_plan, calculate_processing_metrics, ProcessingMetrics, ProcessingPlan,
};
use crate::schedule::{expand_units, gather_inputs, scatter_outputs, ProcessingUnit};
use crate::tree::{Branches, NamedTrees};
use futures::{future, stream, StreamExt};
use std::fmt;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

/// Progress callback: `(completed units, total units)`.
pub type ProgressCallback = Box<dyn FnMut(usize, usize) + Send>;

/// Orchestrates plan building, unit execution and output scatter.
pub struct DataTreeProcessor {
  options: ProcessingOptions,
  progress: Option<ProgressCallback>,
  cancellation: CancellationToken,
}

impl fmt::Debug for DataTreeProcessor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DataTreeProcessor")
      .field("options", &self.options)
      .field("progress", &self.progress.is_some())
      .field("cancelled", &self.cancellation.is_cancelled())
      .finish()
  }
}

impl DataTreeProcessor {
  /// Creates a processor with the given options.
  pub fn new(options: ProcessingOptions) -> Self {
    Self {
      options,
      progress: None,
      cancellation: CancellationToken::new(),
    }
  }

  /// Sets the progress callback.
  pub fn with_progress<F>(mut self, callback: F) -> Self
  where
    F: FnMut(usize, usize) + Send + 'static,
  {
    self.progress = Some(Box::new(callback));
    self
  }

  /// Sets the cancellation token checked between units.
  pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
    self.cancellation = token;
    self
  }

  /// The processing options.
  pub fn options(&self) -> &ProcessingOptions {
    &self.options
  }

  /// A handle to this processor's cancellation token.
  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancellation.clone()
  }

  /// Builds the processing plan for `trees`.
  pub fn plan<T: TreeItem>(&self, trees: &NamedTrees<T>) -> ProcessingPlan {
    build_processing_plan(
      trees,
      self.options.only_matching_paths,
      self.options.group_identical_branches,
    )
  }

  /// Expands the plan for `trees` into the units a run would execute.
  pub fn units<T: TreeItem>(&self, trees: &NamedTrees<T>) -> Vec<ProcessingUnit> {
    expand_units(trees, &self.plan(trees), self.options.topology)
  }

  /// Work estimate for `trees`, without running anything.
  pub fn metrics<T: TreeItem>(&self, trees: &NamedTrees<T>) -> ProcessingMetrics {
    calculate_processing_metrics(trees, &self.options)
  }

  /// Runs `function` over `trees` and returns the new output trees.
  pub async fn run<T, F, Fut, E>(
    &mut self,
    trees: &NamedTrees<T>,
    function: F,
  ) -> Result<NamedTrees<T>, ProcessingError<E>>
  where
    T: TreeItem,
    F: FnMut(Branches<T>) -> Fut,
    Fut: Future<Output = Result<Branches<T>, E>>,
  {
    let mut outputs = NamedTrees::new();
    self.run_into(trees, function, &mut outputs).await?;
    Ok(outputs)
  }

  /// Runs `function` over `trees`, appending results to `outputs`.
  ///
  /// On error, `outputs` keeps everything scattered by the units that
  /// finished before the failure or cancellation.
  pub async fn run_into<T, F, Fut, E>(
    &mut self,
    trees: &NamedTrees<T>,
    function: F,
    outputs: &mut NamedTrees<T>,
  ) -> Result<(), ProcessingError<E>>
  where
    T: TreeItem,
    F: FnMut(Branches<T>) -> Fut,
    Fut: Future<Output = Result<Branches<T>, E>>,
  {
    self.options.validate()?;

    let units = self.units(trees);
    self.report(0, units.len());

    match self.options.execution {
      ExecutionStrategy::Sequential => {
        self.run_sequential(trees, &units, function, outputs).await?
      }
      ExecutionStrategy::Concurrent { max_in_flight } => {
        self
          .run_concurrent(trees, &units, max_in_flight, function, outputs)
          .await?
      }
    }

    info!(
      topology = ?self.options.topology,
      units = units.len(),
      output_trees = outputs.len(),
      "processing complete"
    );
    Ok(())
  }

  async fn run_sequential<T, F, Fut, E>(
    &mut self,
    trees: &NamedTrees<T>,
    units: &[ProcessingUnit],
    mut function: F,
    outputs: &mut NamedTrees<T>,
  ) -> Result<(), ProcessingError<E>>
  where
    T: TreeItem,
    F: FnMut(Branches<T>) -> Fut,
    Fut: Future<Output = Result<Branches<T>, E>>,
  {
    let topology = self.options.topology;
    let total = units.len();
    let resolver = BranchResolver::new(trees);

    for (completed, unit) in units.iter().enumerate() {
      if self.cancellation.is_cancelled() {
        warn!(completed, total, "processing cancelled");
        return Err(ProcessingError::Cancelled { completed, total });
      }

      trace!(input_path = ?unit.input_path, item_index = ?unit.item_index, "running unit");
      let results = function(gather_inputs(&resolver, unit))
        .await
        .map_err(ProcessingError::Function)?;
      scatter_outputs(outputs, unit, topology, results);
      self.report(completed + 1, total);
    }
    Ok(())
  }

  async fn run_concurrent<T, F, Fut, E>(
    &mut self,
    trees: &NamedTrees<T>,
    units: &[ProcessingUnit],
    max_in_flight: usize,
    mut function: F,
    outputs: &mut NamedTrees<T>,
  ) -> Result<(), ProcessingError<E>>
  where
    T: TreeItem,
    F: FnMut(Branches<T>) -> Fut,
    Fut: Future<Output = Result<Branches<T>, E>>,
  {
    let topology = self.options.topology;
    let total = units.len();
    let token = self.cancellation.clone();
    let resolver = BranchResolver::new(trees);

    let results = stream::iter(units)
      .take_while(move |_| future::ready(!token.is_cancelled()))
      .map(|unit| {
        trace!(
          input_path = ?unit.input_path,
          item_index = ?unit.item_index,
          "starting unit"
        );
        let pending = function(gather_inputs(&resolver, unit));
        async move { (unit, pending.await) }
      })
      .buffered(max_in_flight);
    let mut results = std::pin::pin!(results);

    let mut completed = 0;
    while let Some((unit, result)) = results.next().await {
      let branches = result.map_err(ProcessingError::Function)?;
      scatter_outputs(outputs, unit, topology, branches);
      completed += 1;
      self.report(completed, total);
    }

    if completed < total {
      warn!(completed, total, "processing cancelled");
      return Err(ProcessingError::Cancelled { completed, total });
    }
    Ok(())
  }

  fn report(&mut self, current: usize, total: usize) {
    if let Some(callback) = self.progress.as_mut() {
      callback(current, total);
    }
  }
}
