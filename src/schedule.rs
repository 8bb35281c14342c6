//! Processing units: expansion of a plan, input gathering and output scatter.

use crate::item::TreeItem;
use crate::normalize::item_or_last;
use crate::options::Topology;
use crate::path::TreePath;
use crate::paths::BranchResolver;
use crate::planner::{has_data, max_item_count, ProcessingPlan};
use crate::tree::{Branches, NamedTrees};
use tracing::debug;

/// One invocation of the unit function.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessingUnit {
  /// Path to read inputs from; `None` flattens every branch of every tree.
  pub input_path: Option<TreePath>,
  /// Item to read; `None` passes whole branches.
  pub item_index: Option<usize>,
  /// Paths the output is written to.
  pub target_paths: Vec<TreePath>,
}

impl ProcessingUnit {
  /// The single unit of a flattening run.
  pub fn flatten() -> Self {
    Self {
      input_path: None,
      item_index: None,
      target_paths: vec![TreePath::root()],
    }
  }
}

/// Expands `plan` into units, in plan order and then item order.
pub fn expand_units<T: TreeItem>(
  trees: &NamedTrees<T>,
  plan: &ProcessingPlan,
  topology: Topology,
) -> Vec<ProcessingUnit> {
  let units: Vec<ProcessingUnit> = match topology {
    Topology::BranchFlatten => {
      if has_data(trees) {
        vec![ProcessingUnit::flatten()]
      } else {
        Vec::new()
      }
    }
    Topology::ItemToItem | Topology::ItemGraft => {
      let resolver = BranchResolver::new(trees);
      plan
        .entries()
        .iter()
        .flat_map(|entry| {
          let count = max_item_count(&resolver, &entry.primary_path);
          (0..count).map(move |index| ProcessingUnit {
            input_path: Some(entry.primary_path.clone()),
            item_index: Some(index),
            target_paths: entry.target_paths.clone(),
          })
        })
        .collect()
    }
    Topology::BranchToBranch => plan
      .entries()
      .iter()
      .map(|entry| ProcessingUnit {
        input_path: Some(entry.primary_path.clone()),
        item_index: None,
        target_paths: entry.target_paths.clone(),
      })
      .collect(),
  };

  debug!(?topology, units = units.len(), "expanded processing units");
  units
}

/// Builds the unit function's input: one list per input tree.
pub fn gather_inputs<T: TreeItem>(
  resolver: &BranchResolver<'_, T>,
  unit: &ProcessingUnit,
) -> Branches<T> {
  let trees = resolver.trees();
  let Some(path) = &unit.input_path else {
    return trees
      .iter()
      .map(|(name, tree)| (name.clone(), tree.all_items().cloned().collect()))
      .collect();
  };

  trees
    .keys()
    .map(|name| {
      let branch = resolver.branch(name, path, true).unwrap_or(&[]);
      let items = match unit.item_index {
        Some(index) => item_or_last(branch, index).cloned().into_iter().collect(),
        None => branch.to_vec(),
      };
      (name.clone(), items)
    })
    .collect()
}

/// Path an output lands on for one target of a unit.
pub fn output_path(topology: Topology, target: &TreePath, unit: &ProcessingUnit) -> TreePath {
  match (topology, unit.item_index) {
    (Topology::ItemGraft, Some(index)) => target.append_element(index),
    _ => target.clone(),
  }
}

/// Appends a unit's results to the named output trees at every target path.
pub fn scatter_outputs<T: TreeItem>(
  outputs: &mut NamedTrees<T>,
  unit: &ProcessingUnit,
  topology: Topology,
  results: Branches<T>,
) {
  for target in &unit.target_paths {
    let path = output_path(topology, target, unit);
    for (name, items) in &results {
      outputs
        .entry(name.clone())
        .or_default()
        .append_range(items.iter().cloned(), path.clone());
    }
  }
}
