//! # Processing Plans
//!
//! Turns a set of named trees into an ordered [`ProcessingPlan`]: one
//! [`PlanEntry`] per path that needs its own invocation, each listing the
//! paths that receive its result.
//!
//! Planning runs in three steps:
//!
//! 1. Candidate paths: the union (or intersection) of all tree paths, minus
//!    the own paths of flat trees that only broadcast into other candidates.
//! 2. Grouping: for simple scalar item types, paths whose per-tree branches
//!    are identical fold into the first such path's entry.
//! 3. Every remaining path becomes an entry.

use crate::item::TreeItem;
use crate::keyer::{branch_key, BranchKey};
use crate::options::{ProcessingOptions, Topology};
use crate::path::TreePath;
use crate::paths::{
  all_unique_paths, matching_paths, other_tree_paths, should_broadcast_flat_tree,
  BranchResolver, BranchSource,
};
use crate::tree::NamedTrees;
use std::collections::HashMap;
use tracing::debug;

/// One invocation's worth of work: a primary path and the paths its result
/// is written to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlanEntry {
  /// Path whose branches form the input.
  pub primary_path: TreePath,
  /// Paths receiving the output. Always contains `primary_path` first.
  pub target_paths: Vec<TreePath>,
}

impl PlanEntry {
  /// Creates an ungrouped entry targeting its own path.
  pub fn new(primary_path: TreePath) -> Self {
    Self {
      target_paths: vec![primary_path.clone()],
      primary_path,
    }
  }
}

/// Ordered, immutable list of plan entries.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcessingPlan {
  entries: Vec<PlanEntry>,
}

impl ProcessingPlan {
  /// Entries in processing order.
  pub fn entries(&self) -> &[PlanEntry] {
    &self.entries
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// True if there is nothing to process.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Total number of target paths across all entries.
  pub fn target_count(&self) -> usize {
    self.entries.iter().map(|e| e.target_paths.len()).sum()
  }
}

/// Work estimate of a run, available before anything executes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ProcessingMetrics {
  /// Number of data items (or target branches) the run will produce for.
  pub data_count: usize,
  /// Number of unit invocations.
  pub iteration_count: usize,
}

/// True if any tree holds at least one item.
pub fn has_data<T>(trees: &NamedTrees<T>) -> bool {
  trees.values().any(|tree| tree.data_count() > 0)
}

/// Builds the processing plan for `trees`.
pub fn build_processing_plan<T: TreeItem>(
  trees: &NamedTrees<T>,
  only_matching_paths: bool,
  group_identical_branches: bool,
) -> ProcessingPlan {
  if !has_data(trees) {
    debug!("no input data; empty processing plan");
    return ProcessingPlan::default();
  }

  let mut candidates = if only_matching_paths {
    matching_paths(trees)
  } else {
    all_unique_paths(trees)
  };
  exclude_broadcast_contributors(trees, &mut candidates);

  let entries = if group_identical_branches && T::is_groupable() {
    group_by_content(trees, candidates)
  } else {
    candidates.into_iter().map(PlanEntry::new).collect()
  };

  let plan = ProcessingPlan { entries };
  debug!(
    entries = plan.len(),
    targets = plan.target_count(),
    only_matching_paths,
    group_identical_branches,
    "built processing plan"
  );
  plan
}

// A flat tree's own path is dropped when the tree broadcasts into every other
// candidate and nobody else owns that path. The last candidate is never dropped.
fn exclude_broadcast_contributors<T>(trees: &NamedTrees<T>, candidates: &mut Vec<TreePath>) {
  for (name, tree) in trees {
    let Some((own_path, _)) = tree.sole_branch() else {
      continue;
    };
    if !candidates.contains(own_path) {
      continue;
    }

    let owned_elsewhere = trees
      .iter()
      .any(|(other, t)| other != name && t.contains_path(own_path));
    if owned_elsewhere {
      continue;
    }

    let mut remaining = candidates.iter().filter(|p| *p != own_path).peekable();
    if remaining.peek().is_none() {
      continue;
    }

    let others = other_tree_paths(trees, name);
    if remaining.all(|p| should_broadcast_flat_tree(tree, p, &others)) {
      debug!(tree = %name, path = %own_path, "flat tree is broadcast-only");
      candidates.retain(|p| p != own_path);
    }
  }
}

fn group_by_content<T: TreeItem>(
  trees: &NamedTrees<T>,
  candidates: Vec<TreePath>,
) -> Vec<PlanEntry> {
  let resolver = BranchResolver::new(trees);
  let mut entries: Vec<PlanEntry> = Vec::with_capacity(candidates.len());
  let mut seen: HashMap<BranchKey, usize> = HashMap::new();

  for path in candidates {
    let key = branch_key(trees.keys().map(|name| {
      let branch = resolver.branch(name, &path, true).unwrap_or(&[]);
      (name.as_str(), branch)
    }));

    match seen.get(&key) {
      Some(&index) => {
        debug!(
          path = %path,
          primary = %entries[index].primary_path,
          "grouped identical branches"
        );
        entries[index].target_paths.push(path);
      }
      None => {
        seen.insert(key, entries.len());
        entries.push(PlanEntry::new(path));
      }
    }
  }
  entries
}

/// Longest branch supplied at `path`.
///
/// Broadcast branches only count when no tree owns the path directly.
pub fn max_item_count<T>(resolver: &BranchResolver<'_, T>, path: &TreePath) -> usize {
  let mut direct = 0;
  let mut broadcast = 0;
  for name in resolver.trees().keys() {
    match resolver.resolve(name, path) {
      BranchSource::Direct(branch) => direct = direct.max(branch.len()),
      BranchSource::Broadcast(branch) => broadcast = broadcast.max(branch.len()),
      BranchSource::Missing => {}
    }
  }
  if direct > 0 {
    direct
  } else {
    broadcast
  }
}

/// Estimates data and iteration counts for a run without executing it.
pub fn calculate_processing_metrics<T: TreeItem>(
  trees: &NamedTrees<T>,
  options: &ProcessingOptions,
) -> ProcessingMetrics {
  if !has_data(trees) {
    return ProcessingMetrics::default();
  }

  match options.topology {
    Topology::BranchFlatten => ProcessingMetrics {
      data_count: 1,
      iteration_count: 1,
    },
    Topology::ItemToItem | Topology::ItemGraft => {
      let plan = build_processing_plan(
        trees,
        options.only_matching_paths,
        options.group_identical_branches,
      );
      let resolver = BranchResolver::new(trees);
      let items = plan
        .entries()
        .iter()
        .map(|entry| max_item_count(&resolver, &entry.primary_path))
        .sum();
      ProcessingMetrics {
        data_count: items,
        iteration_count: items,
      }
    }
    Topology::BranchToBranch => {
      let plan = build_processing_plan(
        trees,
        options.only_matching_paths,
        options.group_identical_branches,
      );
      ProcessingMetrics {
        data_count: plan.target_count(),
        iteration_count: plan.len(),
      }
    }
  }
}
