//! Tests for processing plans and metrics.

use crate::options::{ProcessingOptions, Topology};
use crate::path::TreePath;
use crate::paths::BranchResolver;
use crate::planner::{
  build_processing_plan, calculate_processing_metrics, max_item_count, PlanEntry,
  ProcessingMetrics,
};
use crate::tree::{DataTree, NamedTrees};

fn p(indices: &[usize]) -> TreePath {
  TreePath::from(indices)
}

fn named<T>(trees: Vec<(&str, DataTree<T>)>) -> NamedTrees<T> {
  trees
    .into_iter()
    .map(|(name, tree)| (name.to_string(), tree))
    .collect()
}

fn tree(branches: &[(&[usize], &[i32])]) -> DataTree<i32> {
  DataTree::from_branches(branches.iter().map(|(path, items)| (p(path), items.to_vec())))
}

fn primaries(trees: &NamedTrees<i32>, matching: bool, group: bool) -> Vec<TreePath> {
  build_processing_plan(trees, matching, group)
    .entries()
    .iter()
    .map(|e| e.primary_path.clone())
    .collect()
}

#[test]
fn test_broadcast_only_scalar_path_is_excluded() {
  let trees = named(vec![
    ("a", tree(&[(&[0], &[5])])),
    ("b", tree(&[(&[1], &[1, 2, 3])])),
  ]);
  let plan = build_processing_plan(&trees, false, true);
  assert_eq!(plan.entries(), &[PlanEntry::new(p(&[1]))]);
}

#[test]
fn test_lone_flat_tree_is_processed_once() {
  let trees = named(vec![("x", tree(&[(&[0], &[1, 2, 3])]))]);
  assert_eq!(primaries(&trees, false, true), vec![p(&[0])]);
}

#[test]
fn test_mutually_broadcasting_scalars_keep_one_path() {
  let trees = named(vec![
    ("a", tree(&[(&[0], &[5])])),
    ("b", tree(&[(&[1], &[7])])),
  ]);
  assert_eq!(primaries(&trees, false, true), vec![p(&[1])]);
}

#[test]
fn test_flat_path_owned_elsewhere_is_kept() {
  let trees = named(vec![
    ("a", tree(&[(&[0], &[9])])),
    ("b", tree(&[(&[0], &[1]), (&[0, 1], &[2])])),
  ]);
  assert_eq!(primaries(&trees, false, true), vec![p(&[0]), p(&[0, 1])]);
}

#[test]
fn test_root_list_broadcasts_into_deeper_structure() {
  let trees = named(vec![
    ("a", tree(&[(&[0], &[1, 2, 3, 4])])),
    ("b", tree(&[(&[0, 0], &[1, 2]), (&[0, 1], &[1])])),
  ]);
  assert_eq!(primaries(&trees, false, false), vec![p(&[0, 0]), p(&[0, 1])]);
  let resolver = BranchResolver::new(&trees);
  assert_eq!(max_item_count(&resolver, &p(&[0, 0])), 2);
  assert_eq!(max_item_count(&resolver, &p(&[0, 1])), 1);
}

#[test]
fn test_identical_branches_are_grouped() {
  let trees = named(vec![(
    "x",
    tree(&[(&[0], &[1, 2]), (&[1], &[3]), (&[2], &[1, 2])]),
  )]);
  let plan = build_processing_plan(&trees, false, true);
  assert_eq!(plan.len(), 2);
  assert_eq!(plan.entries()[0].primary_path, p(&[0]));
  assert_eq!(plan.entries()[0].target_paths, vec![p(&[0]), p(&[2])]);
  assert_eq!(plan.entries()[1].target_paths, vec![p(&[1])]);
  assert_eq!(plan.target_count(), 3);

  let ungrouped = build_processing_plan(&trees, false, false);
  assert_eq!(ungrouped.len(), 3);
}

#[test]
fn test_text_containing_separators_is_not_grouped() {
  let trees = named(vec![(
    "x",
    DataTree::from_branches([
      (p(&[0]), vec!["a,b".to_string()]),
      (p(&[1]), vec!["a".to_string(), "b".to_string()]),
    ]),
  )]);
  let plan = build_processing_plan(&trees, false, true);
  assert_eq!(plan.entries(), &[PlanEntry::new(p(&[0])), PlanEntry::new(p(&[1]))]);
}

#[test]
fn test_null_and_empty_text_are_not_grouped() {
  let trees = named(vec![(
    "x",
    DataTree::from_branches([(p(&[0]), vec![None]), (p(&[1]), vec![Some(String::new())])]),
  )]);
  assert_eq!(build_processing_plan(&trees, false, true).len(), 2);
}

#[test]
fn test_grouping_compares_every_tree() {
  let trees = named(vec![
    ("x", tree(&[(&[0], &[1]), (&[1], &[1])])),
    ("y", tree(&[(&[0], &[2]), (&[1], &[3])])),
  ]);
  assert_eq!(build_processing_plan(&trees, false, true).len(), 2);
}

#[test]
fn test_non_scalar_items_are_never_grouped() {
  let value = serde_json::json!({"k": 1});
  let trees = named(vec![(
    "x",
    DataTree::from_branches([(p(&[0]), vec![value.clone()]), (p(&[1]), vec![value])]),
  )]);
  assert_eq!(build_processing_plan(&trees, false, true).len(), 2);
}

#[test]
fn test_only_matching_paths() {
  let trees = named(vec![
    ("a", tree(&[(&[0], &[1]), (&[1], &[2])])),
    ("b", tree(&[(&[1], &[3]), (&[2], &[4])])),
  ]);
  assert_eq!(primaries(&trees, true, true), vec![p(&[1])]);
  assert_eq!(primaries(&trees, false, true), vec![p(&[0]), p(&[1]), p(&[2])]);
}

#[test]
fn test_degenerate_inputs_give_empty_plan() {
  assert!(build_processing_plan::<i32>(&NamedTrees::new(), false, true).is_empty());

  let empty_branches = named(vec![("x", tree(&[(&[0], &[]), (&[1], &[])]))]);
  assert!(build_processing_plan(&empty_branches, false, true).is_empty());
}

#[test]
fn test_item_metrics_sum_longest_direct_branches() {
  let trees = named(vec![
    ("a", tree(&[(&[0], &[1, 2, 3, 4])])),
    ("b", tree(&[(&[0, 0], &[1, 2]), (&[0, 1], &[1])])),
  ]);
  let options = ProcessingOptions::new(Topology::ItemToItem);
  assert_eq!(
    calculate_processing_metrics(&trees, &options),
    ProcessingMetrics {
      data_count: 3,
      iteration_count: 3
    }
  );
}

#[test]
fn test_branch_metrics_count_targets_and_entries() {
  let trees = named(vec![(
    "x",
    tree(&[(&[0], &[1]), (&[1], &[1]), (&[2], &[2])]),
  )]);
  let options = ProcessingOptions::new(Topology::BranchToBranch);
  assert_eq!(
    calculate_processing_metrics(&trees, &options),
    ProcessingMetrics {
      data_count: 3,
      iteration_count: 2
    }
  );

  let flatten = ProcessingOptions::new(Topology::BranchFlatten);
  assert_eq!(
    calculate_processing_metrics(&trees, &flatten),
    ProcessingMetrics {
      data_count: 1,
      iteration_count: 1
    }
  );
}

#[test]
fn test_degenerate_metrics_are_zero() {
  let empty: NamedTrees<i32> = NamedTrees::new();
  for topology in [
    Topology::ItemToItem,
    Topology::ItemGraft,
    Topology::BranchFlatten,
    Topology::BranchToBranch,
  ] {
    let metrics = calculate_processing_metrics(&empty, &ProcessingOptions::new(topology));
    assert_eq!(metrics, ProcessingMetrics::default());
  }
}
