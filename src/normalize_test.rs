//! Tests for branch normalization.

use crate::normalize::{item_or_last, normalize_branch_lengths};

#[test]
fn test_item_or_last_repeats_final_item() {
  let branch = ["a", "b"];
  let picked: Vec<_> = (0..4).map(|i| *item_or_last(&branch, i).unwrap()).collect();
  assert_eq!(picked, vec!["a", "b", "b", "b"]);
  assert_eq!(item_or_last::<i32>(&[], 0), None);
}

#[test]
fn test_normalize_pads_to_longest() {
  let branches = vec![vec![1, 2, 3, 4], vec![7, 8], vec![]];
  let normalized = normalize_branch_lengths(&branches);
  assert_eq!(
    normalized,
    vec![vec![1, 2, 3, 4], vec![7, 8, 8, 8], vec![0, 0, 0, 0]]
  );
}

#[test]
fn test_normalize_uses_null_placeholders_for_optional_items() {
  let branches = vec![vec![Some("x".to_string())], vec![]];
  let normalized = normalize_branch_lengths(&branches);
  assert_eq!(normalized[1], vec![None]);
}

#[test]
fn test_normalize_empty_input() {
  let branches: Vec<Vec<i32>> = vec![vec![], vec![]];
  assert_eq!(normalize_branch_lengths(&branches), vec![Vec::<i32>::new(), Vec::new()]);
  assert!(normalize_branch_lengths::<i32>(&[]).is_empty());
}
