//! Branch length normalization.
//!
//! Shorter branches repeat their last item when processed alongside longer
//! ones, matching the host's longest-list matching. [`item_or_last`] is the
//! single rule; item-wise scheduling and [`normalize_branch_lengths`] both
//! go through it.

use crate::item::TreeItem;

/// Item at `index`, or the branch's last item when `index` is past the end.
///
/// Returns `None` only for an empty branch.
#[inline]
pub fn item_or_last<T>(branch: &[T], index: usize) -> Option<&T> {
  branch.get(index).or_else(|| branch.last())
}

/// Extends every branch to the length of the longest one.
///
/// Non-empty branches repeat their last item; empty branches are filled with
/// `T::default()` placeholders.
pub fn normalize_branch_lengths<T: TreeItem>(branches: &[Vec<T>]) -> Vec<Vec<T>> {
  let max_length = branches.iter().map(Vec::len).max().unwrap_or(0);

  branches
    .iter()
    .map(|branch| {
      (0..max_length)
        .map(|index| item_or_last(branch, index).cloned().unwrap_or_default())
        .collect()
    })
    .collect()
}
