//! # Path Sets and Broadcasting
//!
//! Computes which paths a set of named trees should be processed at, and
//! decides when a flat tree lends its single branch to paths it does not own.
//!
//! ## Broadcast rules
//!
//! A flat tree (one path) broadcasts its branch to a requested path other than
//! its own according to [`should_broadcast_flat_tree`]. The rules let one
//! slider-like input feed every branch of a structured sibling while a value
//! that sits at the exact requested path elsewhere keeps precedence.
//!
//! | Flat tree | Own path | Requested path | Broadcasts |
//! |---|---|---|---|
//! | any | any | no other trees | only a scalar not at `{0}` |
//! | scalar | not `{0}` | any | yes |
//! | scalar | `{0}` | `{0}` | no |
//! | scalar | `{0}` | `{0;..}` | no if another tree owns `{0}` |
//! | list | not `{0}` | any | no |
//! | list | `{0}` | `{0}` | no |
//! | list | `{0}` | `{0;..}` | no if exactly one other top-level path |
//! | list | `{0}` | depth 1 | only with several top-level paths or deeper paths |
//! | list | `{0}` | other depth > 1 | yes |

use crate::path::TreePath;
use crate::tree::{DataTree, NamedTrees};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Every distinct path of every tree, in first-seen order.
///
/// Trees are visited in name order, paths within a tree in insertion order.
pub fn all_unique_paths<T>(trees: &NamedTrees<T>) -> Vec<TreePath> {
  union_of_paths(trees.values())
}

/// Paths present in every tree, in the first tree's order.
pub fn matching_paths<T>(trees: &NamedTrees<T>) -> Vec<TreePath> {
  let mut iter = trees.values();
  let Some(first) = iter.next() else {
    return Vec::new();
  };

  let mut matching: Vec<TreePath> = first.paths().to_vec();
  for tree in iter {
    matching.retain(|path| tree.contains_path(path));
    if matching.is_empty() {
      break;
    }
  }
  matching
}

/// Union of the paths of every tree except `excluded`, in first-seen order.
pub fn other_tree_paths<T>(trees: &NamedTrees<T>, excluded: &str) -> Vec<TreePath> {
  union_of_paths(
    trees
      .iter()
      .filter(|(name, _)| name.as_str() != excluded)
      .map(|(_, tree)| tree),
  )
}

fn union_of_paths<'a, T: 'a>(trees: impl Iterator<Item = &'a DataTree<T>>) -> Vec<TreePath> {
  let mut seen = HashSet::new();
  let mut unique = Vec::new();
  for tree in trees {
    for path in tree.paths() {
      if seen.insert(path) {
        unique.push(path.clone());
      }
    }
  }
  unique
}

/// Shape of the other trees' paths, as far as the broadcast rules look at it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct OtherPaths {
  any: bool,
  contains_root: bool,
  top_level: usize,
  has_deep: bool,
}

impl OtherPaths {
  fn summarize(paths: &[TreePath]) -> Self {
    Self {
      any: !paths.is_empty(),
      contains_root: paths.iter().any(TreePath::is_root),
      top_level: paths.iter().filter(|p| p.depth() == 1).count(),
      has_deep: paths.iter().any(|p| p.depth() > 1),
    }
  }
}

/// Decides whether a flat tree's sole branch should serve `requested_path`.
///
/// `other_tree_paths` is the union of the paths of every other input tree.
/// Trees with more than one path never broadcast.
pub fn should_broadcast_flat_tree<T>(
  flat_tree: &DataTree<T>,
  requested_path: &TreePath,
  other_tree_paths: &[TreePath],
) -> bool {
  broadcast_decision(flat_tree, requested_path, &OtherPaths::summarize(other_tree_paths))
}

fn broadcast_decision<T>(
  flat_tree: &DataTree<T>,
  requested_path: &TreePath,
  others: &OtherPaths,
) -> bool {
  let Some((own_path, _)) = flat_tree.sole_branch() else {
    return false;
  };
  if requested_path.depth() == 0 {
    return false;
  }

  let is_scalar = flat_tree.data_count() == 1;
  let own_is_root = own_path.is_root();

  if !others.any {
    return is_scalar && !own_is_root;
  }

  let requested_is_root = requested_path.is_root();
  let requested_below_root = requested_path.depth() > 1 && requested_path.starts_with_root();

  let decision = match (is_scalar, own_is_root) {
    (true, false) => true,
    (true, true) => {
      if requested_is_root {
        false
      } else if requested_below_root {
        !others.contains_root
      } else {
        true
      }
    }
    (false, false) => false,
    (false, true) => {
      if requested_is_root {
        false
      } else if requested_below_root {
        others.top_level != 1
      } else if requested_path.depth() == 1 {
        others.top_level > 1 || others.has_deep
      } else {
        true
      }
    }
  };

  trace!(
    own_path = %own_path,
    requested = %requested_path,
    scalar = is_scalar,
    broadcast = decision,
    "flat tree broadcast decision"
  );
  decision
}

/// Where a tree's input for a path comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchSource<'a, T> {
  /// The tree owns a non-empty branch at the path.
  Direct(&'a [T]),
  /// The tree is flat and broadcasts its sole branch to the path.
  Broadcast(&'a [T]),
  /// The tree supplies nothing for the path.
  Missing,
}

impl<'a, T> BranchSource<'a, T> {
  /// The supplied branch, if any.
  pub fn branch(self) -> Option<&'a [T]> {
    match self {
      BranchSource::Direct(branch) | BranchSource::Broadcast(branch) => Some(branch),
      BranchSource::Missing => None,
    }
  }
}

/// Resolves branches of one set of trees, many paths at a time.
///
/// The other-tree path summary of every flat tree is computed once up front,
/// so each lookup costs a hash probe plus a constant-time rule check.
#[derive(Debug)]
pub struct BranchResolver<'a, T> {
  trees: &'a NamedTrees<T>,
  flat_others: HashMap<&'a str, OtherPaths>,
}

impl<'a, T> BranchResolver<'a, T> {
  /// Prepares a resolver over `trees`.
  pub fn new(trees: &'a NamedTrees<T>) -> Self {
    let flat_others = trees
      .iter()
      .filter(|(_, tree)| tree.is_flat())
      .map(|(name, _)| {
        let others = other_tree_paths(trees, name);
        (name.as_str(), OtherPaths::summarize(&others))
      })
      .collect();
    Self { trees, flat_others }
  }

  /// The trees being resolved.
  pub fn trees(&self) -> &'a NamedTrees<T> {
    self.trees
  }

  /// Where tree `name`'s input at `path` comes from.
  pub fn resolve(&self, name: &str, path: &TreePath) -> BranchSource<'a, T> {
    let Some(tree) = self.trees.get(name) else {
      return BranchSource::Missing;
    };

    if let Some(branch) = tree.branch(path).filter(|b| !b.is_empty()) {
      return BranchSource::Direct(branch);
    }

    let others = self.flat_others.get(name);
    if let (Some((_, sole)), Some(others)) = (tree.sole_branch(), others) {
      if broadcast_decision(tree, path, others) {
        return BranchSource::Broadcast(sole);
      }
    }

    BranchSource::Missing
  }

  /// The branch tree `name` supplies at `path`; see [`branch_from_tree`].
  pub fn branch(
    &self,
    name: &str,
    path: &TreePath,
    preserve_structure: bool,
  ) -> Option<&'a [T]> {
    match self.resolve(name, path).branch() {
      Some(branch) => Some(branch),
      None if preserve_structure => Some(&[]),
      None => None,
    }
  }
}

/// Resolves the branch tree `name` supplies at `path`, applying broadcasting.
pub fn resolve_branch<'a, T>(
  trees: &'a NamedTrees<T>,
  name: &str,
  path: &TreePath,
) -> BranchSource<'a, T> {
  BranchResolver::new(trees).resolve(name, path)
}

/// The branch tree `name` supplies at `path`.
///
/// Returns the tree's own non-empty branch, else its broadcast branch, else an
/// empty slice when `preserve_structure` is set and `None` otherwise.
pub fn branch_from_tree<'a, T>(
  trees: &'a NamedTrees<T>,
  name: &str,
  path: &TreePath,
  preserve_structure: bool,
) -> Option<&'a [T]> {
  BranchResolver::new(trees).branch(name, path, preserve_structure)
}
