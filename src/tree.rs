//! # Data Trees
//!
//! A [`DataTree`] maps [`TreePath`]s to ordered branches of items. Paths keep
//! their insertion order, which is the order the engine visits them in.
//!
//! A tree with exactly one path is *flat*: it represents a plain list (usually
//! at `{0}`) or, with a single item, a scalar. Flat trees take part in the
//! broadcast rules of [`paths`](crate::paths).
//!
//! ## Example
//!
//! ```rust
//! use treeweave::path::TreePath;
//! use treeweave::tree::DataTree;
//!
//! let mut tree = DataTree::new();
//! tree.append_range(vec![1, 2], TreePath::from([0, 0]));
//! tree.append(3, TreePath::from([0, 1]));
//! assert_eq!(tree.path_count(), 2);
//! assert_eq!(tree.data_count(), 3);
//! ```

use crate::path::TreePath;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::marker::PhantomData;

/// Named collection of trees, keyed by logical role.
pub type NamedTrees<T> = BTreeMap<String, DataTree<T>>;

/// Named collection of flat item lists; the input and output of one unit.
pub type Branches<T> = BTreeMap<String, Vec<T>>;

/// Insertion-ordered mapping from path to branch.
#[derive(Clone, Debug)]
pub struct DataTree<T> {
  paths: Vec<TreePath>,
  branches: HashMap<TreePath, Vec<T>>,
}

impl<T> Default for DataTree<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> DataTree<T> {
  /// Creates an empty tree.
  pub fn new() -> Self {
    Self {
      paths: Vec::new(),
      branches: HashMap::new(),
    }
  }

  /// Creates a flat tree holding `items` at `{0}`.
  pub fn flat(items: impl IntoIterator<Item = T>) -> Self {
    let mut tree = Self::new();
    tree.append_range(items, TreePath::root());
    tree
  }

  /// Creates a flat tree holding a single item at `{0}`.
  pub fn scalar(item: T) -> Self {
    Self::flat(std::iter::once(item))
  }

  /// Builds a tree from `(path, items)` pairs. Repeated paths accumulate.
  pub fn from_branches<P, I>(branches: impl IntoIterator<Item = (P, I)>) -> Self
  where
    P: Into<TreePath>,
    I: IntoIterator<Item = T>,
  {
    let mut tree = Self::new();
    for (path, items) in branches {
      tree.append_range(items, path.into());
    }
    tree
  }

  /// Returns the branch at `path`, creating it empty if missing.
  pub fn ensure_path(&mut self, path: TreePath) -> &mut Vec<T> {
    if !self.branches.contains_key(&path) {
      self.paths.push(path.clone());
    }
    self.branches.entry(path).or_default()
  }

  /// Appends one item to the branch at `path`.
  pub fn append(&mut self, item: T, path: TreePath) {
    self.ensure_path(path).push(item);
  }

  /// Appends `items` to the branch at `path`. The path is created even when
  /// `items` is empty.
  pub fn append_range(&mut self, items: impl IntoIterator<Item = T>, path: TreePath) {
    self.ensure_path(path).extend(items);
  }

  /// The branch at `path`, if the path exists.
  pub fn branch(&self, path: &TreePath) -> Option<&[T]> {
    self.branches.get(path).map(Vec::as_slice)
  }

  /// True if the tree has a branch at `path` (possibly empty).
  pub fn contains_path(&self, path: &TreePath) -> bool {
    self.branches.contains_key(path)
  }

  /// Paths in insertion order.
  pub fn paths(&self) -> &[TreePath] {
    &self.paths
  }

  /// Iterates `(path, branch)` pairs in insertion order.
  pub fn branches(&self) -> impl Iterator<Item = (&TreePath, &[T])> + '_ {
    self.paths
      .iter()
      .filter_map(move |path| self.branches.get(path).map(|b| (path, b.as_slice())))
  }

  /// Number of distinct paths.
  pub fn path_count(&self) -> usize {
    self.paths.len()
  }

  /// Sum of all branch lengths.
  pub fn data_count(&self) -> usize {
    self.branches.values().map(Vec::len).sum()
  }

  /// True if the tree has no paths.
  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }

  /// True if the tree has exactly one path.
  pub fn is_flat(&self) -> bool {
    self.paths.len() == 1
  }

  /// True if the tree is flat and holds exactly one item.
  pub fn is_scalar(&self) -> bool {
    self.is_flat() && self.data_count() == 1
  }

  /// The only `(path, branch)` of a flat tree.
  pub fn sole_branch(&self) -> Option<(&TreePath, &[T])> {
    if !self.is_flat() {
      return None;
    }
    self.branches().next()
  }

  /// Iterates every item, branch by branch, in path order.
  pub fn all_items(&self) -> impl Iterator<Item = &T> + '_ {
    self.branches().flat_map(|(_, branch)| branch.iter())
  }
}

impl<T: PartialEq> PartialEq for DataTree<T> {
  fn eq(&self, other: &Self) -> bool {
    self.paths == other.paths && self.branches == other.branches
  }
}

impl<T: Eq> Eq for DataTree<T> {}

impl<T: Serialize> Serialize for DataTree<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.paths.len()))?;
    for (path, branch) in self.branches() {
      map.serialize_entry(path, branch)?;
    }
    map.end()
  }
}

struct DataTreeVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for DataTreeVisitor<T> {
  type Value = DataTree<T>;

  fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("a map from tree paths to item lists")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
    let mut tree = DataTree::new();
    while let Some((path, items)) = access.next_entry::<TreePath, Vec<T>>()? {
      tree.append_range(items, path);
    }
    Ok(tree)
  }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for DataTree<T> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(DataTreeVisitor(PhantomData))
  }
}
