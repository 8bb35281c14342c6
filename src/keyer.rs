//! Content keys for detecting identical branch sets.
//!
//! Two paths whose per-tree branches produce the same [`BranchKey`] are
//! computationally identical and may share one unit invocation.

use crate::item::TreeItem;
use std::fmt;

/// Deterministic content key of a set of named branches.
///
/// Rendered as `name:item1,item2|name2:item1`, with names sorted
/// lexicographically. Separators and `\` inside names and items are escaped
/// with `\`, an empty item renders as `\E` and a null item as `\N`, so two
/// keys are equal only when the branches are.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BranchKey(String);

impl BranchKey {
  /// Returns the key as a string slice.
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for BranchKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Computes the content key of `(tree name, branch)` pairs.
///
/// Order of the input does not matter; segments are sorted by name.
pub fn branch_key<'a, T, I>(branches_by_tree: I) -> BranchKey
where
  T: TreeItem,
  I: IntoIterator<Item = (&'a str, &'a [T])>,
{
  let mut segments: Vec<(&str, &[T])> = branches_by_tree.into_iter().collect();
  segments.sort_by(|a, b| a.0.cmp(b.0));

  let mut key = String::new();
  for (i, (name, branch)) in segments.into_iter().enumerate() {
    if i > 0 {
      key.push('|');
    }
    push_escaped(&mut key, name);
    key.push(':');
    for (j, item) in branch.iter().enumerate() {
      if j > 0 {
        key.push(',');
      }
      push_item(&mut key, item);
    }
  }
  BranchKey(key)
}

fn push_item<T: TreeItem>(key: &mut String, item: &T) {
  if item.is_null() {
    key.push_str("\\N");
    return;
  }
  let text = item.key_repr();
  if text.is_empty() {
    key.push_str("\\E");
  } else {
    push_escaped(key, &text);
  }
}

fn push_escaped(key: &mut String, text: &str) {
  for ch in text.chars() {
    if matches!(ch, '\\' | ',' | '|' | ':') {
      key.push('\\');
    }
    key.push(ch);
  }
}
