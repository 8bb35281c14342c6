//! # Tree Paths
//!
//! A [`TreePath`] addresses one branch inside a [`DataTree`](crate::tree::DataTree).
//! It is an immutable sequence of non-negative indices, written in the host's
//! notation as `{0;1;2}`.
//!
//! ## Example
//!
//! ```rust
//! use treeweave::path::TreePath;
//!
//! let path: TreePath = "{0;1}".parse().unwrap();
//! assert_eq!(path.depth(), 2);
//! assert_eq!(path.append_element(3).to_string(), "{0;1;3}");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a path string cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathParseError {
  /// An index segment is not a non-negative integer.
  #[error("invalid path index '{segment}' in '{input}'")]
  InvalidIndex {
    /// The full input text.
    input: String,
    /// The offending segment.
    segment: String,
  },
  /// Opening and closing braces do not pair up.
  #[error("unbalanced braces in path '{0}'")]
  UnbalancedBraces(String),
}

/// Location of a branch inside a data tree.
///
/// Two paths are equal iff their index sequences are equal. Paths order
/// lexicographically by index sequence.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct TreePath(Vec<usize>);

impl TreePath {
  /// Creates a path from its indices.
  pub fn new(indices: impl Into<Vec<usize>>) -> Self {
    Self(indices.into())
  }

  /// The conventional path of a flat list, `{0}`.
  pub fn root() -> Self {
    Self(vec![0])
  }

  /// Returns the path indices.
  #[inline]
  pub fn indices(&self) -> &[usize] {
    &self.0
  }

  /// Number of indices in the path.
  #[inline]
  pub fn depth(&self) -> usize {
    self.0.len()
  }

  /// Returns a new path with `index` appended (grafting).
  pub fn append_element(&self, index: usize) -> Self {
    let mut indices = Vec::with_capacity(self.0.len() + 1);
    indices.extend_from_slice(&self.0);
    indices.push(index);
    Self(indices)
  }

  /// True if this path is exactly `{0}`.
  #[inline]
  pub fn is_root(&self) -> bool {
    self.0.as_slice() == [0]
  }

  /// True if the first index is `0` (`{0}`, `{0;..}`).
  #[inline]
  pub fn starts_with_root(&self) -> bool {
    self.0.first() == Some(&0)
  }
}

impl From<Vec<usize>> for TreePath {
  fn from(indices: Vec<usize>) -> Self {
    Self(indices)
  }
}

impl From<&[usize]> for TreePath {
  fn from(indices: &[usize]) -> Self {
    Self(indices.to_vec())
  }
}

impl<const N: usize> From<[usize; N]> for TreePath {
  fn from(indices: [usize; N]) -> Self {
    Self(indices.to_vec())
  }
}

impl fmt::Display for TreePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("{")?;
    for (i, index) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str(";")?;
      }
      write!(f, "{}", index)?;
    }
    f.write_str("}")
  }
}

impl FromStr for TreePath {
  type Err = PathParseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let inner = match (trimmed.strip_prefix('{'), trimmed.ends_with('}')) {
      (Some(rest), true) => &rest[..rest.len() - 1],
      (None, false) => trimmed,
      _ => return Err(PathParseError::UnbalancedBraces(s.to_string())),
    };

    if inner.trim().is_empty() {
      return Ok(Self(Vec::new()));
    }

    inner
      .split(';')
      .map(|segment| {
        segment
          .trim()
          .parse::<usize>()
          .map_err(|_| PathParseError::InvalidIndex {
            input: s.to_string(),
            segment: segment.to_string(),
          })
      })
      .collect::<Result<Vec<_>, _>>()
      .map(Self)
  }
}

impl Serialize for TreePath {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for TreePath {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
  }
}
