//! Item capability required of values stored in a data tree.

/// A value that can live in a [`DataTree`](crate::tree::DataTree).
///
/// `Default` supplies the null placeholder used when padding empty branches.
/// [`key_repr`](TreeItem::key_repr) is the natural string form used to detect
/// identical branches, and [`is_groupable`](TreeItem::is_groupable) says whether
/// that string form is a trustworthy equality test for the type.
pub trait TreeItem: Clone + Default + Send + Sync + 'static {
  /// Natural string form of the item.
  fn key_repr(&self) -> String;

  /// True only for simple scalar kinds (string, number, integer, boolean),
  /// whose branches may be deduplicated by content.
  fn is_groupable() -> bool {
    false
  }

  /// True for the null value of a nullable type.
  fn is_null(&self) -> bool {
    false
  }

  /// True if the type has a null value distinct from its other values.
  fn is_nullable() -> bool {
    false
  }
}

macro_rules! scalar_tree_item {
  ($($ty:ty),* $(,)?) => {
    $(
      impl TreeItem for $ty {
        fn key_repr(&self) -> String {
          self.to_string()
        }

        fn is_groupable() -> bool {
          true
        }
      }
    )*
  };
}

scalar_tree_item!(
  String, bool, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
);

impl<T: TreeItem> TreeItem for Option<T> {
  fn key_repr(&self) -> String {
    self.as_ref().map(TreeItem::key_repr).unwrap_or_default()
  }

  // Nested options would key `Some(None)` like `None`.
  fn is_groupable() -> bool {
    T::is_groupable() && !T::is_nullable()
  }

  fn is_null(&self) -> bool {
    self.is_none()
  }

  fn is_nullable() -> bool {
    true
  }
}

// JSON values may be objects or arrays; their text form is not treated as identity.
impl TreeItem for serde_json::Value {
  fn key_repr(&self) -> String {
    match self {
      serde_json::Value::String(s) => s.clone(),
      serde_json::Value::Null => String::new(),
      other => other.to_string(),
    }
  }

  fn is_null(&self) -> bool {
    matches!(self, serde_json::Value::Null)
  }

  fn is_nullable() -> bool {
    true
  }
}
