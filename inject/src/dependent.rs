//! Read and override operations for owner types.

use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::slot::Dependencies;
use crate::value::{factory, value, Value};

/// Implemented by types that own a [`Dependencies`] table.
///
/// Only [`dependencies`](Dependent::dependencies) has to be written; the
/// accessors and the chainable overrides come for free.
pub trait Dependent: Any + Sized {
  fn dependencies(&self) -> &Dependencies<Self>;

  /// Resolves `name` for this instance.
  fn dependency<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
    self.dependencies().get(self, name)
  }

  /// Overrides `name` with a literal value on this instance only.
  fn with_value<T: Any + Send + Sync>(self, name: &str, v: T) -> Self {
    self.dependencies().set_value(name, value(v));
    self
  }

  /// Overrides `name` with a factory that runs lazily, on the next read,
  /// with this instance as its argument.
  fn with_factory<T, F>(self, name: &str, f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&Self) -> T + Send + Sync + 'static,
  {
    self.dependencies().set_factory(name, factory(f));
    self
  }

  /// Applies one value override per entry, in iteration order.
  fn with_dependencies<I, K>(self, overrides: I) -> Self
  where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
  {
    for (name, v) in overrides {
      self.dependencies().set_value(name.as_ref(), v);
    }
    self
  }
}
