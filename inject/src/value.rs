//! Type-erased values and the factories that produce them.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::error::{DependencyError, Result};

/// A resolved dependency, shared between the slot that memoized it and every reader.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Builds a dependency for one owning instance of type `O`.
pub type Factory<O> = Arc<dyn Fn(&O) -> Value + Send + Sync>;

/// A process-wide default factory. The owner is passed type-erased because a
/// registry entry can back dependencies declared on any number of types.
pub type RegistryFactory = Arc<dyn Fn(&dyn Any) -> Value + Send + Sync>;

/// Wraps a plain value so it can be stored in a slot or passed to
/// `with_dependencies`.
pub fn value<T: Any + Send + Sync>(value: T) -> Value {
  Arc::new(value)
}

/// Erases the return type of an owner-aware closure.
pub fn factory<O, T, F>(f: F) -> Factory<O>
where
  O: 'static,
  T: Any + Send + Sync,
  F: Fn(&O) -> T + Send + Sync + 'static,
{
  Arc::new(move |owner: &O| Arc::new(f(owner)) as Value)
}

/// Erases both the owner and the return type of a registry closure.
pub fn registry_factory<T, F>(f: F) -> RegistryFactory
where
  T: Any + Send + Sync,
  F: Fn(&dyn Any) -> T + Send + Sync + 'static,
{
  Arc::new(move |owner: &dyn Any| Arc::new(f(owner)) as Value)
}

/// Adapts a registry entry so it can serve as the descriptor factory of `O`.
pub(crate) fn adopt<O: Any>(registered: RegistryFactory) -> Factory<O> {
  Arc::new(move |owner: &O| registered(owner as &dyn Any))
}

/// A factory that hands out clones of the same shared value.
pub(crate) fn constant<O: 'static>(value: Value) -> Factory<O> {
  Arc::new(move |_: &O| Arc::clone(&value))
}

/// Recovers the concrete type of a resolved dependency.
pub fn downcast<T: Any + Send + Sync>(name: &str, value: Value) -> Result<Arc<T>> {
  value
    .downcast::<T>()
    .map_err(|_| DependencyError::TypeMismatch {
      name: name.to_owned(),
      expected: type_name::<T>(),
    })
}
