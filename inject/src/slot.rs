//! Per-instance memoization.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use crate::descriptor::Injector;
use crate::error::{DependencyError, Result};
use crate::value::{downcast, Factory, Value};

// Holds at most one value. An override never mutates a slot in place; it
// swaps in a fresh one, so readers that already hold the old slot finish
// against the factory they started with.
struct Slot<O> {
  cell: OnceCell<Value>,
  // `None` defers to the injector's current descriptor.
  factory: Option<Factory<O>>,
}

impl<O> Slot<O> {
  fn deferred() -> Self {
    Self {
      cell: OnceCell::new(),
      factory: None,
    }
  }

  fn armed(factory: Factory<O>) -> Self {
    Self {
      cell: OnceCell::new(),
      factory: Some(factory),
    }
  }

  fn resolved(value: Value) -> Self {
    Self {
      cell: OnceCell::with_value(value),
      factory: None,
    }
  }
}

/// The dependency slots of one owning instance.
///
/// Embed it as a field of the owner and expose it through
/// [`Dependent`](crate::Dependent).
pub struct Dependencies<O> {
  injector: Arc<Injector<O>>,
  slots: DashMap<String, Arc<Slot<O>>>,
}

impl<O> fmt::Debug for Dependencies<O> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let resolved = self
      .slots
      .iter()
      .filter(|s| s.value().cell.get().is_some())
      .count();
    f.debug_struct("Dependencies")
      .field("injector", &self.injector)
      .field("slots", &self.slots.len())
      .field("resolved", &resolved)
      .finish()
  }
}

impl<O: Any> Dependencies<O> {
  pub fn new(injector: Arc<Injector<O>>) -> Self {
    Self {
      injector,
      slots: DashMap::new(),
    }
  }

  pub fn injector(&self) -> &Arc<Injector<O>> {
    &self.injector
  }

  /// Returns the memoized value of `name`, computing it on first read.
  ///
  /// The factory in effect is the instance override if one was installed,
  /// otherwise the injector's current default. It runs at most once per
  /// slot, even under concurrent first reads.
  ///
  /// A factory must not read its own dependency, directly or through a
  /// sibling: the nested read waits on the cell the outer read is still
  /// filling, and the call never returns. Cycles are not detected.
  pub fn resolve(&self, owner: &O, name: &str) -> Result<Value> {
    let slot = self.slot(name);
    if let Some(value) = slot.cell.get() {
      return Ok(Arc::clone(value));
    }

    let factory = match &slot.factory {
      Some(factory) => Arc::clone(factory),
      None => self
        .injector
        .current_factory(name)
        .ok_or_else(|| DependencyError::uninitialized(name))?,
    };

    let value = slot.cell.get_or_init(|| {
      trace!(owner = %self.injector.owner_name(), dependency = name, "running factory");
      factory(owner)
    });
    Ok(Arc::clone(value))
  }

  /// Typed [`resolve`](Self::resolve).
  pub fn get<T: Any + Send + Sync>(&self, owner: &O, name: &str) -> Result<Arc<T>> {
    downcast(name, self.resolve(owner, name)?)
  }

  /// Pins `name` to `value`. No factory will run for it on this instance
  /// until another override re-arms the slot.
  ///
  /// Unlike [`Dependent::with_value`](crate::Dependent::with_value) this does
  /// not consume the owner, so it works on owners that are already shared:
  ///
  /// ```
  /// use fibre_inject::{factory, value, Dependencies, Dependent, Injector};
  /// use std::sync::Arc;
  ///
  /// struct Worker {
  ///   deps: Dependencies<Worker>,
  /// }
  ///
  /// impl Dependent for Worker {
  ///   fn dependencies(&self) -> &Dependencies<Self> {
  ///     &self.deps
  ///   }
  /// }
  ///
  /// let injector: Arc<Injector<Worker>> = Injector::builder()
  ///   .dependency("batch", |_: &Worker| 8u32)
  ///   .build();
  /// let worker = Arc::new(Worker { deps: injector.instance() });
  /// let handle = Arc::clone(&worker);
  ///
  /// handle.dependencies().set_value("batch", value(32u32));
  /// assert_eq!(*worker.dependency::<u32>("batch").unwrap(), 32);
  ///
  /// handle.dependencies().set_factory("batch", factory(|_: &Worker| 64u32));
  /// assert_eq!(*worker.dependency::<u32>("batch").unwrap(), 64);
  /// ```
  pub fn set_value(&self, name: &str, value: Value) {
    self.slots.insert(name.to_owned(), Arc::new(Slot::resolved(value)));
    debug!(owner = %self.injector.owner_name(), dependency = name, "pinned instance value");
  }

  /// Re-arms `name` with `factory`. It runs on the next read. The
  /// non-consuming counterpart of
  /// [`Dependent::with_factory`](crate::Dependent::with_factory); see
  /// [`set_value`](Self::set_value) for an example.
  pub fn set_factory(&self, name: &str, factory: Factory<O>) {
    self.slots.insert(name.to_owned(), Arc::new(Slot::armed(factory)));
    debug!(owner = %self.injector.owner_name(), dependency = name, "armed instance factory");
  }

  pub fn is_resolved(&self, name: &str) -> bool {
    self
      .slots
      .get(name)
      .is_some_and(|slot| slot.cell.get().is_some())
  }

  fn slot(&self, name: &str) -> Arc<Slot<O>> {
    if let Some(slot) = self.slots.get(name) {
      return Arc::clone(slot.value());
    }
    let entry = self
      .slots
      .entry(name.to_owned())
      .or_insert_with(|| Arc::new(Slot::deferred()));
    Arc::clone(entry.value())
  }
}
