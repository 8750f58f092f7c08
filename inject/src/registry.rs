//! The process-wide registry of default factories, and local registries
//! built the same way.
//!
//! A registry is consulted when a type declares a dependency without a
//! default of its own. Reads load an immutable snapshot and never block;
//! writers serialize on a mutex and publish a fresh snapshot.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::error::{DependencyError, Result};
use crate::value::{registry_factory, RegistryFactory};

/// How a registration treats a name that is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RegistrationMode {
  /// Last write wins.
  #[default]
  Overwrite,
  /// Refuse to replace an existing entry.
  Safe,
}

type Table = HashMap<String, RegistryFactory>;

// Created on first access. Lives for the rest of the process.
static GLOBAL_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

/// Provides a reference to the process-wide registry.
///
/// # Examples
///
/// ```
/// use fibre_inject::registry::global;
///
/// global().register("retry_limit", |_| 3u32).unwrap();
/// assert!(global().is_registered("retry_limit"));
/// ```
pub fn global() -> &'static Registry {
  &GLOBAL_REGISTRY
}

pub(crate) fn global_handle() -> Arc<Registry> {
  Arc::clone(&GLOBAL_REGISTRY)
}

/// A name-keyed table of fallback factories.
pub struct Registry {
  entries: ArcSwap<Table>,
  write_lock: Mutex<()>,
  mode: RegistrationMode,
}

impl Default for Registry {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Registry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registry")
      .field("mode", &self.mode)
      .field("names", &self.names())
      .finish()
  }
}

impl Registry {
  /// Creates an empty registry that overwrites on duplicate registration.
  pub fn new() -> Self {
    Self::with_mode(RegistrationMode::Overwrite)
  }

  /// Creates an empty registry whose plain `register` calls use `mode`.
  pub fn with_mode(mode: RegistrationMode) -> Self {
    Self {
      entries: ArcSwap::from_pointee(Table::new()),
      write_lock: Mutex::new(()),
      mode,
    }
  }

  pub fn mode(&self) -> RegistrationMode {
    self.mode
  }

  /// Stores `factory` under `name`.
  ///
  /// Fails with `InvalidArgument` when `factory` is `None`, and with
  /// `DuplicateRegistration` when `mode` is `Safe` and `name` is taken.
  /// On failure the table is left untouched.
  pub fn register_with_mode(
    &self,
    name: &str,
    factory: Option<RegistryFactory>,
    mode: RegistrationMode,
  ) -> Result<()> {
    let factory = factory.ok_or_else(|| DependencyError::factory_required(name))?;

    let _guard = self.write_lock.lock();
    let current = self.entries.load_full();
    let replacing = current.contains_key(name);
    if replacing && mode == RegistrationMode::Safe {
      return Err(DependencyError::DuplicateRegistration {
        name: name.to_owned(),
      });
    }

    let mut next = Table::clone(&current);
    next.insert(name.to_owned(), factory);
    self.entries.store(Arc::new(next));

    debug!(dependency = name, replacing, ?mode, "registered default factory");
    Ok(())
  }

  /// Registers a closure using the registry's own mode.
  pub fn register<T, F>(&self, name: &str, f: F) -> Result<()>
  where
    T: std::any::Any + Send + Sync,
    F: Fn(&dyn std::any::Any) -> T + Send + Sync + 'static,
  {
    self.register_with_mode(name, Some(registry_factory(f)), self.mode)
  }

  /// Registers a closure, failing if `name` is already taken.
  pub fn register_safe<T, F>(&self, name: &str, f: F) -> Result<()>
  where
    T: std::any::Any + Send + Sync,
    F: Fn(&dyn std::any::Any) -> T + Send + Sync + 'static,
  {
    self.register_with_mode(name, Some(registry_factory(f)), RegistrationMode::Safe)
  }

  /// Returns the factory registered under `name`, if any.
  pub fn lookup(&self, name: &str) -> Option<RegistryFactory> {
    self.entries.load().get(name).cloned()
  }

  pub fn is_registered(&self, name: &str) -> bool {
    self.entries.load().contains_key(name)
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.entries.load().keys().cloned().collect();
    names.sort_unstable();
    names
  }

  pub fn len(&self) -> usize {
    self.entries.load().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Drops every registration. Meant for test isolation.
  pub fn reset(&self) {
    let _guard = self.write_lock.lock();
    let dropped = self.entries.swap(Arc::new(Table::new())).len();
    info!(dropped, "registry reset");
  }
}
