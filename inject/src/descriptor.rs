//! Per-type dependency declarations.
//!
//! An [`Injector`] is the table of [`Descriptor`]s for one owner type. It is
//! usually built once and kept in a `Lazy` static next to the type it serves:
//!
//! ```
//! use std::sync::Arc;
//! use fibre_inject::{Injector, Dependencies, Dependent};
//! use once_cell::sync::Lazy;
//!
//! struct Mailer {
//!   deps: Dependencies<Mailer>,
//! }
//!
//! static MAILER: Lazy<Arc<Injector<Mailer>>> = Lazy::new(|| {
//!   Injector::builder()
//!     .dependency("host", |_: &Mailer| String::from("smtp.local"))
//!     .build()
//! });
//!
//! impl Dependent for Mailer {
//!   fn dependencies(&self) -> &Dependencies<Self> {
//!     &self.deps
//!   }
//! }
//!
//! let mailer = Mailer { deps: MAILER.instance() };
//! assert_eq!(mailer.dependency::<String>("host").unwrap().as_str(), "smtp.local");
//! ```

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::{DependencyError, Result};
use crate::registry::{global_handle, Registry};
use crate::slot::Dependencies;
use crate::value::{adopt, constant, factory, value, Factory};

/// The current construction rule for one dependency name on one type.
pub struct Descriptor<O> {
  name: String,
  factory: Option<Factory<O>>,
}

impl<O> Clone for Descriptor<O> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      factory: self.factory.clone(),
    }
  }
}

impl<O> fmt::Debug for Descriptor<O> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Descriptor")
      .field("name", &self.name)
      .field("has_factory", &self.factory.is_some())
      .finish()
  }
}

impl<O> Descriptor<O> {
  pub fn name(&self) -> &str {
    &self.name
  }

  /// `false` means every read that falls through to this descriptor fails
  /// with `Uninitialized`.
  pub fn has_factory(&self) -> bool {
    self.factory.is_some()
  }

  pub fn factory(&self) -> Option<&Factory<O>> {
    self.factory.as_ref()
  }
}

/// The dependency declarations of owner type `O`.
pub struct Injector<O> {
  owner: String,
  registry: Arc<Registry>,
  warn_on_redeclare: bool,
  descriptors: DashMap<String, Descriptor<O>>,
}

impl<O> fmt::Debug for Injector<O> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Injector")
      .field("owner", &self.owner)
      .field("dependencies", &self.descriptors.len())
      .field("warn_on_redeclare", &self.warn_on_redeclare)
      .finish_non_exhaustive()
  }
}

impl<O: Any> Injector<O> {
  /// An injector backed by the global registry, with no declarations yet.
  pub fn new() -> Arc<Self> {
    Self::builder().build()
  }

  pub fn builder() -> InjectorBuilder<O> {
    InjectorBuilder::default()
  }

  /// Creates the per-instance slot table for a new owner.
  pub fn instance(self: &Arc<Self>) -> Dependencies<O> {
    Dependencies::new(Arc::clone(self))
  }

  /// Name of the owner type, as used in error messages.
  pub fn owner_name(&self) -> &str {
    &self.owner
  }

  pub fn registry(&self) -> &Arc<Registry> {
    &self.registry
  }

  /// Declares `name` with `factory` as its default.
  ///
  /// Without a factory the registry is consulted; if it has nothing under
  /// `name` either, the dependency stays uninitialized until overridden.
  /// Declaring a name twice still succeeds, but logs a deprecation warning:
  /// use [`Injector::override_dependency`] for that.
  pub fn declare(&self, name: &str, factory: Option<Factory<O>>) {
    let from_registry = factory.is_none();
    let factory = factory.or_else(|| self.registry.lookup(name).map(adopt::<O>));
    let has_factory = factory.is_some();

    match self.descriptors.entry(name.to_owned()) {
      Entry::Occupied(mut occupied) => {
        if self.warn_on_redeclare {
          warn!(
            owner = %self.owner,
            dependency = name,
            "dependency re-declared; this is deprecated, use override_dependency instead"
          );
        }
        occupied.get_mut().factory = factory;
      }
      Entry::Vacant(vacant) => {
        vacant.insert(Descriptor {
          name: name.to_owned(),
          factory,
        });
      }
    }

    debug!(
      owner = %self.owner,
      dependency = name,
      has_factory,
      from_registry = from_registry && has_factory,
      "declared dependency"
    );
  }

  /// Declares `name` with a closure default.
  pub fn declare_with<T, F>(&self, name: &str, f: F)
  where
    T: Any + Send + Sync,
    F: Fn(&O) -> T + Send + Sync + 'static,
  {
    self.declare(name, Some(factory(f)));
  }

  /// Replaces the default factory of an already-declared dependency.
  ///
  /// Instances that already resolved `name` keep their value; instances that
  /// have not yet read it will use the new factory.
  pub fn override_dependency(&self, name: &str, factory: Option<Factory<O>>) -> Result<()> {
    let factory = factory.ok_or_else(|| DependencyError::factory_required(name))?;
    let mut descriptor = self
      .descriptors
      .get_mut(name)
      .ok_or_else(|| DependencyError::not_a_dependency(name, &self.owner))?;
    descriptor.factory = Some(factory);
    debug!(owner = %self.owner, dependency = name, "overrode dependency default");
    Ok(())
  }

  pub fn override_with<T, F>(&self, name: &str, f: F) -> Result<()>
  where
    T: Any + Send + Sync,
    F: Fn(&O) -> T + Send + Sync + 'static,
  {
    self.override_dependency(name, Some(factory(f)))
  }

  /// Makes every not-yet-resolved instance share `value` for `name`.
  pub fn override_value<T: Any + Send + Sync>(&self, name: &str, v: T) -> Result<()> {
    self.override_dependency(name, Some(constant(value(v))))
  }

  pub fn is_declared(&self, name: &str) -> bool {
    self.descriptors.contains_key(name)
  }

  /// Declared names, sorted.
  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.descriptors.iter().map(|d| d.key().clone()).collect();
    names.sort_unstable();
    names
  }

  pub fn descriptor(&self, name: &str) -> Option<Descriptor<O>> {
    self.descriptors.get(name).map(|d| d.value().clone())
  }

  pub(crate) fn current_factory(&self, name: &str) -> Option<Factory<O>> {
    self.descriptors.get(name).and_then(|d| d.factory.clone())
  }
}

/// Configures and builds an [`Injector`].
pub struct InjectorBuilder<O> {
  owner: Option<String>,
  registry: Option<Arc<Registry>>,
  warn_on_redeclare: bool,
  declarations: Vec<(String, Option<Factory<O>>)>,
}

impl<O> Default for InjectorBuilder<O> {
  fn default() -> Self {
    Self {
      owner: None,
      registry: None,
      warn_on_redeclare: true,
      declarations: Vec::new(),
    }
  }
}

impl<O> fmt::Debug for InjectorBuilder<O> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("InjectorBuilder")
      .field("owner", &self.owner)
      .field("has_registry", &self.registry.is_some())
      .field("warn_on_redeclare", &self.warn_on_redeclare)
      .field("declarations", &self.declarations.len())
      .finish()
  }
}

impl<O: Any> InjectorBuilder<O> {
  /// Sets the owner name used in error messages.
  pub fn owner_name(mut self, owner: impl Into<String>) -> Self {
    self.owner = Some(owner.into());
    self
  }

  /// Consults `registry` instead of the global one for undefaulted declarations.
  pub fn registry(mut self, registry: Arc<Registry>) -> Self {
    self.registry = Some(registry);
    self
  }

  /// Whether re-declaring a dependency logs a warning. On by default.
  pub fn warn_on_redeclare(mut self, warn: bool) -> Self {
    self.warn_on_redeclare = warn;
    self
  }

  /// Declares a dependency with a closure default.
  pub fn dependency<T, F>(mut self, name: &str, f: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn(&O) -> T + Send + Sync + 'static,
  {
    self.declarations.push((name.to_owned(), Some(factory(f))));
    self
  }

  /// Declares a dependency whose default comes from the registry, if any.
  pub fn dependency_without_default(mut self, name: &str) -> Self {
    self.declarations.push((name.to_owned(), None));
    self
  }

  pub fn build(self) -> Arc<Injector<O>> {
    let injector = Injector {
      owner: self.owner.unwrap_or_else(|| type_name::<O>().to_owned()),
      registry: self.registry.unwrap_or_else(global_handle),
      warn_on_redeclare: self.warn_on_redeclare,
      descriptors: DashMap::new(),
    };
    for (name, factory) in self.declarations {
      injector.declare(&name, factory);
    }
    Arc::new(injector)
  }
}
