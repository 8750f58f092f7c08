//! # Fibre Inject
//!
//! Named, lazily-computed dependencies with a default construction rule that
//! callers can override per process, per type and per instance.
//!
//! ## Core Concepts
//!
//! - **Registry**: a process-wide table of fallback factories, accessible via `global()`.
//! - **Injector**: the per-type table of declared dependencies and their current defaults.
//! - **Dependencies**: the per-instance slots. Each dependency is computed at most
//!   once per instance, on first read, with the instance as the factory's argument.
//! - **Overrides**: an instance override beats the type default, which beats the
//!   registry. Overriding with a value pins it; overriding with a factory re-arms
//!   the slot lazily.
//!
//! ## Quick Start
//!
//! ```
//! use fibre_inject::{value, Dependencies, Dependent, Injector};
//! use once_cell::sync::Lazy;
//! use std::sync::Arc;
//!
//! struct Service {
//!   name: String,
//!   deps: Dependencies<Service>,
//! }
//!
//! static SERVICE: Lazy<Arc<Injector<Service>>> = Lazy::new(|| {
//!   Injector::builder()
//!     .dependency("greeting", |s: &Service| format!("hello {}", s.name))
//!     .dependency_without_default("client")
//!     .build()
//! });
//!
//! impl Dependent for Service {
//!   fn dependencies(&self) -> &Dependencies<Self> {
//!     &self.deps
//!   }
//! }
//!
//! impl Service {
//!   fn new(name: &str) -> Self {
//!     Self { name: name.to_owned(), deps: SERVICE.instance() }
//!   }
//! }
//!
//! // Default rule, evaluated with the instance.
//! let josh = Service::new("josh");
//! assert_eq!(josh.dependency::<String>("greeting").unwrap().as_str(), "hello josh");
//!
//! // No default anywhere: reading fails until the instance supplies one.
//! let sally = Service::new("sally");
//! assert!(sally.dependency::<&str>("client").is_err());
//! let sally = sally.with_dependencies([("client", value("mock"))]);
//! assert_eq!(*sally.dependency::<&str>("client").unwrap(), "mock");
//! ```

mod dependent;
mod descriptor;
pub mod error;
mod macros;
pub mod registry;
mod slot;
mod value;

pub use dependent::Dependent;
pub use descriptor::{Descriptor, Injector, InjectorBuilder};
pub use error::{DependencyError, Result};
pub use registry::{global, Registry, RegistrationMode};
pub use slot::Dependencies;
pub use value::{downcast, factory, registry_factory, value, Factory, RegistryFactory, Value};

#[doc(hidden)]
pub use paste::paste as __paste;
