//! Errors surfaced by registration, declaration and resolution.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T, E = DependencyError> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DependencyError {
  /// No factory exists at the instance, type or registry level.
  #[error("{name} invoked before being defined")]
  Uninitialized { name: String },

  /// A safe-mode registration found the name already taken.
  #[error("{name} is already registered")]
  DuplicateRegistration { name: String },

  /// The caller broke an argument contract. Nothing was mutated.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  /// The dependency resolved, but not to the type the caller asked for.
  #[error("{name} does not hold a value of type {expected}")]
  TypeMismatch {
    name: String,
    expected: &'static str,
  },
}

impl DependencyError {
  pub(crate) fn uninitialized(name: &str) -> Self {
    Self::Uninitialized {
      name: name.to_owned(),
    }
  }

  pub(crate) fn factory_required(name: &str) -> Self {
    Self::InvalidArgument(format!("factory required to define {name}"))
  }

  pub(crate) fn not_a_dependency(name: &str, owner: &str) -> Self {
    Self::InvalidArgument(format!("{name} is not a dependency of {owner}"))
  }
}
