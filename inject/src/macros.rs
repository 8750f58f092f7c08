//! Typed accessor generation.

/// Generates typed accessors for dependencies of a [`Dependent`](crate::Dependent) type.
///
/// For each `name: Type` entry this adds, on the owner:
///
/// - `name(&self) -> Result<Arc<Type>>`
/// - `with_name(self, Type) -> Self`
/// - `with_name_factory(self, impl Fn(&Self) -> Type) -> Self`
///
/// The dependencies still have to be declared on the owner's injector.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use fibre_inject::{dependencies, Dependencies, Dependent, Injector};
/// use once_cell::sync::Lazy;
///
/// struct Job {
///   id: u32,
///   deps: Dependencies<Job>,
/// }
///
/// static JOB: Lazy<Arc<Injector<Job>>> = Lazy::new(|| {
///   Injector::builder()
///     .dependency("attempts", |_: &Job| 3u8)
///     .dependency("label", |job: &Job| format!("job-{}", job.id))
///     .build()
/// });
///
/// impl Dependent for Job {
///   fn dependencies(&self) -> &Dependencies<Self> {
///     &self.deps
///   }
/// }
///
/// dependencies!(Job {
///   attempts: u8,
///   label: String,
/// });
///
/// let job = Job { id: 7, deps: JOB.instance() }.with_attempts(5);
/// assert_eq!(*job.attempts().unwrap(), 5);
/// assert_eq!(job.label().unwrap().as_str(), "job-7");
/// ```
#[macro_export]
macro_rules! dependencies {
  ($owner:ty { $($name:ident : $ty:ty),+ $(,)? }) => {
    $crate::__paste! {
      impl $owner {
        $(
          #[allow(dead_code)]
          pub fn $name(&self) -> $crate::Result<::std::sync::Arc<$ty>> {
            <Self as $crate::Dependent>::dependency::<$ty>(self, stringify!($name))
          }

          #[allow(dead_code)]
          pub fn [<with_ $name>](self, value: $ty) -> Self {
            <Self as $crate::Dependent>::with_value(self, stringify!($name), value)
          }

          #[allow(dead_code)]
          pub fn [<with_ $name _factory>]<F>(self, f: F) -> Self
          where
            F: Fn(&Self) -> $ty + Send + Sync + 'static,
          {
            <Self as $crate::Dependent>::with_factory(self, stringify!($name), f)
          }
        )+
      }
    }
  };
}
