use fibre_inject::{value, Dependencies, Dependent, DependencyError, Injector, Registry};
use pretty_assertions::assert_eq;
use std::sync::{
  atomic::{AtomicU32, Ordering},
  Arc,
};

// --- Test Fixtures ---

struct Klass {
  deps: Dependencies<Klass>,
}

impl Dependent for Klass {
  fn dependencies(&self) -> &Dependencies<Self> {
    &self.deps
  }
}

fn injector() -> Arc<Injector<Klass>> {
  Injector::builder()
    .owner_name("Klass")
    .registry(Arc::new(Registry::new()))
    .build()
}

fn new_klass(injector: &Arc<Injector<Klass>>) -> Klass {
  Klass {
    deps: injector.instance(),
  }
}

fn counting(injector: &Arc<Injector<Klass>>, name: &str) -> Arc<AtomicU32> {
  let counter = Arc::new(AtomicU32::new(0));
  let c = Arc::clone(&counter);
  injector.declare_with(name, move |_: &Klass| c.fetch_add(1, Ordering::SeqCst) + 1);
  counter
}

fn number(k: &Klass, name: &str) -> u32 {
  *k.dependency::<u32>(name).unwrap()
}

// --- Memoization ---

#[test]
fn test_each_instance_memoizes_its_own_value() {
  let injector = injector();
  let counter = counting(&injector, "number");

  let first = new_klass(&injector);
  let second = new_klass(&injector);
  assert_eq!(number(&first, "number"), 1);
  assert_eq!(number(&second, "number"), 2);
  assert_eq!(number(&first, "number"), 1);
  assert_eq!(number(&second, "number"), 2);
  assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_factory_reads_sibling_dependencies() {
  let injector = injector();
  injector.declare_with("b", |_: &Klass| 10u32);
  injector.declare_with("a", |k: &Klass| *k.dependency::<u32>("b").unwrap() * 2);

  let k = new_klass(&injector);
  assert_eq!(number(&k, "a"), 20);
  assert_eq!(number(&k, "b"), 10);
}

// --- Instance Overrides ---

#[test]
fn test_value_override_wins_and_factory_never_runs() {
  let injector = injector();
  let counter = counting(&injector, "number");

  let k = new_klass(&injector).with_value("number", 6u32);
  assert_eq!(number(&k, "number"), 6);
  assert_eq!(number(&k, "number"), 6);
  assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_value_override_replaces_a_memoized_value() {
  let injector = injector();
  injector.declare_with("number", |_: &Klass| 5u32);

  let k = new_klass(&injector);
  assert_eq!(number(&k, "number"), 5);
  let k = k.with_value("number", 6u32);
  assert_eq!(number(&k, "number"), 6);
}

#[test]
fn test_factory_override_is_lazy_and_runs_with_the_instance() {
  let injector = injector();
  injector.declare_with("number1", |_: &Klass| 41u32);
  injector.declare_with("number2", |_: &Klass| 0u32);

  let runs = Arc::new(AtomicU32::new(0));
  let r = Arc::clone(&runs);
  let k = new_klass(&injector).with_factory("number2", move |k: &Klass| {
    r.fetch_add(1, Ordering::SeqCst);
    *k.dependency::<u32>("number1").unwrap() + 1
  });

  assert_eq!(runs.load(Ordering::SeqCst), 0);
  assert_eq!(number(&k, "number2"), number(&k, "number1") + 1);
  assert_eq!(number(&k, "number2"), 42);
  assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn test_factory_override_rearms_a_resolved_slot() {
  let injector = injector();
  let counter = counting(&injector, "number");

  let k = new_klass(&injector);
  assert_eq!(number(&k, "number"), 1);
  let k = k.with_factory("number", |_: &Klass| 100u32);
  assert!(!k.dependencies().is_resolved("number"));
  assert_eq!(number(&k, "number"), 100);
  assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_overrides_chain_and_stay_isolated() {
  let injector = injector();
  injector.declare_with("a", |_: &Klass| 1u32);
  injector.declare_with("b", |_: &Klass| 2u32);
  injector.declare_with("c", |_: &Klass| 3u32);

  let k = new_klass(&injector)
    .with_value("a", 10u32)
    .with_factory("b", |_: &Klass| 20u32);
  assert_eq!(number(&k, "a"), 10);
  assert_eq!(number(&k, "b"), 20);
  assert_eq!(number(&k, "c"), 3);

  let other = new_klass(&injector);
  assert_eq!(number(&other, "a"), 1);
  assert_eq!(number(&other, "b"), 2);
}

#[test]
fn test_with_dependencies_sets_each_entry() {
  let injector = injector();
  let a = counting(&injector, "a");
  let b = counting(&injector, "b");
  injector.declare_with("untouched", |_: &Klass| 7u32);

  let k = new_klass(&injector).with_dependencies([("a", value(10u32)), ("b", value(20u32))]);
  assert_eq!(number(&k, "a"), 10);
  assert_eq!(number(&k, "b"), 20);
  assert_eq!(number(&k, "untouched"), 7);
  assert_eq!(a.load(Ordering::SeqCst), 0);
  assert_eq!(b.load(Ordering::SeqCst), 0);
}

#[test]
fn test_with_dependencies_applies_entries_in_order() {
  let injector = injector();
  injector.declare_with("a", |_: &Klass| 0u32);

  let overrides = vec![
    ("a".to_string(), value(1u32)),
    ("a".to_string(), value(2u32)),
  ];
  let k = new_klass(&injector).with_dependencies(overrides);
  assert_eq!(number(&k, "a"), 2);
}

#[test]
fn test_instance_override_of_an_undeclared_name_is_served() {
  let injector = injector();
  let k = new_klass(&injector).with_value("extra", String::from("on the side"));
  assert_eq!(k.dependency::<String>("extra").unwrap().as_str(), "on the side");
  assert!(!injector.is_declared("extra"));
}

#[test]
fn test_reading_with_the_wrong_type_reports_a_mismatch() {
  let injector = injector();
  injector.declare_with("number", |_: &Klass| 5u32);
  let k = new_klass(&injector);
  let err = k.dependency::<String>("number").unwrap_err();
  assert!(matches!(err, DependencyError::TypeMismatch { ref name, .. } if name == "number"));
}

// --- Type Overrides ---

#[test]
fn test_type_override_is_not_retroactive() {
  let injector = injector();
  injector.declare_with("number", |_: &Klass| 1u32);

  let resolved = new_klass(&injector);
  let pending = new_klass(&injector);
  assert_eq!(number(&resolved, "number"), 1);

  injector.override_with("number", |_: &Klass| 2u32).unwrap();

  assert_eq!(number(&resolved, "number"), 1);
  assert_eq!(number(&pending, "number"), 2);
  assert_eq!(number(&new_klass(&injector), "number"), 2);
}

#[test]
fn test_instance_override_beats_type_override() {
  let injector = injector();
  injector.declare_with("number", |_: &Klass| 1u32);

  let k = new_klass(&injector).with_factory("number", |_: &Klass| 3u32);
  injector.override_with("number", |_: &Klass| 2u32).unwrap();
  assert_eq!(number(&k, "number"), 3);
}

#[test]
fn test_type_override_fills_an_undefaulted_dependency() {
  let injector = injector();
  injector.declare("client", None);
  let k = new_klass(&injector);
  assert_eq!(
    k.dependency::<u32>("client").unwrap_err(),
    DependencyError::Uninitialized {
      name: "client".into()
    }
  );

  injector.override_value("client", 9u32).unwrap();
  assert_eq!(number(&k, "client"), 9);
}

#[test]
fn test_type_override_of_an_unknown_name_fails() {
  let injector = injector();
  let err = injector.override_with("ghost", |_: &Klass| 0u32).unwrap_err();
  assert_eq!(
    err.to_string(),
    "invalid argument: ghost is not a dependency of Klass"
  );
  assert!(!injector.is_declared("ghost"));
}

#[test]
fn test_type_override_without_a_factory_fails() {
  let injector = injector();
  injector.declare_with("number", |_: &Klass| 1u32);
  let err = injector.override_dependency("number", None).unwrap_err();
  assert!(matches!(err, DependencyError::InvalidArgument(ref msg) if msg.contains("factory required")));
  assert_eq!(number(&new_klass(&injector), "number"), 1);
}
