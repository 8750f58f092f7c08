use fibre_inject::{Dependencies, Dependent, DependencyError, Injector};
use std::sync::Arc;

struct Notifier {
  deps: Dependencies<Notifier>,
}

impl Dependent for Notifier {
  fn dependencies(&self) -> &Dependencies<Self> {
    &self.deps
  }
}

fn main() {
  // Declared, but no default at the type level and nothing in the registry.
  let injector: Arc<Injector<Notifier>> = Injector::builder()
    .dependency_without_default("transport")
    .build();

  println!("Reading a dependency that has no factory anywhere...");
  let notifier = Notifier {
    deps: injector.instance(),
  };
  match notifier.dependency::<String>("transport") {
    Err(DependencyError::Uninitialized { name }) => {
      println!("Correctly failed: `{name}` is uninitialized.")
    }
    Err(other) => panic!("unexpected error: {other}"),
    Ok(_) => panic!("Should not have resolved!"),
  }

  println!("\nSupplying it on the instance...");
  let notifier = notifier.with_value("transport", String::from("smtp"));
  let transport = notifier.dependency::<String>("transport").unwrap();
  println!("Resolved transport: {transport}");
  assert_eq!(transport.as_str(), "smtp");
}
