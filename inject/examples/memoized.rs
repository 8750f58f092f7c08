use fibre_inject::{Dependencies, Dependent, Injector};
use once_cell::sync::Lazy;
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};

// A connection that records which instance created it.
struct Connection {
  id: usize,
}

struct Repository {
  name: &'static str,
  deps: Dependencies<Repository>,
}

impl Dependent for Repository {
  fn dependencies(&self) -> &Dependencies<Self> {
    &self.deps
  }
}

static ID_COUNTER: AtomicUsize = AtomicUsize::new(0);

static REPOSITORY: Lazy<Arc<Injector<Repository>>> = Lazy::new(|| {
  Injector::builder()
    .dependency("connection", |repo: &Repository| {
      println!("Opening connection for {}...", repo.name);
      Connection {
        id: ID_COUNTER.fetch_add(1, Ordering::SeqCst),
      }
    })
    .build()
});

fn main() {
  let users = Repository {
    name: "users",
    deps: REPOSITORY.instance(),
  };
  let orders = Repository {
    name: "orders",
    deps: REPOSITORY.instance(),
  };

  println!("--- Reading the same dependency twice ---");
  let c1 = users.dependency::<Connection>("connection").unwrap();
  let c2 = users.dependency::<Connection>("connection").unwrap();
  println!("First read ID: {}, second read ID: {}", c1.id, c2.id);
  assert!(Arc::ptr_eq(&c1, &c2), "reads on one instance share a value");

  println!("\n--- Reading it from another instance ---");
  let c3 = orders.dependency::<Connection>("connection").unwrap();
  println!("Other instance ID: {}", c3.id);
  assert_ne!(c1.id, c3.id);
  println!("Each instance computed its own connection, exactly once.");
}
