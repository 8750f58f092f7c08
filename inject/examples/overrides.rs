use fibre_inject::{global, value, Dependencies, Dependent, Injector};
use std::any::Any;
use std::sync::Arc;

trait Clock: Send + Sync {
  fn now(&self) -> u64;
}

struct SystemClock;
impl Clock for SystemClock {
  fn now(&self) -> u64 {
    1_700_000_000
  }
}

struct FixedClock(u64);
impl Clock for FixedClock {
  fn now(&self) -> u64 {
    self.0
  }
}

type SharedClock = Arc<dyn Clock>;

struct Scheduler {
  deps: Dependencies<Scheduler>,
}

impl Dependent for Scheduler {
  fn dependencies(&self) -> &Dependencies<Self> {
    &self.deps
  }
}

impl Scheduler {
  fn now(&self) -> u64 {
    self.dependency::<SharedClock>("clock").unwrap().now()
  }

  fn retries(&self) -> u32 {
    *self.dependency::<u32>("retries").unwrap()
  }
}

fn main() {
  // --- Process-wide default ---
  global()
    .register("clock", |_: &dyn Any| -> SharedClock { Arc::new(SystemClock) })
    .unwrap();

  let injector: Arc<Injector<Scheduler>> = Injector::builder()
    .dependency_without_default("clock")
    .dependency("retries", |_: &Scheduler| 3u32)
    .build();
  let new_scheduler = || Scheduler {
    deps: injector.instance(),
  };

  let plain = new_scheduler();
  println!("Global default clock: {}", plain.now());

  // --- Instance-level override ---
  let pinned = new_scheduler().with_value("clock", Arc::new(FixedClock(42)) as SharedClock);
  println!("Instance override clock: {}", pinned.now());
  assert_eq!(pinned.now(), 42);

  // --- Type-level override ---
  injector
    .override_with("clock", |_: &Scheduler| -> SharedClock { Arc::new(FixedClock(7)) })
    .unwrap();
  println!("Already-resolved instance still reads: {}", plain.now());
  println!("New instance reads: {}", new_scheduler().now());
  assert_eq!(new_scheduler().now(), 7);

  // --- Several overrides at once ---
  let tuned = new_scheduler().with_dependencies([("retries", value(10u32))]);
  println!("Retries: default {}, tuned {}", plain.retries(), tuned.retries());
  assert_eq!(tuned.retries(), 10);
}
