use component_macros::Injectable;
use std::sync::Arc;

pub trait IClock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Injectable)]
#[injectable(release = "stop")]
struct Scheduler {
    clock: Arc<dyn IClock>,
    fallback: Option<Arc<dyn IClock>>,
    #[do_not_inject]
    paused: bool,
    #[inject(arg)]
    name: String,
}

impl Scheduler {
    fn stop(&self) {
        let _ = (&self.clock, &self.fallback, self.paused, &self.name);
    }
}

#[derive(Injectable)]
struct Unit;

fn main() {}
