use component_macros::{component, Injectable};
use di_abstractions::__private::{LifecycleMarker, Lifetime};

pub trait IGreeter: Send + Sync {
    fn greet(&self) -> String;
}

#[derive(Injectable)]
#[component(scoped, services(dyn IGreeter))]
struct ConsoleGreeter;

impl IGreeter for ConsoleGreeter {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

fn main() {
    assert_eq!(ConsoleGreeter::LIFETIME, Lifetime::LifetimeScope);
}
