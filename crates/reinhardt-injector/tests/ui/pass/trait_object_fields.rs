use reinhardt_injector::{Inject, Registry};
use std::sync::Arc;

trait Cache: Send + Sync {
	fn hit(&self) -> bool;
}

struct Memory;

impl Cache for Memory {
	fn hit(&self) -> bool {
		true
	}
}

#[derive(Default, Inject)]
struct Handler {
	#[inject]
	cache: Option<std::sync::Arc<dyn Cache>>,
}

fn main() {
	let mut registry = Registry::new();
	registry
		.map(Memory)
		.provides::<dyn Cache, _>(|m| m as Arc<dyn Cache>);

	let mut handler = Handler::default();
	registry.apply(&mut handler).unwrap();
	assert!(handler.cache.unwrap().hit());
}
