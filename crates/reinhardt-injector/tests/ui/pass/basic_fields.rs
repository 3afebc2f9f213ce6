use reinhardt_injector::{Inject, Registry};
use std::sync::Arc;

#[derive(Default, Inject)]
struct Service {
	#[inject]
	name: Option<Arc<String>>,
	#[inject(skip)]
	retries: Option<Arc<u32>>,
	counter: usize,
}

fn main() {
	let mut registry = Registry::new();
	registry.map("svc".to_string());

	let mut service = Service::default();
	registry.apply(&mut service).unwrap();
	assert!(service.name.is_some());
	assert!(service.retries.is_none());
	assert_eq!(service.counter, 0);
}
