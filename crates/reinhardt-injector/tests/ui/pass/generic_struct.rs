use reinhardt_injector::{Inject, Registry};
use std::sync::Arc;

#[derive(Inject)]
struct Repository<T>
where
	T: Send + Sync + 'static,
{
	#[inject]
	store: Option<Arc<T>>,
}

#[derive(Inject)]
struct Empty;

fn main() {
	let mut registry = Registry::new();
	registry.map(5u64);

	let mut repository = Repository::<u64> { store: None };
	registry.apply(&mut repository).unwrap();
	assert_eq!(repository.store.as_deref(), Some(&5));

	registry.apply(&mut Empty).unwrap();
}
