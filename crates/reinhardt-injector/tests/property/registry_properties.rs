//! Property-based tests for registry lookups
//!
//! Uses proptest to verify invariants of the registry:
//! 1. Last write wins - re-registering a type replaces the previous value
//! 2. Nearest registry wins - a child's value shadows its parent's
//! 3. Fallback - a child without a value sees its ancestors' value
//! 4. Registration order - local keys keep their first registration slot

use proptest::prelude::*;
use reinhardt_injector::{AmbiguityPolicy, Registry, TypeKey};
use std::sync::Arc;

trait Named: Send + Sync {
	fn name(&self) -> String;
}

struct First(String);

impl Named for First {
	fn name(&self) -> String {
		self.0.clone()
	}
}

struct Second(String);

impl Named for Second {
	fn name(&self) -> String {
		self.0.clone()
	}
}

proptest! {
	#[test]
	fn last_write_wins(values in prop::collection::vec(any::<u64>(), 1..20)) {
		let mut registry = Registry::new();
		for value in &values {
			registry.map(*value);
		}

		prop_assert_eq!(*registry.get::<u64>().unwrap(), *values.last().unwrap());
		prop_assert_eq!(registry.len(), 1);
	}

	#[test]
	fn child_value_shadows_parent(parent_value in any::<i64>(), child_value in any::<i64>()) {
		let mut parent = Registry::new();
		parent.map(parent_value);
		let parent = Arc::new(parent);

		let mut child = Registry::child_of(Arc::clone(&parent));
		child.map(child_value);

		prop_assert_eq!(*child.get::<i64>().unwrap(), child_value);
		prop_assert_eq!(*parent.get::<i64>().unwrap(), parent_value);
	}

	#[test]
	fn missing_values_fall_back_through_any_depth(depth in 1usize..8, value in ".*") {
		let mut root = Registry::new();
		root.map(value.clone());

		let mut current = Arc::new(root);
		for _ in 0..depth {
			current = Arc::new(Registry::child_of(Arc::clone(&current)));
		}

		let resolved = current.get::<String>();
		prop_assert_eq!(resolved.as_deref(), Some(&value));
		prop_assert!(current.is_empty());
	}

	#[test]
	fn first_registered_implementation_wins(first in "[a-z]{1,8}", second in "[a-z]{1,8}", reversed in any::<bool>()) {
		let mut registry = Registry::builder()
			.ambiguity(AmbiguityPolicy::FirstRegistered)
			.build();
		if reversed {
			registry.map(Second(second.clone())).provides::<dyn Named, _>(|v| v as Arc<dyn Named>);
			registry.map(First(first.clone())).provides::<dyn Named, _>(|v| v as Arc<dyn Named>);
		} else {
			registry.map(First(first.clone())).provides::<dyn Named, _>(|v| v as Arc<dyn Named>);
			registry.map(Second(second.clone())).provides::<dyn Named, _>(|v| v as Arc<dyn Named>);
		}

		let expected = if reversed { second } else { first };
		prop_assert_eq!(registry.get::<dyn Named>().unwrap().name(), expected);
	}

	#[test]
	fn keys_keep_first_registration_order(order in Just(vec![0u8, 1, 2]).prop_shuffle(), repeat in 0u8..3) {
		let mut registry = Registry::new();
		for index in &order {
			register_by_index(&mut registry, *index);
		}
		register_by_index(&mut registry, repeat);

		let expected: Vec<TypeKey> = order.iter().map(|index| key_by_index(*index)).collect();
		prop_assert_eq!(registry.keys().collect::<Vec<_>>(), expected);
	}
}

fn register_by_index(registry: &mut Registry, index: u8) {
	match index {
		0 => {
			registry.map(0u8);
		}
		1 => {
			registry.map(1u16);
		}
		_ => {
			registry.map(2u32);
		}
	}
}

fn key_by_index(index: u8) -> TypeKey {
	match index {
		0 => TypeKey::of::<u8>(),
		1 => TypeKey::of::<u16>(),
		_ => TypeKey::of::<u32>(),
	}
}
