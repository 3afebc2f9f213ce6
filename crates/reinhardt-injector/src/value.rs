//! Type-erased registry values

use crate::key::{TypeKey, interface_of};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Erased form of an `Arc<T>`. The concrete type behind the `dyn Any` is
/// always `Arc<T>` itself, which lets trait objects be recovered by the same
/// downcast as sized types.
pub(crate) type ErasedArc = Arc<dyn Any + Send + Sync>;

type CastFn = dyn Fn(&ErasedArc) -> Option<ErasedArc> + Send + Sync;

/// An interface a stored value declares it implements, with the coercion
/// producing the trait object.
#[derive(Clone)]
pub(crate) struct Implementation {
	interface: TypeKey,
	cast: Arc<CastFn>,
}

/// A value held by a [`Registry`](crate::Registry), tagged with the key it is
/// registered under.
///
/// # Examples
///
/// ```
/// use reinhardt_injector::{StoredValue, TypeKey};
/// use std::sync::Arc;
///
/// let value = StoredValue::new(Arc::new(7u8));
/// assert_eq!(value.key(), TypeKey::of::<u8>());
/// assert_eq!(*value.downcast::<u8>().unwrap(), 7);
/// assert!(value.downcast::<u16>().is_none());
/// ```
#[derive(Clone)]
pub struct StoredValue {
	key: TypeKey,
	value: ErasedArc,
	implementations: Vec<Implementation>,
}

impl StoredValue {
	/// Wraps `value`, keyed by `T`.
	pub fn new<T>(value: Arc<T>) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
	{
		Self {
			key: TypeKey::of::<T>(),
			value: Arc::new(value),
			implementations: Vec::new(),
		}
	}

	/// Returns the key this value is registered under.
	pub fn key(&self) -> TypeKey {
		self.key
	}

	/// Returns the value as `Arc<T>` if it was stored as a `T`.
	pub fn downcast<T>(&self) -> Option<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		self.value.downcast_ref::<Arc<T>>().cloned()
	}

	/// Declares that this value implements the trait object `I`.
	///
	/// `cast` performs the unsizing coercion, usually `|v| v as Arc<dyn I>`.
	/// A later declaration for the same interface replaces the earlier one.
	///
	/// # Panics
	///
	/// Panics if `I` is not a trait object type.
	pub fn provide<T, I, F>(&mut self, cast: F)
	where
		T: ?Sized + Send + Sync + 'static,
		I: ?Sized + Send + Sync + 'static,
		F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
	{
		let interface = interface_of::<I>();
		let cast: Arc<CastFn> = Arc::new(move |erased: &ErasedArc| {
			erased
				.downcast_ref::<Arc<T>>()
				.map(|value| Arc::new(cast(Arc::clone(value))) as ErasedArc)
		});
		self.implementations
			.retain(|implementation| implementation.interface != interface);
		self.implementations.push(Implementation { interface, cast });
	}

	/// Returns `true` if this value is registered under `interface` or
	/// declares an implementation of it.
	pub fn implements(&self, interface: &TypeKey) -> bool {
		self.key == *interface
			|| self
				.implementations
				.iter()
				.any(|implementation| implementation.interface == *interface)
	}

	/// Returns the interfaces this value declares, in declaration order.
	pub fn interfaces(&self) -> impl Iterator<Item = TypeKey> + '_ {
		self.implementations
			.iter()
			.map(|implementation| implementation.interface)
	}

	/// Carries over the declarations of the value this one replaces.
	///
	/// Both values share a key, so the earlier casts still apply. Interfaces
	/// declared on `self` take precedence.
	pub(crate) fn inherit_implementations(&mut self, previous: &StoredValue) {
		if previous.key != self.key {
			return;
		}
		let mut merged: Vec<Implementation> = previous
			.implementations
			.iter()
			.filter(|old| !self.interfaces().any(|interface| interface == old.interface))
			.cloned()
			.collect();
		merged.append(&mut self.implementations);
		self.implementations = merged;
	}

	/// Produces this value viewed as `interface`, keyed by the interface.
	pub(crate) fn cast_to(&self, interface: &TypeKey) -> Option<StoredValue> {
		let implementation = self
			.implementations
			.iter()
			.find(|implementation| implementation.interface == *interface)?;
		let value = (implementation.cast)(&self.value)?;
		Some(StoredValue {
			key: *interface,
			value,
			implementations: Vec::new(),
		})
	}
}

impl fmt::Debug for StoredValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoredValue")
			.field("key", &self.key)
			.field("interfaces", &self.interfaces().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}
