//! Type descriptors used as registry keys

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity of a type stored in a [`Registry`](crate::Registry).
///
/// Two keys are equal iff they denote the same type. Sized types and trait
/// objects (`dyn Trait`) both have keys; the latter are the *interface* keys
/// that take part in implementation matching.
///
/// The type name is only carried for error messages and logging.
///
/// # Examples
///
/// ```
/// use reinhardt_injector::TypeKey;
///
/// trait Greeter: Send + Sync {}
///
/// assert_eq!(TypeKey::of::<String>(), TypeKey::of::<String>());
/// assert_ne!(TypeKey::of::<String>(), TypeKey::of::<&'static str>());
/// assert!(TypeKey::of::<dyn Greeter>().is_interface());
/// assert!(!TypeKey::of::<String>().is_interface());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	/// Returns the key of `T`.
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	/// Returns the underlying `TypeId`.
	pub fn id(&self) -> TypeId {
		self.id
	}

	/// Returns the type name, as reported by `std::any::type_name`.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Returns `true` if this key denotes a trait object type.
	///
	/// Detection relies on the `dyn ` prefix `std::any::type_name` produces
	/// for trait objects.
	pub fn is_interface(&self) -> bool {
		self.name.starts_with("dyn ")
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("TypeKey").field(&self.name).finish()
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

/// Returns the key of the trait object type `I`.
///
/// This is the descriptor used when registering a value "as" an interface.
///
/// # Panics
///
/// Panics if `I` is not a trait object type (for example `String` or `str`).
/// Passing a concrete type here is a bug in the calling code.
///
/// # Examples
///
/// ```
/// use reinhardt_injector::interface_of;
///
/// trait Clock: Send + Sync {}
///
/// let key = interface_of::<dyn Clock>();
/// assert!(key.is_interface());
/// ```
pub fn interface_of<I: ?Sized + 'static>() -> TypeKey {
	let key = TypeKey::of::<I>();
	assert!(
		key.is_interface(),
		"interface_of called with `{}`, which is not a trait object type such as `dyn MyTrait`",
		key.name()
	);
	key
}
