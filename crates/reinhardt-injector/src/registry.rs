//! Type-keyed value registry
//!
//! A [`Registry`] maps types to values. Lookups run through a fixed chain:
//!
//! 1. an entry registered under exactly the requested type,
//! 2. for trait objects, an entry declaring an implementation of it
//!    (see [`crate::interface`]),
//! 3. the parent registry, which repeats the whole chain.
//!
//! The nearest registry wins: a local exact or interface match is never
//! shadowed by an ancestor.

use crate::config::RegistrySettings;
use crate::error::{InjectError, InjectResult};
use crate::interface::{AmbiguityPolicy, InterfaceMatch, find_implementation};
use crate::key::{TypeKey, interface_of};
use crate::value::StoredValue;
use indexmap::IndexMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Result of running the lookup chain for one key.
#[derive(Debug)]
pub(crate) enum Lookup {
	Found(StoredValue),
	Ambiguous(Vec<&'static str>),
	Missing,
}

impl Lookup {
	pub(crate) fn into_result(self, key: &TypeKey) -> InjectResult<StoredValue> {
		match self {
			Lookup::Found(value) => Ok(value),
			Lookup::Ambiguous(candidates) => Err(InjectError::Ambiguous {
				type_name: key.name(),
				candidates,
			}),
			Lookup::Missing => Err(InjectError::NotFound {
				type_name: key.name(),
			}),
		}
	}
}

/// A registry of values keyed by type.
///
/// Registration takes `&mut self`; lookups take `&self`. Share a populated
/// registry through `Arc` to read it from several threads or to use it as
/// the parent of other registries.
///
/// # Examples
///
/// ```
/// use reinhardt_injector::Registry;
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// let mut registry = Registry::new();
/// registry.map(42u32);
/// registry
///     .map(English)
///     .provides::<dyn Greeter, _>(|english| english as Arc<dyn Greeter>);
///
/// assert_eq!(*registry.get::<u32>().unwrap(), 42);
/// assert_eq!(registry.get::<dyn Greeter>().unwrap().greet(), "hello");
/// assert!(registry.get::<String>().is_none());
/// ```
pub struct Registry {
	entries: IndexMap<TypeKey, StoredValue>,
	parent: Option<Arc<Registry>>,
	settings: RegistrySettings,
}

impl Registry {
	/// Creates an empty registry with default settings and no parent.
	pub fn new() -> Self {
		Self {
			entries: IndexMap::new(),
			parent: None,
			settings: RegistrySettings::default(),
		}
	}

	/// Returns a builder for a registry with custom settings or a parent.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_injector::{AmbiguityPolicy, Registry};
	/// use std::sync::Arc;
	///
	/// let root = Arc::new(Registry::new());
	/// let registry = Registry::builder()
	///     .ambiguity(AmbiguityPolicy::Reject)
	///     .parent(root)
	///     .build();
	///
	/// assert!(registry.parent().is_some());
	/// ```
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::default()
	}

	/// Creates an empty registry delegating misses to `parent`.
	///
	/// The child inherits the parent's settings.
	pub fn child_of(parent: Arc<Registry>) -> Self {
		Self {
			entries: IndexMap::new(),
			settings: parent.settings,
			parent: Some(parent),
		}
	}

	/// Returns the registry settings.
	pub fn settings(&self) -> &RegistrySettings {
		&self.settings
	}

	/// Sets the registry consulted when a lookup finds nothing locally,
	/// replacing any previous parent.
	pub fn set_parent(&mut self, parent: Arc<Registry>) {
		self.parent = Some(parent);
	}

	/// Returns the parent registry, if any.
	pub fn parent(&self) -> Option<&Arc<Registry>> {
		self.parent.as_ref()
	}

	/// Stores `value` under `T`, replacing any previous value for `T`.
	///
	/// Interfaces declared for an earlier value of `T` stay declared for the
	/// new one. `T` may be a trait object, in which case the value is stored
	/// under the interface key directly.
	pub fn set<T>(&mut self, value: Arc<T>) -> Binding<'_, T>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let key = TypeKey::of::<T>();
		self.store(StoredValue::new(value));
		Binding {
			registry: self,
			key,
			_marker: PhantomData,
		}
	}

	/// Stores `value` under its own concrete type.
	pub fn map<T>(&mut self, value: T) -> Binding<'_, T>
	where
		T: Send + Sync + 'static,
	{
		self.set(Arc::new(value))
	}

	/// Stores `value` under the trait object type `I`.
	///
	/// Registering a value this way makes it the exact match for `I`, ahead of
	/// any entry that merely declares an implementation of `I`.
	///
	/// # Panics
	///
	/// Panics if `I` is not a trait object type.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_injector::Registry;
	/// use std::sync::Arc;
	///
	/// trait Label: Send + Sync {
	///     fn label(&self) -> &str;
	/// }
	///
	/// impl Label for String {
	///     fn label(&self) -> &str {
	///         self
	///     }
	/// }
	///
	/// let mut registry = Registry::new();
	/// registry.map_to::<dyn Label>(Arc::new("dep2".to_string()));
	///
	/// assert_eq!(registry.get::<dyn Label>().unwrap().label(), "dep2");
	/// // Not reachable under the concrete type.
	/// assert!(registry.get::<String>().is_none());
	/// ```
	pub fn map_to<I>(&mut self, value: Arc<I>) -> Binding<'_, I>
	where
		I: ?Sized + Send + Sync + 'static,
	{
		interface_of::<I>();
		self.set(value)
	}

	/// Stores an already erased value under its own key.
	pub fn insert(&mut self, value: StoredValue) -> &mut Self {
		self.store(value);
		self
	}

	fn store(&mut self, mut value: StoredValue) {
		let key = value.key();
		match self.entries.get_mut(&key) {
			Some(slot) => {
				// Declared interfaces belong to the type, not to one value.
				value.inherit_implementations(slot);
				*slot = value;
				tracing::trace!(type_name = key.name(), "replaced registered value");
			}
			None => {
				self.entries.insert(key, value);
				tracing::trace!(type_name = key.name(), "registered value");
			}
		}
	}

	/// Returns the value for `T`, or `None` if nothing in the chain
	/// provides one.
	///
	/// An ambiguous interface lookup under [`AmbiguityPolicy::Reject`] also
	/// yields `None`; use [`Registry::try_get`] to tell the cases apart.
	pub fn get<T>(&self) -> Option<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let key = TypeKey::of::<T>();
		match self.lookup(&key) {
			Lookup::Found(value) => value.downcast::<T>(),
			Lookup::Ambiguous(candidates) => {
				tracing::warn!(
					type_name = key.name(),
					?candidates,
					"ambiguous interface lookup treated as missing"
				);
				None
			}
			Lookup::Missing => None,
		}
	}

	/// Returns the value for `T`, or the reason none could be resolved.
	pub fn try_get<T>(&self) -> InjectResult<Arc<T>>
	where
		T: ?Sized + Send + Sync + 'static,
	{
		let key = TypeKey::of::<T>();
		let value = self.lookup(&key).into_result(&key)?;
		value.downcast::<T>().ok_or(InjectError::NotFound {
			type_name: key.name(),
		})
	}

	/// Runs the lookup chain for an erased key.
	pub fn get_value(&self, key: &TypeKey) -> Option<StoredValue> {
		match self.lookup(key) {
			Lookup::Found(value) => Some(value),
			Lookup::Ambiguous(_) | Lookup::Missing => None,
		}
	}

	/// Returns `true` if a lookup for `T` would succeed.
	pub fn contains<T>(&self) -> bool
	where
		T: ?Sized + Send + Sync + 'static,
	{
		matches!(self.lookup(&TypeKey::of::<T>()), Lookup::Found(_))
	}

	/// Number of values registered locally.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns `true` if no value is registered locally.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Keys registered locally, in registration order.
	pub fn keys(&self) -> impl Iterator<Item = TypeKey> + '_ {
		self.entries.keys().copied()
	}

	pub(crate) fn lookup(&self, key: &TypeKey) -> Lookup {
		if let Some(value) = self.entries.get(key) {
			tracing::trace!(type_name = key.name(), "resolved by exact type");
			return Lookup::Found(value.clone());
		}

		if key.is_interface() {
			match find_implementation(self.entries.values(), key, self.settings.ambiguity) {
				InterfaceMatch::Found(value) => return Lookup::Found(value),
				InterfaceMatch::Ambiguous(candidates) => return Lookup::Ambiguous(candidates),
				InterfaceMatch::None => {}
			}
		}

		match &self.parent {
			Some(parent) => {
				tracing::debug!(type_name = key.name(), "delegating lookup to parent registry");
				parent.lookup(key)
			}
			None => {
				tracing::debug!(type_name = key.name(), "no registered value for type");
				Lookup::Missing
			}
		}
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry")
			.field("entries", &self.entries.values().collect::<Vec<_>>())
			.field("has_parent", &self.parent.is_some())
			.field("settings", &self.settings)
			.finish()
	}
}

/// Handle to a value just registered, used to declare the interfaces it
/// implements.
///
/// `Binding` dereferences to the registry, so registrations can be chained:
///
/// ```
/// use reinhardt_injector::Registry;
///
/// let mut registry = Registry::new();
/// registry.map(1u8).map("two").map(3.0f64);
/// assert_eq!(registry.len(), 3);
/// ```
pub struct Binding<'a, T: ?Sized> {
	registry: &'a mut Registry,
	key: TypeKey,
	_marker: PhantomData<fn(Arc<T>)>,
}

impl<'a, T> Binding<'a, T>
where
	T: ?Sized + Send + Sync + 'static,
{
	/// Declares that the bound value implements the trait object `I`.
	///
	/// `cast` performs the coercion, typically `|v| v as Arc<dyn Trait>`.
	///
	/// # Panics
	///
	/// Panics if `I` is not a trait object type.
	pub fn provides<I, F>(self, cast: F) -> Self
	where
		I: ?Sized + Send + Sync + 'static,
		F: Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
	{
		if let Some(entry) = self.registry.entries.get_mut(&self.key) {
			entry.provide::<T, I, F>(cast);
			tracing::trace!(
				type_name = self.key.name(),
				interface = std::any::type_name::<I>(),
				"declared interface implementation"
			);
		}
		self
	}

	/// Returns the key the value was registered under.
	pub fn key(&self) -> TypeKey {
		self.key
	}

	/// Releases the binding, returning the registry.
	pub fn into_registry(self) -> &'a mut Registry {
		self.registry
	}
}

impl<T: ?Sized> Deref for Binding<'_, T> {
	type Target = Registry;

	fn deref(&self) -> &Self::Target {
		&*self.registry
	}
}

impl<T: ?Sized> DerefMut for Binding<'_, T> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut *self.registry
	}
}

/// Builder for [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	settings: Option<RegistrySettings>,
	parent: Option<Arc<Registry>>,
}

impl RegistryBuilder {
	/// Sets the interface ambiguity policy.
	pub fn ambiguity(mut self, policy: AmbiguityPolicy) -> Self {
		self.settings.get_or_insert_default().ambiguity = policy;
		self
	}

	/// Replaces all settings.
	pub fn settings(mut self, settings: RegistrySettings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Sets the parent registry.
	///
	/// Unless settings are given through [`ambiguity`](Self::ambiguity) or
	/// [`settings`](Self::settings), the registry inherits the parent's, as
	/// with [`Registry::child_of`].
	pub fn parent(mut self, parent: Arc<Registry>) -> Self {
		self.parent = Some(parent);
		self
	}

	/// Builds the empty registry.
	pub fn build(self) -> Registry {
		let settings = match (self.settings, &self.parent) {
			(Some(settings), _) => settings,
			(None, Some(parent)) => parent.settings,
			(None, None) => RegistrySettings::default(),
		};
		Registry {
			entries: IndexMap::new(),
			parent: self.parent,
			settings,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	trait Stringer: Send + Sync {
		fn describe(&self) -> String;
	}

	struct Greeter {
		name: String,
	}

	impl Stringer for Greeter {
		fn describe(&self) -> String {
			format!("Hello, My name is {}", self.name)
		}
	}

	struct Robot;

	impl Stringer for Robot {
		fn describe(&self) -> String {
			"beep".to_string()
		}
	}

	#[fixture]
	fn registry() -> Registry {
		Registry::new()
	}

	#[rstest]
	fn new_registry_is_empty(registry: Registry) {
		assert!(registry.is_empty());
		assert_eq!(registry.len(), 0);
		assert!(registry.parent().is_none());
	}

	#[rstest]
	fn set_then_get_returns_same_value(mut registry: Registry) {
		// Arrange
		let value = Arc::new(String::from("some dependency"));

		// Act
		registry.set(Arc::clone(&value));

		// Assert
		let found = registry.get::<String>().unwrap();
		assert!(Arc::ptr_eq(&found, &value));
	}

	#[rstest]
	fn re_registration_overwrites(mut registry: Registry) {
		// Act
		registry.map(1i32);
		registry.map(2i32);

		// Assert
		assert_eq!(*registry.get::<i32>().unwrap(), 2);
		assert_eq!(registry.len(), 1);
	}

	#[rstest]
	fn overwritten_key_keeps_registration_slot(mut registry: Registry) {
		// Act
		registry.map(1u8).map(2u16).map(3u8);

		// Assert
		let keys: Vec<_> = registry.keys().collect();
		assert_eq!(keys, vec![TypeKey::of::<u8>(), TypeKey::of::<u16>()]);
	}

	#[rstest]
	fn missing_type_yields_none_and_not_found(registry: Registry) {
		assert!(registry.get::<u64>().is_none());
		assert!(!registry.contains::<u64>());
		assert_eq!(
			registry.try_get::<u64>().unwrap_err(),
			InjectError::NotFound { type_name: "u64" }
		);
	}

	#[rstest]
	fn map_to_registers_under_interface(mut registry: Registry) {
		// Act
		registry.map_to::<dyn Stringer>(Arc::new(Robot));

		// Assert
		assert_eq!(registry.get::<dyn Stringer>().unwrap().describe(), "beep");
		assert!(registry.get::<Robot>().is_none());
	}

	#[rstest]
	#[should_panic(expected = "not a trait object type")]
	fn map_to_rejects_concrete_hint(mut registry: Registry) {
		registry.map_to::<String>(Arc::new(String::new()));
	}

	#[rstest]
	fn concrete_value_found_through_implemented_interface(mut registry: Registry) {
		// Arrange
		registry
			.map(Greeter {
				name: "Jeremy".to_string(),
			})
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);

		// Act
		let found = registry.get::<dyn Stringer>();

		// Assert
		assert_eq!(found.unwrap().describe(), "Hello, My name is Jeremy");
		assert!(registry.contains::<Greeter>());
	}

	#[rstest]
	fn interface_match_returns_same_allocation(mut registry: Registry) {
		// Arrange
		let greeter = Arc::new(Greeter {
			name: "Ada".to_string(),
		});
		registry
			.set(Arc::clone(&greeter))
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);

		// Act
		let found = registry.get::<dyn Stringer>().unwrap();

		// Assert
		let found_ptr = Arc::as_ptr(&found) as *const Greeter;
		assert!(std::ptr::eq(found_ptr, Arc::as_ptr(&greeter)));
	}

	#[rstest]
	fn exact_interface_entry_beats_implementers(mut registry: Registry) {
		// Arrange
		registry
			.map(Greeter {
				name: "Jeremy".to_string(),
			})
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);
		registry.map_to::<dyn Stringer>(Arc::new(Robot));

		// Act & Assert
		assert_eq!(registry.get::<dyn Stringer>().unwrap().describe(), "beep");
	}

	#[rstest]
	fn default_policy_picks_first_registered_implementer(mut registry: Registry) {
		// Arrange
		registry
			.map(Robot)
			.provides::<dyn Stringer, _>(|r| r as Arc<dyn Stringer>);
		registry
			.map(Greeter {
				name: "Jeremy".to_string(),
			})
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);

		// Act & Assert
		assert_eq!(registry.get::<dyn Stringer>().unwrap().describe(), "beep");
	}

	#[rstest]
	fn reject_policy_reports_ambiguity() {
		// Arrange
		let mut registry = Registry::builder()
			.ambiguity(AmbiguityPolicy::Reject)
			.build();
		registry
			.map(Robot)
			.provides::<dyn Stringer, _>(|r| r as Arc<dyn Stringer>);
		registry
			.map(Greeter {
				name: "Jeremy".to_string(),
			})
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);

		// Act
		let error = registry.try_get::<dyn Stringer>().err().unwrap();

		// Assert
		assert!(registry.get::<dyn Stringer>().is_none());
		match error {
			InjectError::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 2),
			other => panic!("expected ambiguity, got {other:?}"),
		}
	}

	#[rstest]
	fn child_falls_back_to_parent() {
		// Arrange
		let mut parent = Registry::new();
		parent.map_to::<dyn Stringer>(Arc::new(Robot));
		let child = Registry::child_of(Arc::new(parent));

		// Act & Assert
		assert_eq!(child.get::<dyn Stringer>().unwrap().describe(), "beep");
		assert!(child.is_empty());
	}

	#[rstest]
	fn local_entry_shadows_parent() {
		// Arrange
		let mut parent = Registry::new();
		parent.map(String::from("parent"));
		let mut child = Registry::new();
		child.set_parent(Arc::new(parent));
		child.map(String::from("child"));

		// Act & Assert
		assert_eq!(*child.get::<String>().unwrap(), "child");
		assert_eq!(
			*child.parent().unwrap().get::<String>().unwrap(),
			"parent"
		);
	}

	#[rstest]
	fn local_interface_match_shadows_parent_exact_entry() {
		// Arrange
		let mut parent = Registry::new();
		parent.map_to::<dyn Stringer>(Arc::new(Robot));
		let mut child = Registry::child_of(Arc::new(parent));
		child
			.map(Greeter {
				name: "Jeremy".to_string(),
			})
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);

		// Act & Assert
		assert_eq!(
			child.get::<dyn Stringer>().unwrap().describe(),
			"Hello, My name is Jeremy"
		);
	}

	#[rstest]
	fn parent_chain_is_transitive() {
		// Arrange
		let mut root = Registry::new();
		root.map(7u64);
		let middle = Arc::new(Registry::child_of(Arc::new(root)));
		let leaf = Registry::child_of(middle);

		// Act & Assert
		assert_eq!(*leaf.get::<u64>().unwrap(), 7);
	}

	#[rstest]
	fn re_registration_keeps_declared_interfaces(mut registry: Registry) {
		// Arrange
		registry
			.map(Greeter {
				name: "v1".to_string(),
			})
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);

		// Act
		registry.map(Greeter {
			name: "v2".to_string(),
		});

		// Assert
		assert_eq!(
			registry.get::<dyn Stringer>().unwrap().describe(),
			"Hello, My name is v2"
		);
		assert_eq!(registry.len(), 1);
	}

	#[rstest]
	fn re_registered_implementer_still_shadows_parent() {
		// Arrange
		let mut parent = Registry::new();
		parent
			.map(Greeter {
				name: "parent".to_string(),
			})
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);
		let mut child = Registry::child_of(Arc::new(parent));
		child
			.map(Greeter {
				name: "v1".to_string(),
			})
			.provides::<dyn Stringer, _>(|g| g as Arc<dyn Stringer>);

		// Act
		child.map(Greeter {
			name: "v2".to_string(),
		});

		// Assert
		assert_eq!(
			child.get::<dyn Stringer>().map(|s| s.describe()).as_deref(),
			Some("Hello, My name is v2")
		);
	}

	#[rstest]
	fn builder_parent_inherits_settings_unless_overridden() {
		// Arrange
		let parent = Arc::new(
			Registry::builder()
				.ambiguity(AmbiguityPolicy::Reject)
				.build(),
		);

		// Act
		let inherited = Registry::builder().parent(Arc::clone(&parent)).build();
		let overridden = Registry::builder()
			.parent(Arc::clone(&parent))
			.ambiguity(AmbiguityPolicy::FirstRegistered)
			.build();

		// Assert
		assert_eq!(inherited.settings().ambiguity, AmbiguityPolicy::Reject);
		assert_eq!(
			overridden.settings().ambiguity,
			AmbiguityPolicy::FirstRegistered
		);
		assert_eq!(
			Registry::builder().build().settings().ambiguity,
			AmbiguityPolicy::FirstRegistered
		);
	}

	#[rstest]
	fn child_of_inherits_settings() {
		let parent = Registry::builder()
			.ambiguity(AmbiguityPolicy::Reject)
			.build();
		let child = Registry::child_of(Arc::new(parent));
		assert_eq!(child.settings().ambiguity, AmbiguityPolicy::Reject);
	}

	#[rstest]
	fn insert_stores_erased_value_under_its_key(mut registry: Registry) {
		// Arrange
		let mut value = StoredValue::new(Arc::new(Robot));
		value.provide::<Robot, dyn Stringer, _>(|r| r as Arc<dyn Stringer>);

		// Act
		registry.insert(value);

		// Assert
		assert!(registry.contains::<Robot>());
		assert!(registry.contains::<dyn Stringer>());
		let erased = registry.get_value(&TypeKey::of::<dyn Stringer>()).unwrap();
		assert_eq!(erased.key(), TypeKey::of::<dyn Stringer>());
	}

	#[rstest]
	fn binding_derefs_to_registry(mut registry: Registry) {
		// Act
		let binding = registry.map(5u8);
		let key = binding.key();
		let len = binding.len();

		// Assert
		assert_eq!(key, TypeKey::of::<u8>());
		assert_eq!(len, 1);
	}
}
