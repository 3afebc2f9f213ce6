//! Struct field injection
//!
//! A struct takes part in injection by describing its injectable fields in an
//! [`InjectionPlan`], either by hand or with `#[derive(Inject)]`. Injectable
//! fields hold `Option<Arc<T>>`; `None` means "not injected yet".
//!
//! ```
//! use reinhardt_injector::{Inject, InjectionPlan, Registry};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Handler {
//!     name: Option<Arc<String>>,
//!     retries: Option<Arc<u32>>,
//!     hits: usize,
//! }
//!
//! impl Inject for Handler {
//!     fn injection_plan() -> InjectionPlan<Self> {
//!         InjectionPlan::new()
//!             .field("name", |h: &mut Self| &mut h.name)
//!             .skip("retries", |h: &mut Self| &mut h.retries)
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.map("api".to_string());
//!
//! let mut handler = Handler::default();
//! registry.apply(&mut handler).unwrap();
//!
//! assert_eq!(handler.name.as_deref().map(String::as_str), Some("api"));
//! assert!(handler.retries.is_none());
//! ```

use crate::error::{InjectError, InjectResult};
use crate::key::TypeKey;
use crate::registry::Registry;
use std::fmt;
use std::sync::Arc;

/// A struct whose fields can be filled from a [`Registry`].
///
/// Usually derived:
///
/// ```
/// use reinhardt_injector::{Inject, Registry};
/// use std::sync::Arc;
///
/// #[derive(Default, Inject)]
/// struct Handler {
///     #[inject]
///     name: Option<Arc<String>>,
///     #[inject(skip)]
///     retries: Option<Arc<u32>>,
///     hits: usize,
/// }
///
/// let mut registry = Registry::new();
/// registry.map("api".to_string());
///
/// let mut handler = Handler::default();
/// registry.apply(&mut handler).unwrap();
/// assert!(handler.name.is_some());
/// ```
pub trait Inject: Sized {
	/// Describes which fields are injected and how.
	fn injection_plan() -> InjectionPlan<Self>;
}

/// How a planned field reacts to a missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
	/// A missing value aborts injection with an error.
	Required,
	/// A missing value leaves the field untouched.
	Skip,
}

type AssignFn<S> = dyn Fn(&Registry, &mut S) -> InjectResult<()> + Send + Sync;

struct FieldSpec<S> {
	name: &'static str,
	key: TypeKey,
	mode: FieldMode,
	assign: Box<AssignFn<S>>,
}

/// Ordered list of the injectable fields of `S`.
pub struct InjectionPlan<S> {
	target: &'static str,
	fields: Vec<FieldSpec<S>>,
}

impl<S> InjectionPlan<S> {
	/// Creates an empty plan.
	pub fn new() -> Self {
		Self {
			target: std::any::type_name::<S>(),
			fields: Vec::new(),
		}
	}

	/// Adds a required field.
	pub fn field<T, F>(self, name: &'static str, accessor: F) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
		F: Fn(&mut S) -> &mut Option<Arc<T>> + Send + Sync + 'static,
	{
		self.push(name, FieldMode::Required, accessor)
	}

	/// Adds a skip-marked field: filled when a value resolves, left as is
	/// otherwise.
	pub fn skip<T, F>(self, name: &'static str, accessor: F) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
		F: Fn(&mut S) -> &mut Option<Arc<T>> + Send + Sync + 'static,
	{
		self.push(name, FieldMode::Skip, accessor)
	}

	fn push<T, F>(mut self, name: &'static str, mode: FieldMode, accessor: F) -> Self
	where
		T: ?Sized + Send + Sync + 'static,
		F: Fn(&mut S) -> &mut Option<Arc<T>> + Send + Sync + 'static,
	{
		self.fields.push(FieldSpec {
			name,
			key: TypeKey::of::<T>(),
			mode,
			assign: Box::new(move |registry: &Registry, target: &mut S| {
				let value = registry.try_get::<T>()?;
				*accessor(target) = Some(value);
				Ok(())
			}),
		});
		self
	}

	/// Number of planned fields.
	pub fn len(&self) -> usize {
		self.fields.len()
	}

	/// Returns `true` if no field is planned.
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}

	/// Planned fields as `(name, key, mode)`, in declaration order.
	pub fn fields(&self) -> impl Iterator<Item = (&'static str, TypeKey, FieldMode)> + '_ {
		self.fields
			.iter()
			.map(|field| (field.name, field.key, field.mode))
	}

	/// Fills the planned fields of `target` from `registry`.
	///
	/// Fields are processed in plan order. The first required field that
	/// cannot be resolved aborts with [`InjectError::Field`]; fields assigned
	/// before it keep their new values.
	pub fn apply(&self, registry: &Registry, target: &mut S) -> InjectResult<()> {
		for field in &self.fields {
			match (field.assign)(registry, target) {
				Ok(()) => {
					tracing::trace!(
						target_type = self.target,
						field = field.name,
						"injected field"
					);
				}
				Err(error) if field.mode == FieldMode::Skip && error.is_not_found() => {
					tracing::trace!(
						target_type = self.target,
						field = field.name,
						"skipped field without registered value"
					);
				}
				Err(error) => {
					tracing::debug!(
						field = field.name,
						target_type = self.target,
						"dependency injection resolution failed"
					);
					return Err(InjectError::Field {
						target: self.target,
						field: field.name,
						source: Box::new(error),
					});
				}
			}
		}
		Ok(())
	}
}

impl<S> Default for InjectionPlan<S> {
	fn default() -> Self {
		Self::new()
	}
}

impl<S> fmt::Debug for InjectionPlan<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InjectionPlan")
			.field("target", &self.target)
			.field("fields", &self.fields().collect::<Vec<_>>())
			.finish()
	}
}

impl Registry {
	/// Injects the fields of `target` described by its [`Inject`] plan.
	pub fn apply<S: Inject>(&self, target: &mut S) -> InjectResult<()> {
		S::injection_plan().apply(self, target)
	}
}
