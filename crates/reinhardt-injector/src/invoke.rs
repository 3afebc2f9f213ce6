//! Callable invocation
//!
//! [`Registry::invoke`] calls a function or closure whose parameters are all
//! [`Dependency`] types, resolving each one from the registry first. The
//! callable only runs once every parameter has resolved.
//!
//! ```
//! use reinhardt_injector::Registry;
//! use std::sync::Arc;
//!
//! let mut registry = Registry::new();
//! registry.map("a".to_string());
//!
//! let out = registry.invoke(|s: Arc<String>| format!("{s}!")).unwrap();
//! assert_eq!(out, "a!");
//! ```

use crate::error::{InjectError, InjectResult};
use crate::key::TypeKey;
use crate::registry::Registry;
use std::error::Error;
use std::sync::Arc;

/// A parameter type the invoker knows how to resolve.
///
/// Implemented for `Arc<T>` (required) and `Option<Arc<T>>` (optional: a
/// missing value resolves to `None`, ambiguity is still an error).
pub trait Dependency: Sized {
	/// Key of the type looked up in the registry.
	fn key() -> TypeKey;

	/// Resolves the parameter.
	fn resolve(registry: &Registry) -> InjectResult<Self>;
}

impl<T> Dependency for Arc<T>
where
	T: ?Sized + Send + Sync + 'static,
{
	fn key() -> TypeKey {
		TypeKey::of::<T>()
	}

	fn resolve(registry: &Registry) -> InjectResult<Self> {
		registry.try_get::<T>()
	}
}

impl<T> Dependency for Option<Arc<T>>
where
	T: ?Sized + Send + Sync + 'static,
{
	fn key() -> TypeKey {
		TypeKey::of::<T>()
	}

	fn resolve(registry: &Registry) -> InjectResult<Self> {
		match registry.try_get::<T>() {
			Ok(value) => Ok(Some(value)),
			Err(error) if error.is_not_found() => Ok(None),
			Err(error) => Err(error),
		}
	}
}

/// A callable whose parameters can all be resolved from a [`Registry`].
///
/// `Args` is the tuple of parameter types; it only exists to keep the
/// implementations for different arities apart and is inferred at the call
/// site. Implemented for every `FnOnce` of up to twelve [`Dependency`]
/// parameters.
pub trait Invocable<Args> {
	/// What the callable returns.
	type Output;

	/// Keys of the parameters, in declaration order.
	fn parameter_keys() -> Vec<TypeKey>;

	/// Returns `true` if every parameter currently resolves.
	fn can_resolve(registry: &Registry) -> bool;

	/// Resolves every parameter, then calls `self`.
	fn invoke_with(self, registry: &Registry) -> InjectResult<Self::Output>;
}

fn resolve_parameter<F, P: Dependency>(registry: &Registry, position: usize) -> InjectResult<P> {
	P::resolve(registry).map_err(|error| {
		let callable = std::any::type_name::<F>();
		tracing::debug!(
			callable,
			position,
			parameter = P::key().name(),
			"dependency injection resolution failed"
		);
		InjectError::Parameter {
			callable,
			position,
			source: Box::new(error),
		}
	})
}

macro_rules! impl_invocable {
	($($param:ident $arg:ident $pos:tt),*) => {
		impl<Func, Out, $($param,)*> Invocable<($($param,)*)> for Func
		where
			Func: FnOnce($($param),*) -> Out,
			$($param: Dependency,)*
		{
			type Output = Out;

			fn parameter_keys() -> Vec<TypeKey> {
				vec![$($param::key()),*]
			}

			#[allow(unused_variables)]
			fn can_resolve(registry: &Registry) -> bool {
				true $(&& $param::resolve(registry).is_ok())*
			}

			#[allow(unused_variables)]
			fn invoke_with(self, registry: &Registry) -> InjectResult<Out> {
				$(
					let $arg = resolve_parameter::<Func, $param>(registry, $pos)?;
				)*
				Ok(self($($arg),*))
			}
		}
	};
}

impl_invocable!();
impl_invocable!(P1 p1 0);
impl_invocable!(P1 p1 0, P2 p2 1);
impl_invocable!(P1 p1 0, P2 p2 1, P3 p3 2);
impl_invocable!(P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3);
impl_invocable!(P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3, P5 p5 4);
impl_invocable!(P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3, P5 p5 4, P6 p6 5);
impl_invocable!(P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3, P5 p5 4, P6 p6 5, P7 p7 6);
impl_invocable!(P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3, P5 p5 4, P6 p6 5, P7 p7 6, P8 p8 7);
impl_invocable!(
	P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3, P5 p5 4, P6 p6 5, P7 p7 6, P8 p8 7, P9 p9 8
);
impl_invocable!(
	P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3, P5 p5 4, P6 p6 5, P7 p7 6, P8 p8 7, P9 p9 8,
	P10 p10 9
);
impl_invocable!(
	P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3, P5 p5 4, P6 p6 5, P7 p7 6, P8 p8 7, P9 p9 8,
	P10 p10 9, P11 p11 10
);
impl_invocable!(
	P1 p1 0, P2 p2 1, P3 p3 2, P4 p4 3, P5 p5 4, P6 p6 5, P7 p7 6, P8 p8 7, P9 p9 8,
	P10 p10 9, P11 p11 10, P12 p12 11
);

impl Registry {
	/// Resolves every parameter of `f` and calls it, returning its output
	/// unmodified.
	///
	/// The first parameter that cannot be resolved aborts with
	/// [`InjectError::Parameter`] and `f` is not called.
	pub fn invoke<F, Args>(&self, f: F) -> InjectResult<F::Output>
	where
		F: Invocable<Args>,
	{
		f.invoke_with(self)
	}

	/// Returns `true` if every parameter of `f` currently resolves. `f` is
	/// not called.
	pub fn can_invoke<F, Args>(&self, _f: &F) -> bool
	where
		F: Invocable<Args>,
	{
		F::can_resolve(self)
	}
}

/// Output of an invoked callable that may carry an error.
///
/// Implemented for `()`, `Result<T, E>` and tuples of up to four outcomes,
/// which are scanned left to right.
pub trait Outcome {
	/// Returns the first error carried by the output.
	fn error(&self) -> Option<&(dyn Error + 'static)>;
}

impl Outcome for () {
	fn error(&self) -> Option<&(dyn Error + 'static)> {
		None
	}
}

impl<T, E> Outcome for Result<T, E>
where
	E: Error + 'static,
{
	fn error(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			Ok(_) => None,
			Err(error) => Some(error),
		}
	}
}

macro_rules! impl_outcome_tuple {
	($($name:ident $idx:tt),+) => {
		impl<$($name: Outcome),+> Outcome for ($($name,)+) {
			fn error(&self) -> Option<&(dyn Error + 'static)> {
				None$(.or_else(|| self.$idx.error()))+
			}
		}
	};
}

impl_outcome_tuple!(A 0);
impl_outcome_tuple!(A 0, B 1);
impl_outcome_tuple!(A 0, B 1, C 2);
impl_outcome_tuple!(A 0, B 1, C 2, D 3);

/// Returns the first error carried by an invocation output, or `None`.
///
/// ```
/// use reinhardt_injector::{Registry, check_error};
/// use std::sync::Arc;
///
/// let mut registry = Registry::new();
/// registry.map(0u32);
///
/// let output = registry
///     .invoke(|n: Arc<u32>| u8::try_from(*n + 300))
///     .unwrap();
/// assert!(check_error(&output).is_some());
/// ```
pub fn check_error<R>(output: &R) -> Option<&(dyn Error + 'static)>
where
	R: Outcome + ?Sized,
{
	output.error()
}
