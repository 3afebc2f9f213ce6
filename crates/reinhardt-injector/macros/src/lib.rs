//! Derive macros for reinhardt-injector
//!
//! - `#[derive(Inject)]`: generates an `Inject` implementation from
//!   `#[inject]` and `#[inject(skip)]` field attributes

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod crate_paths;
mod inject_derive;

/// Derives `Inject` for a struct with named fields.
///
/// - `#[inject]`: required field, injection fails if no value resolves
/// - `#[inject(skip)]`: filled when a value resolves, left untouched otherwise
/// - no attribute: never touched
///
/// Injected fields must be typed `Option<Arc<T>>`, where `T` may be a trait
/// object.
///
/// ```ignore
/// use reinhardt_injector::Inject;
/// use std::sync::Arc;
///
/// #[derive(Default, Inject)]
/// struct Handler {
///     #[inject]
///     db: Option<Arc<dyn Database>>,
///     #[inject(skip)]
///     cache: Option<Arc<Cache>>,
///     requests: usize,
/// }
/// ```
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	inject_derive::inject_derive_impl(input)
		.unwrap_or_else(|e| e.to_compile_error())
		.into()
}
