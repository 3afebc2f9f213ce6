//! Path of the runtime crate as seen from the crate using the derive

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::{Span, TokenStream};
use quote::quote;

const RUNTIME_CRATE: &str = "reinhardt-injector";

/// Returns `::reinhardt_injector`, or `::<alias>` when the dependency was
/// renamed in the caller's Cargo.toml.
pub(crate) fn get_reinhardt_injector_crate() -> syn::Result<TokenStream> {
	let found = crate_name(RUNTIME_CRATE).map_err(|e| {
		syn::Error::new(
			Span::call_site(),
			format!("#[derive(Inject)] requires a `{RUNTIME_CRATE}` dependency: {e}"),
		)
	})?;

	let ident = match found {
		FoundCrate::Itself => syn::Ident::new("reinhardt_injector", Span::call_site()),
		FoundCrate::Name(name) => syn::Ident::new(&name, Span::call_site()),
	};
	Ok(quote!(::#ident))
}
