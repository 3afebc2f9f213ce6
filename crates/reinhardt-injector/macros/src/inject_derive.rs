//! `#[derive(Inject)]` implementation
//!
//! Builds an `InjectionPlan` from the `#[inject]` attributes of a struct's
//! named fields.

use crate::crate_paths::get_reinhardt_injector_crate;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{
	Attribute, Data, DeriveInput, Fields, GenericArgument, Meta, PathArguments, Result, Type,
};

/// How a field takes part in injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldMode {
	Required,
	Skip,
}

/// Field information for processing
struct FieldInfo {
	name: syn::Ident,
	mode: FieldMode,
}

pub(crate) fn inject_derive_impl(input: DeriveInput) -> Result<TokenStream> {
	let struct_name = &input.ident;

	let fields = match &input.data {
		Data::Struct(data_struct) => match &data_struct.fields {
			Fields::Named(fields) => Some(&fields.named),
			Fields::Unit => None,
			Fields::Unnamed(_) => {
				return Err(syn::Error::new_spanned(
					struct_name,
					"#[derive(Inject)] does not support tuple structs",
				));
			}
		},
		_ => {
			return Err(syn::Error::new_spanned(
				struct_name,
				"#[derive(Inject)] can only be applied to structs",
			));
		}
	};

	let mut field_infos = Vec::new();
	for field in fields.into_iter().flatten() {
		let Some(mode) = parse_inject_mode(&field.attrs)? else {
			continue;
		};
		validate_injectable_type(&field.ty, field)?;
		let name = field
			.ident
			.clone()
			.ok_or_else(|| syn::Error::new_spanned(field, "Field must have a name"))?;
		field_infos.push(FieldInfo { name, mode });
	}

	let krate = get_reinhardt_injector_crate()?;

	let steps = field_infos.iter().map(|info| {
		let name = &info.name;
		let method = match info.mode {
			FieldMode::Required => quote!(field),
			FieldMode::Skip => quote!(skip),
		};
		quote! {
			.#method(stringify!(#name), |__target: &mut Self| &mut __target.#name)
		}
	});

	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	Ok(quote! {
		impl #impl_generics #krate::Inject for #struct_name #ty_generics #where_clause {
			fn injection_plan() -> #krate::InjectionPlan<Self> {
				#krate::InjectionPlan::<Self>::new()
					#(#steps)*
			}
		}
	})
}

/// Reads the `#[inject]` attribute of a field, if any
fn parse_inject_mode(attrs: &[Attribute]) -> Result<Option<FieldMode>> {
	let mut mode = None;
	for attr in attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
		if mode.is_some() {
			return Err(syn::Error::new_spanned(
				attr,
				"duplicate #[inject] attribute",
			));
		}
		mode = Some(match &attr.meta {
			Meta::Path(_) => FieldMode::Required,
			Meta::List(_) => {
				let mut parsed = FieldMode::Required;
				attr.parse_nested_meta(|meta| {
					if meta.path.is_ident("skip") {
						parsed = FieldMode::Skip;
						Ok(())
					} else {
						Err(meta.error("unsupported inject option, expected `skip`"))
					}
				})?;
				parsed
			}
			Meta::NameValue(_) => {
				return Err(syn::Error::new_spanned(
					attr,
					"expected #[inject] or #[inject(skip)]",
				));
			}
		});
	}
	Ok(mode)
}

/// Validate that a type is `Option<Arc<T>>`
fn validate_injectable_type(ty: &Type, field: &syn::Field) -> Result<()> {
	if let Some(inner) = single_generic_argument(ty, "Option")
		&& single_generic_argument(inner, "Arc").is_some()
	{
		return Ok(());
	}

	Err(syn::Error::new_spanned(
		field,
		"#[inject] fields must have type Option<Arc<T>>",
	))
}

/// Returns `T` when `ty` is a path ending in `name<T>`
fn single_generic_argument<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
	let Type::Path(type_path) = ty else {
		return None;
	};
	let segment = type_path.path.segments.last()?;
	if segment.ident != name {
		return None;
	}
	let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
		return None;
	};
	match arguments.args.first() {
		Some(GenericArgument::Type(inner)) if arguments.args.len() == 1 => Some(inner),
		_ => None,
	}
}
