//! Error types for the injector.

use thiserror::Error;

/// Errors reported when a dependency cannot be resolved.
///
/// Caller contract violations (a concrete type passed where a trait object is
/// required) are not represented here; they panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
	/// No value for the type anywhere in the registry chain.
	#[error("Value not found for type {type_name}")]
	NotFound {
		/// Name of the requested type.
		type_name: &'static str,
	},

	/// Several registered values implement the requested interface and the
	/// registry is configured to reject ambiguity.
	#[error("Ambiguous implementations for {type_name}: {}", .candidates.join(", "))]
	Ambiguous {
		/// Name of the requested interface.
		type_name: &'static str,
		/// Names of the implementing types, in registration order.
		candidates: Vec<&'static str>,
	},

	/// A required struct field could not be injected.
	#[error("Failed to inject field `{field}` of {target}: {source}")]
	Field {
		/// Name of the struct being injected.
		target: &'static str,
		/// Name of the field.
		field: &'static str,
		/// Underlying resolution failure.
		source: Box<InjectError>,
	},

	/// A callable parameter could not be resolved.
	#[error("Failed to resolve parameter {position} of {callable}: {source}")]
	Parameter {
		/// Name of the callable's type.
		callable: &'static str,
		/// Zero-based parameter position.
		position: usize,
		/// Underlying resolution failure.
		source: Box<InjectError>,
	},
}

impl InjectError {
	/// Returns the name of the type that could not be resolved.
	pub fn unmet_type(&self) -> &'static str {
		match self {
			Self::NotFound { type_name } | Self::Ambiguous { type_name, .. } => *type_name,
			Self::Field { source, .. } | Self::Parameter { source, .. } => source.unmet_type(),
		}
	}

	/// Returns `true` if the failure is a missing value, as opposed to an
	/// ambiguous one.
	pub fn is_not_found(&self) -> bool {
		match self {
			Self::NotFound { .. } => true,
			Self::Ambiguous { .. } => false,
			Self::Field { source, .. } | Self::Parameter { source, .. } => source.is_not_found(),
		}
	}
}

/// Result type alias for injector operations.
pub type InjectResult<T> = Result<T, InjectError>;
