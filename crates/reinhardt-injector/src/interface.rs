//! Interface matching
//!
//! When a trait object is requested and no value is registered under it
//! directly, the registry scans its entries for values that declared an
//! implementation of that trait object (see [`Binding::provides`]).
//!
//! Several entries may implement the same interface. The scan runs in
//! registration order and [`AmbiguityPolicy`] decides what happens when more
//! than one candidate exists.
//!
//! [`Binding::provides`]: crate::Binding::provides

use crate::key::TypeKey;
use crate::value::StoredValue;
use serde::{Deserialize, Serialize};

/// How a registry answers an interface lookup that several entries satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
	/// The earliest registered implementer wins.
	#[default]
	FirstRegistered,
	/// More than one implementer is an error.
	Reject,
}

/// Outcome of an interface scan.
#[derive(Debug)]
pub(crate) enum InterfaceMatch {
	Found(StoredValue),
	Ambiguous(Vec<&'static str>),
	None,
}

/// Scans `entries` (in registration order) for values implementing
/// `interface`.
pub(crate) fn find_implementation<'a, I>(
	entries: I,
	interface: &TypeKey,
	policy: AmbiguityPolicy,
) -> InterfaceMatch
where
	I: IntoIterator<Item = &'a StoredValue>,
{
	let mut candidates = entries
		.into_iter()
		.filter(|entry| entry.implements(interface));

	let Some(first) = candidates.next() else {
		return InterfaceMatch::None;
	};

	if policy == AmbiguityPolicy::Reject {
		let rest: Vec<_> = candidates.map(|entry| entry.key().name()).collect();
		if !rest.is_empty() {
			let mut names = Vec::with_capacity(rest.len() + 1);
			names.push(first.key().name());
			names.extend(rest);
			return InterfaceMatch::Ambiguous(names);
		}
	}

	tracing::trace!(
		interface = interface.name(),
		implementer = first.key().name(),
		"matched interface by implementation"
	);
	match first.cast_to(interface) {
		Some(value) => InterfaceMatch::Found(value),
		// Registered under the interface itself; the exact path normally
		// catches this, but the scan stays correct on its own.
		None => InterfaceMatch::Found(first.clone()),
	}
}
