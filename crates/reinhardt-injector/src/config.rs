//! Registry settings
//!
//! Settings are plain serde data so an application can embed them in its own
//! configuration file and hand them to [`RegistryBuilder::settings`].
//!
//! ```
//! use reinhardt_injector::{AmbiguityPolicy, Registry, RegistrySettings};
//!
//! let settings: RegistrySettings = serde_json::from_str(r#"{ "ambiguity": "reject" }"#).unwrap();
//! let registry = Registry::builder().settings(settings).build();
//! assert_eq!(registry.settings().ambiguity, AmbiguityPolicy::Reject);
//! ```
//!
//! [`RegistryBuilder::settings`]: crate::RegistryBuilder::settings

use crate::interface::AmbiguityPolicy;
use serde::{Deserialize, Serialize};

/// Tunables of a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
	/// Resolution of interface lookups with several implementers.
	pub ambiguity: AmbiguityPolicy,
}
