//! # Reinhardt Injector
//!
//! Type-keyed value registry for Reinhardt.
//!
//! Values are registered under their own type, or under a trait object type,
//! and looked up by type. Consumers are satisfied from the registry:
//!
//! - **Structs**: fields listed in an [`InjectionPlan`] (usually through
//!   `#[derive(Inject)]`) are filled by [`Registry::apply`]
//! - **Callables**: every parameter of a function or closure is resolved by
//!   [`Registry::invoke`] before it runs
//!
//! ## Lookup chain
//!
//! 1. **Exact**: a value registered under the requested type
//! 2. **Interface**: for `dyn Trait` requests, a value that declared it
//!    implements `Trait` ([`Binding::provides`]); ties are settled by the
//!    registry's [`AmbiguityPolicy`]
//! 3. **Parent**: the parent registry, repeating the chain
//!
//! ## Example
//!
//! ```rust
//! use reinhardt_injector::{Inject, Registry};
//! use std::sync::Arc;
//!
//! trait Database: Send + Sync {
//!     fn url(&self) -> &str;
//! }
//!
//! struct Postgres;
//!
//! impl Database for Postgres {
//!     fn url(&self) -> &str {
//!         "postgres://localhost"
//!     }
//! }
//!
//! #[derive(Default, Inject)]
//! struct UserService {
//!     #[inject]
//!     db: Option<Arc<dyn Database>>,
//!     #[inject(skip)]
//!     name: Option<Arc<String>>,
//! }
//!
//! let mut root = Registry::new();
//! root.map(Postgres)
//!     .provides::<dyn Database, _>(|pg| pg as Arc<dyn Database>);
//!
//! let request = Registry::child_of(Arc::new(root));
//!
//! let mut service = UserService::default();
//! request.apply(&mut service).unwrap();
//! assert_eq!(service.db.unwrap().url(), "postgres://localhost");
//! assert!(service.name.is_none());
//!
//! let url = request
//!     .invoke(|db: Arc<dyn Database>| db.url().len())
//!     .unwrap();
//! assert_eq!(url, 20);
//! ```

// Lets the derive output refer to `::reinhardt_injector` inside this crate.
extern crate self as reinhardt_injector;

pub mod apply;
pub mod config;
pub mod error;
pub mod interface;
pub mod invoke;
pub mod key;
pub mod registry;
pub mod value;

pub use apply::{FieldMode, Inject, InjectionPlan};
pub use config::RegistrySettings;
pub use error::{InjectError, InjectResult};
pub use interface::AmbiguityPolicy;
pub use invoke::{Dependency, Invocable, Outcome, check_error};
pub use key::{TypeKey, interface_of};
pub use registry::{Binding, Registry, RegistryBuilder};
pub use value::StoredValue;

#[cfg(feature = "macros")]
pub use reinhardt_injector_macros::Inject;
