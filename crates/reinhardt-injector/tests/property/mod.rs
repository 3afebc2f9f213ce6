//! Property-based tests for the registry

mod registry_properties;
