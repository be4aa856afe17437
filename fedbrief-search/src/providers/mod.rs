//! Search provider implementations.
//!
//! Each module provides a struct implementing
//! [`crate::provider::ProviderBackend`] for one backend.

pub mod brave;
pub mod duckduckgo;

pub use brave::BraveProvider;
pub use duckduckgo::DuckDuckGoProvider;
