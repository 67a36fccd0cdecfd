//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the probe expects from infrastructure.
//! They contain no implementation details and use only domain types.

pub mod runtime_client;

pub use runtime_client::RuntimeClient;

#[cfg(test)]
pub use runtime_client::MockRuntimeClient;
