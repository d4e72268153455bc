//! Service catalog backends
//!
//! - `types`: identity, health check and instance types
//! - `backend`: the `CatalogBackend` trait
//! - `consul`: Consul agent HTTP API
//! - `memory`: in-process catalog
//! - `factory`: builds the configured backend

pub mod backend;
pub mod consul;
pub mod error;
pub mod factory;
pub mod memory;
pub mod types;

pub use backend::CatalogBackend;
pub use consul::ConsulCatalog;
pub use error::CatalogError;
pub use factory::connect_backend;
pub use memory::InMemoryCatalog;
pub use types::{
    CheckKind, DEFAULT_CHECK_TIMEOUT, HealthCheckSpec, HealthStatus, MIN_DEREGISTER_CRITICAL_AFTER,
    ServiceIdentity, ServiceInstance,
};
