pub mod catalog;
pub mod lifecycle;
pub mod registry;
pub mod resolver;

pub use catalog::{CatalogBackend, CatalogError, HealthCheckSpec, ServiceIdentity, ServiceInstance};
pub use lifecycle::{LifecycleHook, RegistrationLifecycle};
pub use registry::{RegistrationError, RegistrationOutcome, Registrar};
pub use resolver::{ResolveError, Resolver};
