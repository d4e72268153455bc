//! Registrar module
//!
//! - `types`: registration outcome and error
//! - `service`: the `Registrar`

pub mod service;
pub mod types;

pub use service::Registrar;
pub use types::{RegistrationError, RegistrationOutcome};
