//! # Portal Core
//!
//! The domain layer of the municipal portal backend.
//! Entities, repository ports and the services that enforce the
//! business rules live here, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
pub use services::{CategoryService, LocationService, PostService, UserService};
