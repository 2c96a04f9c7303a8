//! User accounts: three-layer architecture (repository, service, validator).
//!
//! The repository talks to storage, the service hashes passwords and shapes
//! responses, the validator checks request bodies before they reach either.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod repo;
pub mod service;
pub mod validator;

pub use service::UserService;
