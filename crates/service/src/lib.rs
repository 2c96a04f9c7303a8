//! Service layer for user-account management on top of `models`.
//! - Separates business logic (hashing, uniqueness, response shaping) from data access.
//! - Reuses entity definitions and row helpers from the `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod pagination;
pub mod password;
pub mod users;
#[cfg(test)]
pub mod test_support;

pub use users::UserService;
