pub mod auth;
mod permissions;

pub use permissions::{authorize, Operation, Role, ALL_OPERATIONS, ALL_ROLES};
