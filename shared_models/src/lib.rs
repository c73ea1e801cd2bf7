//! The `User` resource used by the demo and the integration tests.

pub mod migration;
pub mod user;

pub use migration::Migrator;
pub use user::{User, UserCreate, UserUpdate};
