//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches where the entity
//!   supports them

pub mod booking;
pub mod mentor;
pub mod package;
pub mod session;
pub mod subscription;
pub mod tool;
pub mod user;
