//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Methods that must run
//! inside a caller's transaction take `&mut PgConnection` instead.

pub mod booking_repo;
pub mod mentor_repo;
pub mod package_repo;
pub mod session_repo;
pub mod subscription_repo;
pub mod tool_repo;
pub mod tool_result_repo;
pub mod user_repo;

pub use booking_repo::BookingRepo;
pub use mentor_repo::MentorRepo;
pub use package_repo::PackageRepo;
pub use session_repo::SessionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use tool_repo::ToolRepo;
pub use tool_result_repo::ToolResultRepo;
pub use user_repo::UserRepo;
