pub mod admin;
pub mod auth;
pub mod billing;
pub mod bookings;
pub mod me;
pub mod mentors;
pub mod packages;
pub mod sessions;
pub mod tools;
