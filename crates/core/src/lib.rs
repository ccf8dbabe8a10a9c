//! Domain rules for the MentorHub marketplace.
//!
//! This crate has no I/O: it holds the entitlement resolver, the booking
//! state machine, catalog and role rules, and the validation helpers that
//! the repository and API layers share.

pub mod assessment;
pub mod billing;
pub mod booking;
pub mod entitlement;
pub mod error;
pub mod matching;
pub mod onboarding;
pub mod packages;
pub mod roles;
pub mod status;
pub mod types;
