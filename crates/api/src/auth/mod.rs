//! Identity primitives: Argon2id passwords and JWT / refresh tokens.

pub mod jwt;
pub mod password;
