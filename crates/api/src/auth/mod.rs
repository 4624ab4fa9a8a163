//! Token issuing, password hashing, and the active-session registry.

pub mod jwt;
pub mod password;
pub mod session;
