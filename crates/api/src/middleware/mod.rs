//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- The signed-in user behind a Bearer token with a live session.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any signed-in user.

pub mod auth;
pub mod rbac;
