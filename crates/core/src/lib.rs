//! Table Reservation Builder domain logic.
//!
//! Everything in this crate is pure: the settings model, the markup
//! generator, plugin packaging, import/export envelopes, and input
//! validation. Persistence lives in `tablebuilder-db`, HTTP in
//! `tablebuilder-api`.

pub mod credentials;
pub mod error;
pub mod markup;
pub mod roles;
pub mod section_export;
pub mod settings;
pub mod types;
pub mod validation;
pub mod wordpress;
