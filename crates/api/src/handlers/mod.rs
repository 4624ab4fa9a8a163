pub mod admin;
pub mod auth;
pub mod builder;
pub mod sections;
