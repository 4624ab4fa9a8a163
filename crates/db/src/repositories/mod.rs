//! PostgreSQL repositories, one zero-sized struct per table.

pub mod section_repo;
pub mod session_repo;
pub mod user_repo;

pub use section_repo::SectionRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
