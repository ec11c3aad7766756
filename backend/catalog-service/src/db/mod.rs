//! Database access layer: repositories and the ranking query plan.

pub mod book_repo;
pub mod query;
pub mod review_repo;

pub use book_repo::BookRepo;
pub use query::{Bind, BookQuery, DateWindow};
pub use review_repo::ReviewRepo;
