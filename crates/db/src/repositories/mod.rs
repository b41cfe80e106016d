//! Repositories: one unit struct per table, all methods take the pool.

mod movie_repo;

pub use movie_repo::MovieRepo;
