pub mod comments;
pub mod error;
pub mod nicknames;
pub mod posts;
