pub mod post;
pub mod retention;
