pub mod cleanup;
pub mod scheduler;
