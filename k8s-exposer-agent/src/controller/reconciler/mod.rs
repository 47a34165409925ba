pub mod context;
pub mod deployment;
pub mod error;
