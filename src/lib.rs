pub mod columns;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod summary;
pub mod table;

pub use error::RaterError;
