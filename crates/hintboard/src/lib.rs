pub use chess;
pub use hintboard_core;

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod session;
pub mod store;
