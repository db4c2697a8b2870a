//! Codeathon - Submission Evaluation Service
//!
//! This library provides the core of the Codeathon judging platform: an
//! evaluation dispatcher that accepts code submissions over HTTP and drives
//! each one to a terminal verdict, either on request or through a perpetual
//! background sweep.
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin transport adapter)
//! - **Dispatcher**: claim protocol, evaluation lifecycle, background sweep
//! - **Store**: durable submission state behind a capability trait
//! - **Judge**: sandboxed evaluation backend behind a capability trait

pub mod config;
pub mod constants;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod judge;
pub mod models;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{AppError, AppResult};
pub use state::AppState;
