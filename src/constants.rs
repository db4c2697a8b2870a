//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// DISPATCHER DEFAULTS
// =============================================================================

/// Default interval between background sweep cycles when no work was found
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10;

/// Default per-invocation judge timeout
pub const DEFAULT_JUDGE_TIMEOUT_SECONDS: u64 = 30;

/// Default maximum evaluation attempts before a submission is left
/// terminally failed
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// Default number of concurrent judge calls the background sweep may run
pub const DEFAULT_WORKER_LIMIT: usize = 4;

/// Default age after which an in-progress claim is treated as abandoned
pub const DEFAULT_STALE_CLAIM_SECONDS: u64 = 300;

/// Default maximum number of submissions picked up per sweep cycle
pub const DEFAULT_SWEEP_BATCH: i64 = 32;

// =============================================================================
// JUDGE DEFAULTS
// =============================================================================

/// Default memory limit for judge containers in megabytes
pub const DEFAULT_MEMORY_LIMIT_MB: u64 = 256;

/// Default time limit for a single run inside the container, in seconds
pub const DEFAULT_TIME_LIMIT_SECONDS: u64 = 2;

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const C: &str = "c";
    pub const CPP: &str = "cpp";
    pub const RUST: &str = "rust";
    pub const PYTHON: &str = "python";

    /// All supported languages
    pub const ALL: &[&str] = &[C, CPP, RUST, PYTHON];
}

/// Docker images for each language
pub mod container_images {
    pub const C: &str = "codeathon/c:latest";
    pub const CPP: &str = "codeathon/cpp:latest";
    pub const RUST: &str = "codeathon/rust:latest";
    pub const PYTHON: &str = "codeathon/python:latest";
}

// =============================================================================
// VERDICTS
// =============================================================================

/// Verdict identifiers written into the submission result
pub mod verdicts {
    pub const ACCEPTED: &str = "accepted";
    pub const RUNTIME_ERROR: &str = "runtime_error";
    pub const TIME_LIMIT_EXCEEDED: &str = "time_limit_exceeded";
    pub const COMPILATION_ERROR: &str = "compilation_error";
}
