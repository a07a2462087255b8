//! File checksum computation and verification.
//!
//! [`DigestEngine`] streams a file through one of the algorithms in
//! [`Algorithm`]; [`HashJob`] runs that on a worker thread and reports busy
//! state and the outcome through caller-supplied sinks; [`compare()`] checks a
//! digest against a reference value.

pub mod compare;
pub mod config;
pub mod error;
pub mod file_ops;
pub mod hashers;
pub mod job;
pub mod logging;
pub mod models;
pub mod utils;

pub use compare::{compare, normalize_reference, verify};
pub use error::{ErrorKind, HashError};
pub use file_ops::{CancelToken, DigestEngine, BLOCK_SIZE};
pub use hashers::{HashRegistry, StreamHasher};
pub use job::{no_progress, HashJob, JobHandle, JobId, JobOutcome, ProgressSink, ResultSink};
pub use models::{Algorithm, DigestResult, JobState, Verdict};
