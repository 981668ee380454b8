//! Server-side task execution errors.
//!
//! These never reach the wire directly: dispatch collapses them into a
//! [`crate::protocol::TaskResult`] and logs the detail with `tracing`, so
//! filesystem and codec diagnostics stay out of client replies.

use thiserror::Error;

/// A failure while executing a parsed task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// PNG decode or encode failure, including file open/create problems.
    #[error(transparent)]
    Codec(#[from] pixel_ops::CodecError),

    /// A numeric parameter outside its valid range.
    ///
    /// The wire protocol rejects these at parse time; this variant guards
    /// the direct call paths (CLI subcommands, library users).
    #[error("invalid parameter ({0})")]
    InvalidParameter(String),
}
