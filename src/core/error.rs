//=========================================================================
// Error Types
//=========================================================================
//
// Crate-wide error enum for command bodies, the frame scheduler's fault
// boundary, asynchronous resource initialization, and the platform.
//
// Propagation:
//   Command body ──Err──> enclosing body ──Err──> FrameScheduler tick
//                                                    ├─ Context::emit_error()
//                                                    └─ cancel()
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;

//=== Error ===============================================================

/// Errors raised while executing commands or driving the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A command or refresh body reported a failure.
    Failed(String),

    /// A command was invoked while already active on the same context stack.
    Reentrant {
        /// Name of the command that was re-entered.
        command: String,
    },

    /// A refresh callback panicked inside the tick fault boundary.
    Panicked(String),

    /// An audio decoder could not be initialized.
    Decoder(String),

    /// The windowing event loop could not be created or failed while running.
    EventLoop(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

//--- Trait Implementations -----------------------------------------------

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(msg) => write!(f, "Command failed: {}", msg),
            Self::Reentrant { command } => {
                write!(f, "Command '{}' is already active on this context", command)
            }
            Self::Panicked(msg) => write!(f, "Refresh callback panicked: {}", msg),
            Self::Decoder(msg) => write!(f, "Decoder initialization failed: {}", msg),
            Self::EventLoop(msg) => write!(f, "Event loop error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Self::Failed(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Self::Failed(msg.to_owned())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
