//! Error taxonomy.
//!
//! - [`CommandError`] - a single `az` invocation failed (tool, decode, launch)
//! - [`GuardError`] - reading, switching or restoring the active subscription failed
//! - [`AuditError`] - a step of the NSG audit failed or had nothing to resolve
//! - [`FilterError`] - the subscription keyword filter did not compile

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    /// The tool ran and exited non-zero. `stderr` is kept verbatim.
    #[error("az exited with status {}: {stderr}", display_code(.code))]
    Tool { code: Option<i32>, stderr: String },

    /// The tool exited zero but its stdout was not the expected structured data.
    #[error("could not decode az output at '{path}': {message}")]
    Decode { path: String, message: String },

    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("az output too large: {len} bytes (limit {limit})")]
    OutputTooLarge { len: usize, limit: usize },

    #[error("az output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "<killed by signal>".to_string(),
    }
}

impl CommandError {
    pub fn tool(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Tool {
            code,
            stderr: stderr.into(),
        }
    }

    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Diagnostic text for the user: the tool's stderr when there is one.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Tool { stderr, .. } => stderr.trim().to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum GuardError {
    #[error("could not read the active subscription: {0}")]
    Capture(#[source] CommandError),

    #[error("az reports no active subscription, run 'az login' first")]
    NoActiveSubscription,

    #[error("could not switch to subscription '{subscription}': {source}")]
    Switch {
        subscription: String,
        #[source]
        source: CommandError,
        /// Set when switching back after the failed switch failed as well.
        restore_failure: Option<Box<GuardError>>,
    },

    #[error("could not restore subscription '{original}': {source}")]
    Restore {
        original: String,
        #[source]
        source: CommandError,
    },
}

impl GuardError {
    /// Detach the restore failure carried by a failed switch, if any.
    pub fn take_restore_failure(&mut self) -> Option<GuardError> {
        match self {
            Self::Switch {
                restore_failure, ..
            } => restore_failure.take().map(|e| *e),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuditError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// A group's resource group could not be resolved. The group is skipped.
    #[error("no resource group found for network security group '{nsg}'")]
    ResolutionGap { nsg: String },
}

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid subscription filter '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
