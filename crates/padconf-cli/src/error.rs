// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

use std::fmt;
use std::process::ExitCode;

/// CLI-specific error type with exit code mapping
#[derive(Debug)]
pub enum CliError {
    /// Wrong command-line arguments; carries the rendered usage text
    Usage(String),
    /// Topology document missing, malformed, or without pads
    InvalidConfig(String),
    /// An external tool failed or could not be started
    CommandFailed(String),
    /// A pad did not settle into the requested format
    FormatMismatch(String),
    /// Anything else
    General(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{}", msg.trim_end()),
            CliError::InvalidConfig(msg) => write!(f, "ERR: Invalid topology: {}", msg),
            CliError::CommandFailed(msg) => write!(f, "ERR: Could not apply format: {}", msg),
            CliError::FormatMismatch(msg) => write!(f, "ERR: Could not apply format: {}", msg),
            CliError::General(msg) => write!(f, "ERR: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Usage(_) => ExitCode::from(2),
            CliError::InvalidConfig(_) => ExitCode::from(3),
            CliError::CommandFailed(_) => ExitCode::from(4),
            CliError::FormatMismatch(_) => ExitCode::from(5),
            CliError::General(_) => ExitCode::from(1),
        }
    }
}

/// Map padconf::Error to CliError with appropriate exit codes
impl From<padconf::Error> for CliError {
    fn from(err: padconf::Error) -> Self {
        use padconf::Error;

        match err {
            Error::InvalidConfig(msg) => CliError::InvalidConfig(msg),
            err @ (Error::CommandFailed { .. } | Error::Spawn { .. }) => {
                CliError::CommandFailed(err.to_string())
            }
            Error::FormatMismatch {
                pad,
                expected,
                reported,
            } => CliError::FormatMismatch(format!(
                "{} requested {}, device reports {}",
                pad, expected, reported
            )),
            Error::Io(io_err) => CliError::General(format!("I/O error: {}", io_err)),
        }
    }
}

/// Helper function to convert result to exit code
///
/// Usage errors go to stdout alongside the usage text; everything else is
/// reported on stderr after the tool output that led to it.
pub fn result_to_exit_code<T>(result: Result<T, CliError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e @ CliError::Usage(_)) => {
            println!("{}", e);
            e.exit_code()
        }
        Err(e) => {
            println!();
            eprintln!("{}", e);
            e.exit_code()
        }
    }
}
