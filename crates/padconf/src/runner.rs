// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Au-Zone Technologies

//! Blocking execution of external tools

use std::io;
use std::process::ExitStatus;

use crate::command::CommandLine;

/// Exit status and text of a finished tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    /// stdout followed by stderr, trailing newline removed
    pub text: String,
}

impl CommandOutput {
    /// Output of a process that exited with `code`
    pub fn new<S: Into<String>>(code: i32, text: S) -> Self {
        CommandOutput {
            code: Some(code),
            text: text.into(),
        }
    }

    /// Returns true if the process exited with status 0
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn from_parts(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> Self {
        let mut text = String::from_utf8_lossy(stdout).into_owned();
        if !stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(stderr));
        }
        let len = text.trim_end_matches(['\n', '\r']).len();
        text.truncate(len);

        CommandOutput {
            code: status.code(),
            text,
        }
    }
}

/// Runs a command to completion
///
/// The formatters only talk to the outside world through this trait, which
/// lets tests substitute a scripted device.
pub trait CommandRunner {
    /// Execute `cmd`, wait for it to exit, and return its output.
    ///
    /// An `Err` means the process could not be started at all.
    fn run(&mut self, cmd: &CommandLine) -> io::Result<CommandOutput>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, cmd: &CommandLine) -> io::Result<CommandOutput> {
        (**self).run(cmd)
    }
}

/// Runs commands as child processes of the current process
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, cmd: &CommandLine) -> io::Result<CommandOutput> {
        log::debug!("Spawning {}", cmd);
        let output = cmd.to_command().output()?;
        log::debug!("{} exited with {}", cmd.program().display(), output.status);
        Ok(CommandOutput::from_parts(
            output.status,
            &output.stdout,
            &output.stderr,
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_system_runner_success() {
        let cmd = CommandLine::new("sh").args(["-c", "echo hello; echo world >&2"]);
        let output = SystemRunner.run(&cmd).unwrap();
        assert!(output.success());
        assert_eq!(output.text, "hello\nworld");
    }

    #[test]
    fn test_system_runner_failure_status() {
        let cmd = CommandLine::new("sh").args(["-c", "printf 'no such entity'; exit 3"]);
        let output = SystemRunner.run(&cmd).unwrap();
        assert!(!output.success());
        assert_eq!(output.code, Some(3));
        assert_eq!(output.text, "no such entity");
    }

    #[test]
    fn test_system_runner_missing_program() {
        let cmd = CommandLine::new("/nonexistent/media-ctl").arg("-p");
        let err = SystemRunner.run(&cmd).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
