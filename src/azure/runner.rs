//! Process execution for the Azure CLI.
//!
//! [`CommandRunner`] is the seam between the crate and the outside world:
//! [`ProcessRunner`] spawns real processes, tests substitute a scripted fake.

use colored::Colorize;
use regex::Regex;
use std::process::Command;
use std::sync::OnceLock;

/// Regex for splitting a program line while preserving quoted substrings.
static PROGRAM_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_program_regex() -> &'static Regex {
    PROGRAM_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// A program and its argument vector. No shell is involved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Build an invocation from a program line such as `az` or
    /// `"/opt/my az/az" --only-show-errors` followed by `args`.
    pub fn from_program_line(program_line: &str, args: Vec<String>) -> Invocation {
        let mut words = split_and_strip(program_line)
            .into_iter()
            .filter(|w| !w.is_empty())
            .map(str::to_string);
        let program = words.next().unwrap_or_default();
        let mut all_args: Vec<String> = words.collect();
        all_args.extend(args);
        Invocation {
            program,
            args: all_args,
        }
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// What came back from a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl RawOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an [`Invocation`] to completion.
pub trait CommandRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<RawOutput>;
}

/// Runs invocations as child processes, blocking until they exit.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<RawOutput> {
        log::trace!(
            "spawn program={} args={:?}",
            invocation.program,
            invocation.args
        );

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()?;

        let raw = RawOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !raw.success() {
            log::trace!(
                "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
                code = raw.code,
                status = output.status,
                stderr = raw.stderr.red()
            );
        }

        Ok(raw)
    }
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_program_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .collect()
}
