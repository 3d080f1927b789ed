//! Azure CLI command execution.
//!
//! [`Executor::execute`] runs one [`AzCommand`] and classifies the outcome as
//! a [`CommandResult`]. It never panics and never retries.

use super::command::AzCommand;
use super::runner::{CommandRunner, Invocation, ProcessRunner};
use crate::config::Config;
use crate::error::CommandError;
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Outcome of one `az` invocation.
#[derive(Debug)]
pub enum CommandResult {
    /// Zero exit, stdout decoded as JSON.
    Structured(Value),
    /// Zero exit, stdout kept verbatim (table/tsv output).
    Raw(String),
    Failed(CommandError),
}

impl CommandResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, CommandResult::Failed(_))
    }

    /// Decode a structured result into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, CommandError> {
        match self {
            CommandResult::Structured(value) => serde_path_to_error::deserialize(value)
                .map_err(|e| CommandError::decode(e.path().to_string(), e.inner().to_string())),
            CommandResult::Raw(_) => Err(CommandError::decode(
                ".",
                "expected JSON output, got raw text",
            )),
            CommandResult::Failed(e) => Err(e),
        }
    }

    /// Take the text of a raw result.
    pub fn into_text(self) -> Result<String, CommandError> {
        match self {
            CommandResult::Raw(text) => Ok(text),
            CommandResult::Structured(value) => Ok(value.to_string()),
            CommandResult::Failed(e) => Err(e),
        }
    }
}

/// Runs [`AzCommand`]s through a [`CommandRunner`].
pub struct Executor<R: CommandRunner = ProcessRunner> {
    runner: R,
    config: Config,
}

impl Executor<ProcessRunner> {
    /// Executor spawning real `az` processes.
    pub fn system(config: Config) -> Executor<ProcessRunner> {
        Executor::new(ProcessRunner, config)
    }
}

impl<R: CommandRunner> Executor<R> {
    pub fn new(runner: R, config: Config) -> Executor<R> {
        Executor { runner, config }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `cmd` and classify its outcome.
    pub fn execute(&self, cmd: &AzCommand) -> CommandResult {
        match self.try_execute(cmd) {
            Ok(result) => result,
            Err(e) => CommandResult::Failed(e),
        }
    }

    /// Run a JSON command and decode its output into `T`.
    pub fn query<T: DeserializeOwned>(&self, cmd: &AzCommand) -> Result<T, CommandError> {
        self.execute(cmd).decode()
    }

    /// Run a table/tsv command and return its stdout.
    pub fn text(&self, cmd: &AzCommand) -> Result<String, CommandError> {
        self.execute(cmd).into_text()
    }

    fn try_execute(&self, cmd: &AzCommand) -> Result<CommandResult, CommandError> {
        let invocation = Invocation::from_program_line(&self.config.az_cli, cmd.args());
        log::debug!("run({cmd})", cmd = invocation.to_string().on_blue());

        let output = self
            .runner
            .run(&invocation)
            .map_err(|source| {
                log::error!("Command execution failed: {}", source);
                CommandError::Launch {
                    program: invocation.program.clone(),
                    source,
                }
            })?;

        if !output.success() {
            log::warn!(
                "{failed} to run {cmd}",
                failed = "failed".on_red(),
                cmd = invocation.to_string().on_blue()
            );
            return Err(CommandError::tool(output.code, output.stderr));
        }

        log::debug!("Success output.stdout.len(): {}", output.stdout.len());
        if output.stdout.len() > self.config.max_output_bytes {
            return Err(CommandError::OutputTooLarge {
                len: output.stdout.len(),
                limit: self.config.max_output_bytes,
            });
        }

        let stdout = String::from_utf8(output.stdout)?;

        if !cmd.is_decodable() {
            return Ok(CommandResult::Raw(stdout));
        }

        let mut deserializer = serde_json::Deserializer::from_str(&stdout);
        let value: Value = serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
            log::error!("OUTPUT START:\n\n{}\n\nOUTPUT END\n", stdout);
            CommandError::decode(e.path().to_string(), e.inner().to_string())
        })?;
        deserializer
            .end()
            .map_err(|e| CommandError::decode(".", e.to_string()))?;

        Ok(CommandResult::Structured(value))
    }
}
