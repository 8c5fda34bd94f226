use crate::types::KubectlOptions;
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Whether a kubectl invocation may log its command line and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLogging {
    Log,
    /// Used for commands whose output can contain secrets (logs, describe).
    Discard,
}

#[derive(Debug, Error)]
pub enum KubectlError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("{command} failed: {}", exit_description(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        output: String,
    },
}

impl KubectlError {
    /// Whatever the command printed before failing; empty if it never ran.
    pub fn output(&self) -> &str {
        match self {
            KubectlError::Spawn { .. } => "",
            KubectlError::Failed { output, .. } => output,
        }
    }
}

fn exit_description(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

#[async_trait]
pub trait KubectlRunner: Send + Sync {
    /// Run `kubectl <global flags> <args>` and return the combined output.
    async fn run(
        &self,
        options: &KubectlOptions,
        logging: OutputLogging,
        args: &[&str],
    ) -> Result<String, KubectlError>;
}

/// Runs the real kubectl binary found on `PATH` (or at an explicit path).
#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: PathBuf,
}

impl Default for Kubectl {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("kubectl"),
        }
    }
}

impl Kubectl {
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn build_command(&self, options: &KubectlOptions, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(options.global_args())
            .args(args)
            .envs(&options.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl KubectlRunner for Kubectl {
    async fn run(
        &self,
        options: &KubectlOptions,
        logging: OutputLogging,
        args: &[&str],
    ) -> Result<String, KubectlError> {
        let command = format!("kubectl {}", args.join(" "));
        if logging == OutputLogging::Log {
            debug!(
                args = ?options.global_args(),
                "running {}", command
            );
        }

        let result = self
            .build_command(options, args)
            .output()
            .await
            .map_err(|source| KubectlError::Spawn {
                command: command.clone(),
                source,
            })?;

        let output = combine_output(&result.stdout, &result.stderr);
        if logging == OutputLogging::Log {
            debug!(status = ?result.status.code(), "{} output:\n{}", command, output);
        }

        if result.status.success() {
            Ok(output)
        } else {
            Err(KubectlError::Failed {
                command,
                status: result.status.code(),
                output,
            })
        }
    }
}

/// stdout followed by stderr, with the trailing newline trimmed.
pub fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);
    let mut output = stdout.trim_end_matches('\n').to_string();
    let stderr = stderr.trim_end_matches('\n');
    if !stderr.is_empty() {
        if !output.is_empty() {
            output.push('\n');
        }
        output.push_str(stderr);
    }
    output
}
