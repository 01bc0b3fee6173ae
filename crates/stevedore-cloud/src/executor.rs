use std::path::PathBuf;
use std::process::Stdio;

use stevedore_core::StderrPolicy;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::shell::{ShellError, render_command};

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// A successful run with the given stdout, for fakes and tests.
    pub fn ok(stdout: &str) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.to_owned(),
            stderr: String::new(),
        }
    }
}

/// Which child streams are forwarded to the parent while a command runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Streams {
    pub stdout: bool,
    pub stderr: bool,
}

impl Streams {
    pub const STDOUT: Self = Self {
        stdout: true,
        stderr: false,
    };

    pub const BOTH: Self = Self {
        stdout: true,
        stderr: true,
    };
}

/// Abstraction over external command execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait ShellExecutor: Send + Sync {
    /// Resolve a program on `PATH`.
    fn which(&self, program: &str) -> Option<PathBuf>;

    /// Run a command and capture its output.
    async fn exec(&self, program: &str, args: &[String]) -> Result<CommandOutput, ShellError>;

    /// Run a command, capturing its output and forwarding the selected
    /// streams to the terminal as they arrive.
    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        streams: Streams,
    ) -> Result<CommandOutput, ShellError>;
}

/// Executor backed by real child processes.
///
/// Children inherit stdin. Output is decoded lossily, so undecodable bytes
/// never fail a command; success is decided by [`classify`] under the
/// configured [`StderrPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RealExecutor {
    stderr_policy: StderrPolicy,
}

impl RealExecutor {
    pub fn new(stderr_policy: StderrPolicy) -> Self {
        Self { stderr_policy }
    }
}

impl ShellExecutor for RealExecutor {
    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    async fn exec(&self, program: &str, args: &[String]) -> Result<CommandOutput, ShellError> {
        tracing::debug!(program, args = args.len(), "exec");

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ShellError::Spawn {
                program: program.to_owned(),
                source: e,
            })?;

        let captured = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        classify(self.stderr_policy, program, args, captured)
    }

    async fn exec_streaming(
        &self,
        program: &str,
        args: &[String],
        streams: Streams,
    ) -> Result<CommandOutput, ShellError> {
        tracing::debug!(program, args = args.len(), ?streams, "exec (streaming)");

        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ShellError::Spawn {
                program: program.to_owned(),
                source: e,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr) = tokio::try_join!(
            relay(stdout, streams.stdout.then(tokio::io::stdout)),
            relay(stderr, streams.stderr.then(tokio::io::stderr)),
        )
        .map_err(|e| ShellError::Stream {
            program: program.to_owned(),
            source: e,
        })?;

        let status = child.wait().await.map_err(|e| ShellError::Spawn {
            program: program.to_owned(),
            source: e,
        })?;

        let captured = CommandOutput {
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        };

        classify(self.stderr_policy, program, args, captured)
    }
}

/// Copy a child stream into a buffer, mirroring it to `sink` when given.
async fn relay<R, W>(reader: Option<R>, mut sink: Option<W>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let Some(mut reader) = reader else {
        return Ok(captured);
    };

    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        captured.extend_from_slice(&buf[..n]);
        if let Some(sink) = sink.as_mut() {
            sink.write_all(&buf[..n]).await?;
            sink.flush().await?;
        }
    }

    Ok(captured)
}

/// Decide whether a finished command succeeded.
///
/// A non-zero exit (or death by signal) always fails. Under
/// [`StderrPolicy::Strict`] any non-blank stderr output also fails, even
/// with a zero exit code.
pub fn classify(
    policy: StderrPolicy,
    program: &str,
    args: &[String],
    output: CommandOutput,
) -> Result<CommandOutput, ShellError> {
    if output.code != Some(0) {
        return Err(ShellError::CommandFailed {
            command: render_command(program, args),
            code: output.code,
            stderr: output.stderr,
        });
    }

    if policy == StderrPolicy::Strict && !output.stderr.trim().is_empty() {
        return Err(ShellError::StderrOutput {
            command: render_command(program, args),
            stderr: output.stderr,
        });
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(code: Option<i32>, stderr: &str) -> CommandOutput {
        CommandOutput {
            code,
            stdout: "out".to_owned(),
            stderr: stderr.to_owned(),
        }
    }

    #[test]
    fn classify_zero_exit_without_stderr_succeeds() {
        let result = classify(StderrPolicy::Strict, "git", &[], output(Some(0), ""));
        assert_eq!(result.unwrap().stdout, "out");
    }

    #[test]
    fn classify_non_zero_exit_fails_under_both_policies() {
        for policy in [StderrPolicy::Strict, StderrPolicy::ExitCode] {
            let result = classify(policy, "git", &[], output(Some(128), "fatal"));
            assert!(matches!(
                result,
                Err(ShellError::CommandFailed { code: Some(128), .. })
            ));
        }
    }

    #[test]
    fn classify_signal_fails() {
        let result = classify(StderrPolicy::ExitCode, "docker", &[], output(None, ""));
        assert!(matches!(
            result,
            Err(ShellError::CommandFailed { code: None, .. })
        ));
    }

    #[test]
    fn classify_stderr_fails_only_when_strict() {
        let strict = classify(StderrPolicy::Strict, "aws", &[], output(Some(0), "warning"));
        assert!(matches!(strict, Err(ShellError::StderrOutput { .. })));

        let lenient = classify(StderrPolicy::ExitCode, "aws", &[], output(Some(0), "warning"));
        assert!(lenient.is_ok());
    }

    #[test]
    fn classify_blank_stderr_is_not_output() {
        let result = classify(StderrPolicy::Strict, "aws", &[], output(Some(0), " \n"));
        assert!(result.is_ok());
    }
}
