use crate::error::SandboxError;
use crate::harness::{PythonHarness, ScriptHarness};
use crate::sandbox::{CaseOutput, ExecutionOutcome, Sandbox};
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Bytes of stderr kept when a candidate exits abnormally.
const STDERR_TAIL: usize = 2048;

/// Runs each candidate in its own child process and private temp dir.
///
/// The child is killed when the timeout expires or the execution future is
/// dropped.
#[derive(Clone, Debug, Default)]
pub struct SubprocessSandbox<H = PythonHarness> {
    harness: H,
}

impl SubprocessSandbox<PythonHarness> {
    pub fn python() -> Self {
        Self::new(PythonHarness::new())
    }
}

impl<H: ScriptHarness> SubprocessSandbox<H> {
    pub fn new(harness: H) -> Self {
        Self { harness }
    }

    pub fn harness(&self) -> &H {
        &self.harness
    }

    async fn run(
        &self,
        code: &str,
        entrypoint: &str,
        inputs: &[Vec<Value>],
        timeout: Duration,
    ) -> Result<Option<Vec<CaseOutput>>, SandboxError> {
        let workdir = tempfile::tempdir()?;
        let script = workdir.path().join(self.harness.file_name());
        tokio::fs::write(&script, self.harness.render(code, entrypoint)).await?;
        let payload = serde_json::to_vec(inputs).map_err(|e| SandboxError::BadResult(e.to_string()))?;

        let mut child = Command::new(self.harness.program())
            .args(self.harness.args())
            .arg(&script)
            .current_dir(workdir.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| SandboxError::Spawn {
                program: self.harness.program().to_string(),
                reason: e.to_string(),
            })?;

        let stdin = child.stdin.take();
        let execution = async move {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(&payload).await {
                    // the candidate may exit before reading its input
                    if e.kind() != std::io::ErrorKind::BrokenPipe {
                        return Err(SandboxError::Io(e));
                    }
                }
            }
            child.wait_with_output().await.map_err(SandboxError::Io)
        };

        let output = match tokio::time::timeout(timeout, execution).await {
            Ok(result) => result?,
            Err(_) => return Ok(None),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SandboxError::ExitStatus {
                status: output.status.to_string(),
                stderr: tail(stderr.trim_end(), STDERR_TAIL).to_string(),
            });
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        self.harness.parse_output(&stdout).map(Some)
    }
}

#[async_trait]
impl<H: ScriptHarness> Sandbox for SubprocessSandbox<H> {
    async fn execute(
        &self,
        code: &str,
        entrypoint: &str,
        inputs: &[Vec<Value>],
        timeout: Duration,
    ) -> ExecutionOutcome {
        let started = Instant::now();
        match self.run(code, entrypoint, inputs, timeout).await {
            Ok(Some(cases)) => {
                debug!(cases = cases.len(), "candidate executed");
                ExecutionOutcome::Completed {
                    cases,
                    elapsed: started.elapsed(),
                }
            }
            Ok(None) => {
                warn!(limit_ms = timeout.as_millis() as u64, "candidate timed out");
                ExecutionOutcome::TimedOut { limit: timeout }
            }
            Err(e) => {
                debug!(error = %e, "candidate execution failed");
                ExecutionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn tail(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut start = s.len() - max;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
