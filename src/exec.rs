use std::process::Stdio;

use anyhow::{anyhow, Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

#[derive(Debug)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
}

/// Runs an external command and captures its stdout, killing it if it
/// exceeds `timeout_ms`. All subprocess spawning in the daemon goes through
/// here so timeouts and capture behave the same everywhere.
pub async fn run_command(program: &str, args: &[&str], timeout_ms: u64) -> Result<CommandOutput> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = timeout(Duration::from_millis(timeout_ms.max(1)), command.output())
        .await
        .with_context(|| format!("{program} timed out after {timeout_ms}ms"))?
        .with_context(|| format!("failed to execute {program}"))?;

    let stdout =
        String::from_utf8(output.stdout).with_context(|| format!("{program} stdout is not UTF-8"))?;

    Ok(CommandOutput {
        success: output.status.success(),
        stdout,
    })
}

/// Runs an external command, feeding `input` to its stdin. Used for
/// commands that consume data instead of producing it (clipboard set).
pub async fn run_command_with_input(
    program: &str,
    args: &[&str],
    input: &str,
    timeout_ms: u64,
) -> Result<()> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("failed to execute {program}"))?;
    let mut stdin = child
        .stdin
        .take()
        .with_context(|| format!("{program} stdin unavailable"))?;
    stdin.write_all(input.as_bytes()).await?;
    drop(stdin);

    let status = timeout(Duration::from_millis(timeout_ms.max(1)), child.wait())
        .await
        .with_context(|| format!("{program} timed out after {timeout_ms}ms"))?
        .with_context(|| format!("failed to wait for {program}"))?;

    if !status.success() {
        return Err(anyhow!("{program} exited with {status}"));
    }
    Ok(())
}
