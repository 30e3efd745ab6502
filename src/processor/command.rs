use std::env;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::exec::run_command;
use crate::processor::external::strip_trailing_newline;
use crate::processor::Processor;

/// Claims suggestions starting with `$` and replaces them with the stdout
/// of the remainder run as a shell command line.
pub struct CommandProcessor {
    timeout_ms: u64,
}

impl CommandProcessor {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }
}

#[async_trait]
impl Processor for CommandProcessor {
    fn name(&self) -> &str {
        "command"
    }

    async fn matches(&self, text: &str) -> Result<bool> {
        Ok(text.starts_with('$'))
    }

    async fn process(&self, text: &str) -> Result<String> {
        let command_line = text.strip_prefix('$').unwrap_or(text);
        let shell = env::var("SHELL").unwrap_or_else(|_| "sh".to_string());

        let output = run_command(&shell, &["-c", "--", command_line], self.timeout_ms).await?;
        if !output.success {
            return Err(anyhow!("shell command exited nonzero: {command_line}"));
        }
        Ok(strip_trailing_newline(output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn claims_dollar_prefixed_text_only() {
        let processor = CommandProcessor::new(2000);
        assert!(processor.matches("$echo hi").await.unwrap());
        assert!(!processor.matches("echo hi").await.unwrap());
        assert!(!processor.matches("").await.unwrap());
    }

    #[tokio::test]
    async fn runs_the_command_and_captures_stdout() {
        let processor = CommandProcessor::new(2000);
        assert_eq!(processor.process("$echo hi").await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn nonzero_exit_is_an_error() {
        let processor = CommandProcessor::new(2000);
        assert!(processor.process("$exit 4").await.is_err());
    }
}
