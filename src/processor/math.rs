use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::exec::run_command;
use crate::processor::external::strip_trailing_newline;
use crate::processor::Processor;

/// Claims suggestions starting with `=` and replaces them with the printed
/// value of the remainder, evaluated with the full real-number math
/// namespace (`from math import *`).
pub struct MathExpressionProcessor {
    timeout_ms: u64,
}

impl MathExpressionProcessor {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }
}

#[async_trait]
impl Processor for MathExpressionProcessor {
    fn name(&self) -> &str {
        "math_expression"
    }

    async fn matches(&self, text: &str) -> Result<bool> {
        Ok(text.starts_with('='))
    }

    async fn process(&self, text: &str) -> Result<String> {
        let expression = text.strip_prefix('=').unwrap_or(text);
        let program = format!("from math import *;print({expression})");

        let output = run_command("python3", &["-c", &program], self.timeout_ms).await?;
        if !output.success {
            return Err(anyhow!("expression failed to evaluate: {expression}"));
        }
        Ok(strip_trailing_newline(output.stdout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;

    fn python3_available() -> bool {
        Command::new("python3")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn claims_equals_prefixed_text_only() {
        let processor = MathExpressionProcessor::new(2000);
        assert!(processor.matches("=2+2").await.unwrap());
        assert!(!processor.matches("2+2").await.unwrap());
    }

    #[tokio::test]
    async fn evaluates_arithmetic() {
        if !python3_available() {
            return;
        }
        let processor = MathExpressionProcessor::new(5000);
        assert_eq!(processor.process("=2+2").await.unwrap(), "4");
    }

    #[tokio::test]
    async fn math_namespace_is_in_scope() {
        if !python3_available() {
            return;
        }
        let processor = MathExpressionProcessor::new(5000);
        assert_eq!(processor.process("=floor(sqrt(17))").await.unwrap(), "4");
    }

    #[tokio::test]
    async fn invalid_expression_is_an_error() {
        if !python3_available() {
            return;
        }
        let processor = MathExpressionProcessor::new(5000);
        assert!(processor.process("=no_such_fn(1)").await.is_err());
    }
}
