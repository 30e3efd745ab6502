use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::exec::run_command;
use crate::processor::Processor;

/// An executable following the processor protocol: `<exe> matches <text>`
/// claims the text by exiting 0, `<exe> process <text>` prints the
/// replacement on stdout.
pub struct ExternalProcessor {
    name: String,
    path: PathBuf,
    timeout_ms: u64,
}

impl ExternalProcessor {
    pub fn new(name: String, path: PathBuf, timeout_ms: u64) -> Self {
        Self {
            name,
            path,
            timeout_ms,
        }
    }
}

#[async_trait]
impl Processor for ExternalProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn matches(&self, text: &str) -> Result<bool> {
        let path = self.path.to_string_lossy();
        let output = run_command(&path, &["matches", text], self.timeout_ms).await?;
        Ok(output.success)
    }

    async fn process(&self, text: &str) -> Result<String> {
        let path = self.path.to_string_lossy();
        let output = run_command(&path, &["process", text], self.timeout_ms).await?;
        if !output.success {
            return Err(anyhow!("{} exited nonzero on process", self.name));
        }
        Ok(strip_trailing_newline(output.stdout))
    }
}

pub(crate) fn strip_trailing_newline(mut text: String) -> String {
    if text.ends_with('\n') {
        text.pop();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_a_single_trailing_newline() {
        assert_eq!(strip_trailing_newline("hi\n".to_string()), "hi");
        assert_eq!(strip_trailing_newline("hi\n\n".to_string()), "hi\n");
        assert_eq!(strip_trailing_newline("hi".to_string()), "hi");
        assert_eq!(strip_trailing_newline(String::new()), "");
    }
}
