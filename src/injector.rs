use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::exec::{run_command, run_command_with_input};

/// Which side of the word under the cursor the selection should extend to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelectMode {
    Beginning,
    Middle,
    #[default]
    End,
}

/// Clipboard access and synthetic input against the active window. Behind
/// a trait so request handling can be tested without an X server.
#[async_trait]
pub trait InputInjector: Send + Sync {
    async fn clipboard(&self) -> Result<String>;
    async fn set_clipboard(&self, text: &str) -> Result<()>;
    async fn type_text(&self, text: &str) -> Result<()>;
    async fn focused_window_id(&self) -> Result<String>;
    async fn select_word_under_cursor(&self, mode: SelectMode) -> Result<()>;
    async fn selected_word(&self) -> Result<String>;
}

/// X11 implementation: clipboard via `xclip`, keystrokes and window focus
/// via `xdotool`.
pub struct XdoInjector {
    timeout_ms: u64,
}

impl XdoInjector {
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }

    async fn xdotool(&self, args: &[&str]) -> Result<()> {
        run_command("xdotool", args, self.timeout_ms).await?;
        Ok(())
    }
}

#[async_trait]
impl InputInjector for XdoInjector {
    async fn clipboard(&self) -> Result<String> {
        let output = run_command("xclip", &["-selection", "clipboard", "-o"], self.timeout_ms)
            .await?;
        // an empty or unowned clipboard makes xclip exit nonzero
        if !output.success {
            return Ok(String::new());
        }
        Ok(output.stdout)
    }

    async fn set_clipboard(&self, text: &str) -> Result<()> {
        run_command_with_input(
            "xclip",
            &["-selection", "clipboard", "-i"],
            text,
            self.timeout_ms,
        )
        .await
    }

    /// Types by pasting: saves the clipboard, puts `text` on it, sends
    /// Ctrl+V to the focused window, then restores the old contents.
    async fn type_text(&self, text: &str) -> Result<()> {
        debug!(len = text.len(), "type_text");
        let old_clipboard = self.clipboard().await?;
        self.set_clipboard(text).await?;
        self.xdotool(&["key", "--clearmodifiers", "Control_L+v"])
            .await?;
        self.set_clipboard(&old_clipboard).await
    }

    async fn focused_window_id(&self) -> Result<String> {
        let output = run_command("xdotool", &["getwindowfocus"], self.timeout_ms).await?;
        Ok(output.stdout.trim().to_string())
    }

    async fn select_word_under_cursor(&self, mode: SelectMode) -> Result<()> {
        match mode {
            SelectMode::Beginning => self.xdotool(&["key", "Control_L+Shift+Right"]).await,
            SelectMode::Middle => {
                self.xdotool(&["key", "Control_L+Left"]).await?;
                self.xdotool(&["key", "Control_L+Shift+Right"]).await
            }
            SelectMode::End => self.xdotool(&["key", "Control_L+Shift+Left"]).await,
        }
    }

    /// Copies the current selection out of the focused window and returns
    /// it, leaving the user's clipboard as it was.
    async fn selected_word(&self) -> Result<String> {
        let window_id = self.focused_window_id().await?;
        self.xdotool(&["windowactivate", &window_id]).await?;

        let old_clipboard = self.clipboard().await?;
        self.xdotool(&[
            "windowactivate",
            &window_id,
            "key",
            "--window",
            &window_id,
            "--clearmodifiers",
            "Control_L+c",
        ])
        .await?;

        let selected = self.clipboard().await?;
        self.set_clipboard(&old_clipboard).await?;
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_mode_parses_from_wire_names() {
        assert_eq!(
            serde_json::from_str::<SelectMode>("\"beginning\"").unwrap(),
            SelectMode::Beginning
        );
        assert_eq!(
            serde_json::from_str::<SelectMode>("\"middle\"").unwrap(),
            SelectMode::Middle
        );
        assert_eq!(
            serde_json::from_str::<SelectMode>("\"end\"").unwrap(),
            SelectMode::End
        );
    }

    #[test]
    fn select_mode_defaults_to_end() {
        assert_eq!(SelectMode::default(), SelectMode::End);
    }
}
