use super::error::ClipboardError;
use super::tool::{CopyTool, ToolError};
use super::tools::{platform_tools, PipeTool};
use super::COPY_CMD_ENV;

/// Tries each tool in order until one copies the text.
pub struct Clipboard {
    tools: Vec<Box<dyn CopyTool>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self {
            tools: platform_tools(),
        }
    }

    /// `$FOLDER2PROMPT_COPY_CMD` when set, otherwise the platform tools.
    pub fn from_env() -> Self {
        let custom = std::env::var(COPY_CMD_ENV).ok();
        match custom.as_deref().and_then(PipeTool::from_command_line) {
            Some(tool) => Self::with_tools(vec![Box::new(tool)]),
            None => Self::new(),
        }
    }

    pub fn with_tools(tools: Vec<Box<dyn CopyTool>>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &[Box<dyn CopyTool>] {
        &self.tools
    }

    /// Copy `text` and return the name of the tool that took it.
    ///
    /// Unavailable tools are skipped and a failing tool falls through to the next.
    /// When every tool fails, the last failure is reported.
    pub fn copy_text(&self, text: &str) -> Result<String, ClipboardError> {
        if text.is_empty() {
            return Err(ClipboardError::Empty);
        }

        let mut last_failure = None;
        for tool in &self.tools {
            if !tool.is_available() {
                continue;
            }
            match tool.copy_text(text) {
                Ok(()) => {
                    tracing::debug!(tool = tool.name(), bytes = text.len(), "copied to clipboard");
                    return Ok(tool.name().to_string());
                }
                Err(ToolError::NotFound) => continue,
                Err(ToolError::Failed(message)) => {
                    tracing::warn!(tool = tool.name(), %message, "clipboard tool failed");
                    last_failure = Some(ClipboardError::ToolFailed {
                        tool: tool.name().to_string(),
                        message,
                    });
                }
            }
        }
        Err(last_failure.unwrap_or(ClipboardError::NoToolAvailable))
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}
