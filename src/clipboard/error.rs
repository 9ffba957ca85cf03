#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Nothing to copy")]
    Empty,

    #[error("No clipboard tool available. On Linux install wl-copy, xclip or xsel, or set FOLDER2PROMPT_COPY_CMD.")]
    NoToolAvailable,

    #[error("Clipboard tool '{tool}' failed: {message}")]
    ToolFailed { tool: String, message: String },
}
