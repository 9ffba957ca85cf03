//! Copying the merged document to the system clipboard.
//!
//! [`Clipboard`] tries a list of [`CopyTool`]s in order. The platform list pipes the
//! text into `pbcopy`, `xclip`, `xsel` or `wl-copy`; `$FOLDER2PROMPT_COPY_CMD`
//! replaces it with a single user-chosen command.

mod copy;
mod error;
mod tool;
mod tools;

pub use copy::Clipboard;
pub use error::ClipboardError;
pub use tool::{CopyTool, ToolError};
pub use tools::{platform_tools, PipeTool};

/// Command line that overrides the platform clipboard tools, e.g. `tee /tmp/prompt.md`.
pub const COPY_CMD_ENV: &str = "FOLDER2PROMPT_COPY_CMD";
