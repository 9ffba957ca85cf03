use super::tool::{CopyTool, ToolError};
use std::io::{self, Write};
use std::process::{Command, Stdio};

/// A clipboard program that takes the text on stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeTool {
    program: String,
    args: Vec<String>,
    /// Skip the `which` lookup and just try to run it.
    assume_available: bool,
}

impl PipeTool {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            assume_available: false,
        }
    }

    pub fn pbcopy() -> Self {
        Self::new("pbcopy", &[])
    }

    pub fn xclip() -> Self {
        Self::new("xclip", &["-selection", "clipboard"])
    }

    pub fn xsel() -> Self {
        Self::new("xsel", &["--clipboard", "--input"])
    }

    pub fn wl_copy() -> Self {
        Self::new("wl-copy", &[])
    }

    /// A user-supplied command line, split on whitespace (no quoting).
    ///
    /// `None` for a blank line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        let args: Vec<&str> = parts.collect();
        let mut tool = Self::new(program, &args);
        tool.assume_available = true;
        Some(tool)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn on_path(&self) -> bool {
        Command::new("which")
            .arg(&self.program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl CopyTool for PipeTool {
    fn name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        self.assume_available || self.on_path()
    }

    fn copy_text(&self, text: &str) -> Result<(), ToolError> {
        // xclip keeps running to own the selection, so never wait on its output pipes.
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ToolError::NotFound,
                _ => ToolError::Failed(e.to_string()),
            })?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| ToolError::Failed(e.to_string()))?;
        }

        let status = child.wait().map_err(|e| ToolError::Failed(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed(format!("{} exited with {status}", self.program)))
        }
    }
}

/// Platform clipboard programs in the order they are tried.
pub fn platform_tools() -> Vec<Box<dyn CopyTool>> {
    #[cfg(target_os = "macos")]
    {
        vec![Box::new(PipeTool::pbcopy())]
    }

    #[cfg(target_os = "linux")]
    {
        vec![
            Box::new(PipeTool::xclip()),
            Box::new(PipeTool::xsel()),
            Box::new(PipeTool::wl_copy()),
        ]
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        Vec::new()
    }
}
